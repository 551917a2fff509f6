//! Text codec for the unit's SCPI dialect.
//!
//! Everything here is pure string handling: the client builds commands with
//! these helpers and runs every reply through the parsers before it reaches
//! the caller. All parse failures map to [`ErrorCode::InvalidResponse`].

pub mod channel_list;
pub mod mnemonic;

pub use channel_list::{channel_list, channel_mask_list, flags_to_mask, full_channel_range};
pub use mnemonic::Mnemonic;

use crate::error::{ErrorCode, Result};
use crate::types::{DeviceInfo, ScpiError};

/// Characters stripped from both ends of replies and reply fields.
pub const TRIM_CHARS: &[char] = &[' ', '\t', '\x0B', '\r', '\n', '\0'];

/// Line terminator appended to every outgoing command buffer.
pub const TERMINATOR: &str = "\r\n";

pub fn trim(text: &str) -> &str {
    text.trim_matches(TRIM_CHARS)
}

/// Parses a decimal float; the whole trimmed text must be consumed.
pub fn parse_float(text: &str) -> Result<f32> {
    let text = trim(text);
    if text.is_empty() {
        return Err(ErrorCode::InvalidResponse);
    }
    text.parse::<f32>().map_err(|_| ErrorCode::InvalidResponse)
}

/// Booleans are sent as the single digits `0` and `1`.
pub fn parse_bool(text: &str) -> Result<bool> {
    match trim(text) {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ErrorCode::InvalidResponse),
    }
}

/// Parses an integer with optional `#H` (hex), `#Q` (octal) or `#B`
/// (binary) prefix. Values that do not fit `T` are rejected.
pub fn parse_int<T: TryFrom<i64>>(text: &str) -> Result<T> {
    let text = trim(text);
    let (digits, radix) = match text.get(..2) {
        Some(p) if p.eq_ignore_ascii_case("#H") => (&text[2..], 16),
        Some(p) if p.eq_ignore_ascii_case("#Q") => (&text[2..], 8),
        Some(p) if p.eq_ignore_ascii_case("#B") => (&text[2..], 2),
        _ => (text, 10),
    };
    if radix != 10 && digits.starts_with(['+', '-']) {
        return Err(ErrorCode::InvalidResponse);
    }
    let value = i64::from_str_radix(digits, radix).map_err(|_| ErrorCode::InvalidResponse)?;
    T::try_from(value).map_err(|_| ErrorCode::InvalidResponse)
}

/// Parses one quoted string at the start of `text` and returns it together
/// with whatever follows the closing delimiter.
///
/// Either `'` or `"` may delimit; the delimiter is escaped inside the string
/// by doubling it. Returns `None` if the string is not terminated.
pub fn parse_quoted_prefix(text: &str) -> Option<(String, &str)> {
    let text = text.trim_start_matches(TRIM_CHARS);
    let delim = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &text[1..];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != delim {
            out.push(c);
            continue;
        }
        if chars.peek().map(|&(_, next)| next) == Some(delim) {
            out.push(delim);
            chars.next();
            continue;
        }
        return Some((out, &body[i + 1..]));
    }
    None
}

/// Parses text that must consist of exactly one quoted string.
pub fn parse_quoted(text: &str) -> Option<String> {
    let (value, rest) = parse_quoted_prefix(text)?;
    trim(rest).is_empty().then_some(value)
}

pub fn parse_string(text: &str) -> Result<String> {
    parse_quoted(text).ok_or(ErrorCode::InvalidResponse)
}

/// Parses exactly `N` comma-separated quoted strings.
pub fn parse_string_array<const N: usize>(text: &str) -> Result<[String; N]> {
    let mut values = Vec::with_capacity(N);
    let mut rest = text;
    for i in 0..N {
        let (value, tail) = parse_quoted_prefix(rest).ok_or(ErrorCode::InvalidResponse)?;
        values.push(value);
        let tail = tail.trim_start_matches(TRIM_CHARS);
        if i + 1 < N {
            rest = tail.strip_prefix(',').ok_or(ErrorCode::InvalidResponse)?;
        } else if !trim(tail).is_empty() {
            return Err(ErrorCode::InvalidResponse);
        }
    }
    values.try_into().map_err(|_| ErrorCode::InvalidResponse)
}

/// Parses an error-queue entry of the form `<code>,"<message>"`.
pub fn parse_scpi_error(text: &str) -> Result<ScpiError> {
    let (code, message) = trim(text).split_once(',').ok_or(ErrorCode::InvalidResponse)?;
    let code = parse_int::<i16>(code)?;
    let message = trim(message);
    if message.is_empty() {
        return Err(ErrorCode::InvalidResponse);
    }
    let message = parse_quoted(message).ok_or(ErrorCode::InvalidResponse)?;
    Ok(ScpiError { code, message })
}

/// Parses a four-field `*IDN?` reply. The first field (manufacturer) is
/// discarded.
pub fn parse_identity(text: &str) -> Result<DeviceInfo> {
    let [_, part_number, serial, version] = split_fields::<4>(text)?;
    Ok(DeviceInfo {
        part_number: trim(part_number).to_string(),
        serial: trim(serial).to_string(),
        version: trim(version).to_string(),
    })
}

/// Splits a reply into exactly `N` comma-separated fields.
pub fn split_fields<const N: usize>(text: &str) -> Result<[&str; N]> {
    let fields: Vec<&str> = trim(text).split(',').collect();
    fields.try_into().map_err(|_| ErrorCode::InvalidResponse)
}

/// Parses a reply holding exactly `N` comma-separated values.
pub fn parse_array<T, const N: usize>(text: &str, parse: impl Fn(&str) -> Result<T>) -> Result<[T; N]> {
    let values = split_fields::<N>(text)?
        .into_iter()
        .map(parse)
        .collect::<Result<Vec<T>>>()?;
    values.try_into().map_err(|_| ErrorCode::InvalidResponse)
}

/// Parses a reply holding exactly `out.len()` values into `out`.
///
/// `out` is only written once the whole reply has parsed.
pub fn parse_into<T>(text: &str, out: &mut [T], parse: impl Fn(&str) -> Result<T>) -> Result<()> {
    let fields: Vec<&str> = trim(text).split(',').collect();
    if fields.len() != out.len() {
        return Err(ErrorCode::InvalidResponse);
    }
    let values = fields.into_iter().map(parse).collect::<Result<Vec<T>>>()?;
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value;
    }
    Ok(())
}

/// Quotes an outbound string argument, doubling any embedded `"`.
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Boolean argument as sent on the wire.
pub fn bool_arg(value: bool) -> u8 {
    u8::from(value)
}
