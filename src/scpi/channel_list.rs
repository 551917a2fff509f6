//! `(@...)` channel-list encoding. Channels are zero-based in the API and
//! one-based on the wire.

use std::collections::BTreeSet;

/// The contiguous list covering every channel, `(@1:N)`.
pub fn full_channel_range(count: usize) -> String {
    format!("(@1:{})", count)
}

/// Encodes a subset of `count` channels.
///
/// Indices at or above `count` are ignored and duplicates collapse. The full
/// set is sent in range form; anything else as an ascending explicit list.
/// Returns `None` when no channel remains.
pub fn channel_list<I>(channels: I, count: usize) -> Option<String>
where
    I: IntoIterator<Item = usize>,
{
    let selected: BTreeSet<usize> = channels.into_iter().filter(|&ch| ch < count).collect();
    if selected.is_empty() {
        return None;
    }
    if selected.len() == count {
        return Some(full_channel_range(count));
    }

    let list = selected
        .iter()
        .map(|ch| (ch + 1).to_string())
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("(@{})", list))
}

/// Encodes the channels whose bit is set in `mask` (bit 0 is channel 0).
pub fn channel_mask_list(mask: u32, count: usize) -> Option<String> {
    channel_list((0..count.min(32)).filter(|&ch| mask & (1 << ch) != 0), count)
}

/// Packs per-channel flags into a bitmask, bit 0 first.
pub fn flags_to_mask(flags: &[bool]) -> u32 {
    flags
        .iter()
        .take(32)
        .enumerate()
        .filter(|&(_, &set)| set)
        .fold(0, |mask, (ch, _)| mask | (1 << ch))
}
