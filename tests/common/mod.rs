#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use abs_scpi::driver::{AddressedLine, AddressedRead, CommDriver};
use abs_scpi::{ErrorCode, Result, ScpiClient};

/// Records every write and plays back scripted replies. An empty script
/// behaves like a silent unit.
pub struct FakeDriver {
    writes: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Result<String>>>,
    write_error: Mutex<Option<ErrorCode>>,
    reads: AtomicUsize,
    last_read_timeout: Mutex<Option<Duration>>,
    send_only: bool,
}

impl FakeDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    pub fn send_only() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(send_only: bool) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            write_error: Mutex::new(None),
            reads: AtomicUsize::new(0),
            last_read_timeout: Mutex::new(None),
            send_only,
        }
    }

    pub fn reply(&self, line: &str) {
        self.replies.lock().unwrap().push_back(Ok(line.to_string()));
    }

    pub fn fail_read(&self, error: ErrorCode) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn fail_writes(&self, error: ErrorCode) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn last_write(&self) -> String {
        self.writes.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn last_read_timeout(&self) -> Option<Duration> {
        *self.last_read_timeout.lock().unwrap()
    }
}

impl CommDriver for FakeDriver {
    fn write(&self, data: &[u8], _timeout: Duration) -> Result<()> {
        if let Some(e) = *self.write_error.lock().unwrap() {
            return Err(e);
        }
        self.writes
            .lock()
            .unwrap()
            .push(String::from_utf8(data.to_vec()).unwrap());
        Ok(())
    }

    fn read_line(&self, timeout: Duration) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        *self.last_read_timeout.lock().unwrap() = Some(timeout);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ErrorCode::ReadTimedOut))
    }

    fn is_send_only(&self) -> bool {
        self.send_only
    }
}

/// A client wired to `fake`.
pub fn client_with(fake: &Arc<FakeDriver>) -> ScpiClient {
    ScpiClient::with_driver(fake.clone())
}

/// An RS-485 bus with units at fixed addresses. A unit answers `*IDN?` only
/// when it is the addressed one.
pub struct FakeBus {
    units: HashMap<u32, Result<String>>,
    device_id: AtomicU32,
    pending: Mutex<Option<Result<String>>>,
    probed: Mutex<Vec<u32>>,
    write_error: Option<ErrorCode>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            device_id: AtomicU32::new(0),
            pending: Mutex::new(None),
            probed: Mutex::new(Vec::new()),
            write_error: None,
        }
    }

    pub fn with_unit(mut self, id: u32, serial: &str) -> Self {
        self.units
            .insert(id, Ok(format!("Bloomy Controls,ABS-8,{},1.4.2\r\n", serial)));
        self
    }

    pub fn with_raw_reply(mut self, id: u32, reply: Result<String>) -> Self {
        self.units.insert(id, reply);
        self
    }

    pub fn with_write_error(mut self, error: ErrorCode) -> Self {
        self.write_error = Some(error);
        self
    }

    pub fn probed(&self) -> Vec<u32> {
        self.probed.lock().unwrap().clone()
    }
}

impl CommDriver for FakeBus {
    fn write(&self, data: &[u8], _timeout: Duration) -> Result<()> {
        if let Some(e) = self.write_error {
            return Err(e);
        }
        assert_eq!(data, b"*IDN?\r\n");
        let id = self.device_id();
        self.probed.lock().unwrap().push(id);
        *self.pending.lock().unwrap() = self.units.get(&id).cloned();
        Ok(())
    }

    fn read_line(&self, _timeout: Duration) -> Result<String> {
        self.pending
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(ErrorCode::ReadTimedOut))
    }

    fn set_device_id(&self, id: u32) {
        self.device_id.store(id, Ordering::SeqCst);
    }

    fn device_id(&self) -> u32 {
        self.device_id.load(Ordering::SeqCst)
    }
}

/// A multicast group whose members reply in a scripted order.
pub struct FakeGroup {
    replies: Mutex<VecDeque<Result<AddressedLine>>>,
    writes: Mutex<Vec<String>>,
}

impl FakeGroup {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn member(self, ip: &str, serial: &str) -> Self {
        let source: IpAddr = ip.parse().unwrap();
        self.replies.lock().unwrap().push_back(Ok(AddressedLine {
            line: format!("Bloomy Controls,ABS-8,{},1.4.2\n", serial),
            source,
        }));
        self
    }

    pub fn raw(self, reply: Result<AddressedLine>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl CommDriver for FakeGroup {
    fn write(&self, data: &[u8], _timeout: Duration) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push(String::from_utf8(data.to_vec()).unwrap());
        Ok(())
    }

    fn read_line(&self, _timeout: Duration) -> Result<String> {
        Err(ErrorCode::ReceiveNotAllowed)
    }

    fn is_send_only(&self) -> bool {
        true
    }
}

impl AddressedRead for FakeGroup {
    fn read_line_from(&self, _timeout: Duration) -> Result<AddressedLine> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ErrorCode::ReadTimedOut))
    }
}
