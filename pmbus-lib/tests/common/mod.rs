//! Common test utilities and shared imports

// Shared across test files; not every item is used by every file
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

#[allow(unused_imports)]
pub use pmbus_lib::{
    Command, ErrorKind, Pmbus, PmbusError, SharedPmbus, VoltageLimits, VoltageSetpoint, WireFormat, WordOrder,
};

/// One primitive call seen by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Write(Vec<u8>),
    Read(usize),
}

enum Reply {
    Data(Vec<u8>),
    Fail,
}

#[derive(Default)]
struct State {
    log: Vec<BusOp>,
    replies: VecDeque<Reply>,
    registers: HashMap<u8, Vec<u8>>,
    selected: Option<u8>,
    write_limit: Option<usize>,
    fail_writes: bool,
}

/// In-memory stand-in for an address-bound bus handle.
///
/// Reads answer from the scripted reply queue first, otherwise from the
/// register selected by the first byte of the last write, like a real
/// PMBus register pointer.
#[derive(Clone, Default)]
pub struct ScriptedBus {
    state: Arc<Mutex<State>>,
}

impl ScriptedBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, bytes: &[u8]) {
        self.state.lock().replies.push_back(Reply::Data(bytes.to_vec()));
    }

    pub fn fail_next_read(&self) {
        self.state.lock().replies.push_back(Reply::Fail);
    }

    pub fn register(&self, command: Command, bytes: &[u8]) {
        self.state.lock().registers.insert(command.code(), bytes.to_vec());
    }

    pub fn fail_writes(&self) {
        self.state.lock().fail_writes = true;
    }

    pub fn accept_at_most(&self, bytes: usize) {
        self.state.lock().write_limit = Some(bytes);
    }

    pub fn log(&self) -> Vec<BusOp> {
        self.state.lock().log.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log()
            .into_iter()
            .filter_map(|op| match op {
                BusOp::Write(bytes) => Some(bytes),
                BusOp::Read(_) => None,
            })
            .collect()
    }
}

impl Write for ScriptedBus {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.log.push(BusOp::Write(buf.to_vec()));
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::Other, "NACK"));
        }
        state.selected = buf.first().copied();
        Ok(state.write_limit.map_or(buf.len(), |limit| buf.len().min(limit)))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for ScriptedBus {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.log.push(BusOp::Read(buf.len()));

        let data = match state.replies.pop_front() {
            Some(Reply::Data(data)) => data,
            Some(Reply::Fail) => return Err(io::Error::new(io::ErrorKind::TimedOut, "no ACK")),
            None => {
                let selected = state.selected;
                selected
                    .and_then(|command| state.registers.get(&command).cloned())
                    .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no reply scripted"))?
            }
        };

        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }
}

/// A session with the reference wire format.
pub fn session(bus: &ScriptedBus) -> Pmbus<ScriptedBus> {
    Pmbus::new(bus.clone(), WireFormat::reference())
}

pub fn setpoint(volts: f64) -> VoltageSetpoint {
    VoltageSetpoint::new(volts, &VoltageLimits::default()).expect("valid test setpoint")
}
