use std::io::{Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::Command;
use crate::device::Pmbus;
use crate::error::PmbusError;
use crate::telemetry::TelemetrySample;
use crate::types::VoltageSetpoint;

/// Cloneable, thread-safe handle to one [`Pmbus`] session.
///
/// PMBus has no framing byte, so the register-select write and the data read
/// of a telemetry transaction must reach the device back to back. Every
/// method holds the lock for the whole transaction.
pub struct SharedPmbus<D> {
    inner: Arc<Mutex<Pmbus<D>>>,
}

impl<D> Clone for SharedPmbus<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Read + Write> SharedPmbus<D> {
    pub fn new(pmbus: Pmbus<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pmbus)),
        }
    }

    pub fn set_voltage(&self, command: Command, target: VoltageSetpoint) -> Result<(), PmbusError> {
        self.inner.lock().set_voltage(command, target)
    }

    pub fn read_telemetry(&self, command: Command) -> Result<f64, PmbusError> {
        self.inner.lock().read_telemetry(command)
    }

    /// VOUT and IOUT under a single lock, so both come from the same moment
    /// as far as other callers are concerned.
    pub fn sample(&self) -> Result<TelemetrySample, PmbusError> {
        self.inner.lock().sample()
    }

    /// Run several transactions without letting other callers in between.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Pmbus<D>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Recover the session once this is the last handle.
    pub fn try_unwrap(self) -> Result<Pmbus<D>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
