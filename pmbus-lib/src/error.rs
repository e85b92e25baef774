use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::command::Command;

/// The primary error type for the `pmbus-lib` library.
#[derive(Error, Debug)]
pub enum PmbusError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Encode error: {0}")]
    Encode(#[from] Linear11Error),

    #[error("Bus transfer error: {0}")]
    Transfer(#[from] TransferError),
}

/// Coarse category of a [`PmbusError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Encode,
    Io,
}

impl PmbusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PmbusError::Validation(_) => ErrorKind::Validation,
            PmbusError::Encode(_) => ErrorKind::Encode,
            PmbusError::Transfer(_) => ErrorKind::Io,
        }
    }
}

/// Input rejected before any bus activity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid PMBus address: must be 0x00 to 0x7F, got {0}")]
    InvalidAddress(i64),

    #[error("Malformed PMBus address '{0}': expected a decimal or 0x-prefixed hex integer")]
    MalformedAddress(String),

    #[error("Voltage out of range: {value:.3}V (min: {min:.3}V, max: {max:.3}V)")]
    VoltageOutOfRange { value: f64, min: f64, max: f64 },

    #[error("Voltage is not a finite number")]
    NonFiniteVoltage,

    #[error("Invalid voltage limits: min {min:.3}V must not exceed max {max:.3}V")]
    InvalidLimits { min: f64, max: f64 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Linear11Error {
    #[error("Value {0} cannot be represented in LINEAR11")]
    OutOfRange(f64),
}

/// Failure of the underlying bus primitives.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to open bus {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to bind slave address {address:#04X}: {source}")]
    BindAddress { address: u8, source: io::Error },

    #[error("Write of {command} failed: {source}")]
    Write { command: Command, source: io::Error },

    #[error("Read of {command} failed: {source}")]
    Read { command: Command, source: io::Error },

    #[error("Short write of {command}: expected {expected} bytes, wrote {actual}")]
    ShortWrite {
        command: Command,
        expected: usize,
        actual: usize,
    },

    #[error("Short read of {command}: expected {expected} bytes, got {actual}")]
    ShortRead {
        command: Command,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised while loading a device configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
