//! Device configuration.
//!
//! Controllers disagree on how the two bytes of a data word are ordered on
//! the wire, so the order is always an explicit setting of the session rather
//! than something the transaction layer assumes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zerocopy::byteorder::{big_endian, little_endian};

use crate::constants::DEFAULT_BUS_PATH;
use crate::error::ConfigError;
use crate::types::{PmbusAddress, VoltageLimits};

/// Order of the two bytes of a 16-bit word on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordOrder {
    /// Low byte first (SMBus "write word" convention)
    LsbFirst,
    /// High byte first
    MsbFirst,
}

impl WordOrder {
    pub fn split(self, word: u16) -> [u8; 2] {
        match self {
            WordOrder::LsbFirst => little_endian::U16::new(word).to_bytes(),
            WordOrder::MsbFirst => big_endian::U16::new(word).to_bytes(),
        }
    }

    pub fn join(self, bytes: [u8; 2]) -> u16 {
        match self {
            WordOrder::LsbFirst => little_endian::U16::from_bytes(bytes).get(),
            WordOrder::MsbFirst => big_endian::U16::from_bytes(bytes).get(),
        }
    }
}

impl fmt::Display for WordOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordOrder::LsbFirst => write!(f, "lsb-first"),
            WordOrder::MsbFirst => write!(f, "msb-first"),
        }
    }
}

impl FromStr for WordOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lsb-first" | "lsb" | "le" => Ok(WordOrder::LsbFirst),
            "msb-first" | "msb" | "be" => Ok(WordOrder::MsbFirst),
            other => Err(format!(
                "unknown word order '{other}', expected lsb-first or msb-first"
            )),
        }
    }
}

/// Byte order used for setpoint writes and telemetry replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFormat {
    pub write_order: WordOrder,
    pub read_order: WordOrder,
}

impl WireFormat {
    /// SiC45x deployment: setpoint written low byte first, replies read as
    /// big-endian words.
    pub const fn reference() -> Self {
        Self {
            write_order: WordOrder::LsbFirst,
            read_order: WordOrder::MsbFirst,
        }
    }
}

impl Default for WireFormat {
    fn default() -> Self {
        Self::reference()
    }
}

/// Everything needed to open and talk to one controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub bus: PathBuf,
    pub address: PmbusAddress,
    pub wire: WireFormat,
    pub limits: VoltageLimits,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            bus: PathBuf::from(DEFAULT_BUS_PATH),
            address: PmbusAddress::default(),
            wire: WireFormat::default(),
            limits: VoltageLimits::default(),
        }
    }
}

impl DeviceConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DeviceConfig = serde_json::from_str(json)?;
        config.limits.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
