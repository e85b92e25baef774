pub mod command;
pub mod config;
pub mod constants;
pub mod device;
pub mod error;
#[cfg(target_os = "linux")]
pub mod i2c;
pub mod linear11;
pub mod shared;
pub mod telemetry;
pub mod types;


pub use command::Command;
pub use config::{DeviceConfig, WireFormat, WordOrder};
pub use device::{Pmbus, write_word_frame};
pub use error::{ErrorKind, PmbusError};
#[cfg(target_os = "linux")]
pub use i2c::{I2cDevice, open_session};
pub use linear11::Linear11;
pub use shared::SharedPmbus;
pub use telemetry::TelemetrySample;
pub use types::{PmbusAddress, VoltageLimits, VoltageSetpoint};
