use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use pmbus_lib::{DeviceConfig, PmbusAddress, VoltageLimits, WordOrder};

pub const DEFAULT_VOLTS: f64 = 1.0;

/// Set the output voltage of a PMBus controller, then read back VOUT and IOUT.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// I2C bus device node [default: /dev/i2c-0]
    #[arg(long)]
    pub bus: Option<PathBuf>,
    /// 7-bit device address, decimal or 0x-prefixed hex [default: 0x40]
    #[arg(long, allow_hyphen_values = true)]
    pub addr: Option<String>,
    /// Output voltage to set, in volts
    #[arg(long, default_value_t = DEFAULT_VOLTS, allow_hyphen_values = true)]
    pub volt: f64,
    /// Byte order of the setpoint word: lsb-first or msb-first [default: lsb-first]
    #[arg(long)]
    pub write_order: Option<WordOrder>,
    /// Byte order of telemetry replies: lsb-first or msb-first [default: msb-first]
    #[arg(long)]
    pub read_order: Option<WordOrder>,
    /// Lowest accepted setpoint in volts [default: 0.3]
    #[arg(long, allow_hyphen_values = true)]
    pub min_volt: Option<f64>,
    /// Highest accepted setpoint in volts [default: 5.0]
    #[arg(long, allow_hyphen_values = true)]
    pub max_volt: Option<f64>,
    /// JSON device configuration; flags given on the command line take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Print the readings as one JSON object
    #[arg(long)]
    pub json: bool,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Cli {
    /// Device configuration from the config file (or defaults) with command
    /// line overrides applied. The address and limits are validated here, so
    /// a bad value never reaches the bus.
    pub fn device_config(&self) -> Result<DeviceConfig> {
        let mut config = match &self.config {
            Some(path) => DeviceConfig::load(path)
                .with_context(|| format!("Failed to load device config {:?}", path))?,
            None => DeviceConfig::default(),
        };

        if let Some(bus) = &self.bus {
            config.bus = bus.clone();
        }
        if let Some(addr) = &self.addr {
            config.address = PmbusAddress::parse(addr).context("Rejected --addr")?;
        }
        if let Some(order) = self.write_order {
            config.wire.write_order = order;
        }
        if let Some(order) = self.read_order {
            config.wire.read_order = order;
        }
        if self.min_volt.is_some() || self.max_volt.is_some() {
            config.limits = VoltageLimits::new(
                self.min_volt.unwrap_or(config.limits.min),
                self.max_volt.unwrap_or(config.limits.max),
            )
            .context("Rejected voltage limits")?;
        }

        Ok(config)
    }
}
