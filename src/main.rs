use std::io::{Read, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use pmbus_lib::{DeviceConfig, Pmbus, TelemetrySample, VoltageSetpoint};
use uom::si::electric_potential::volt;

mod cli;
mod logging;


use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_file.clone(), &cli.verbose)?;

    if let Err(e) = run(&cli) {
        error!("pmbus-vout failed: {:?}", e);
        process::exit(1);
    }

    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.device_config()?;
    let target = VoltageSetpoint::new(cli.volt, &config.limits).context("Rejected --volt")?;

    info!(
        bus = ?config.bus,
        address = %config.address,
        write_order = %config.wire.write_order,
        read_order = %config.wire.read_order,
        "Opening PMBus device"
    );
    let mut pmbus = open_device(&config)?;
    let sample = apply_setpoint(&mut pmbus, target)?;

    if cli.json {
        println!("{}", serde_json::to_string(&sample)?);
    } else {
        println!("Voltage: {:.3} V", sample.vout_v);
        println!("Current: {:.3} A", sample.iout_a);
    }
    Ok(())
}

/// Write the setpoint, then read VOUT and IOUT back.
fn apply_setpoint<D: Read + Write>(pmbus: &mut Pmbus<D>, target: VoltageSetpoint) -> Result<TelemetrySample> {
    pmbus.set_vout(target).context("Failed to set output voltage")?;
    info!("Output voltage set to {:.3} V", target.as_potential().get::<volt>());

    let vout = pmbus.read_vout().context("Failed to read VOUT")?;
    let iout = pmbus.read_iout().context("Failed to read IOUT")?;
    Ok(TelemetrySample::new(vout, iout))
}

#[cfg(target_os = "linux")]
fn open_device(config: &DeviceConfig) -> Result<Pmbus<pmbus_lib::I2cDevice>> {
    let pmbus = pmbus_lib::open_session(config)
        .with_context(|| format!("Failed to open PMBus device on {:?}", config.bus))?;
    let device = pmbus.get_ref();
    info!("Session open on {:?} at {}", device.path(), device.address());
    Ok(pmbus)
}

#[cfg(not(target_os = "linux"))]
fn open_device(config: &DeviceConfig) -> Result<Pmbus<std::fs::File>> {
    anyhow::bail!("I2C bus {:?} unavailable: i2c-dev is Linux only", config.bus)
}
