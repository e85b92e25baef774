use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tokio::{signal, task, time};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pmbus_lib::{DeviceConfig, PmbusAddress, SharedPmbus, WordOrder};

/// Periodically log VOUT and IOUT of a PMBus controller.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// I2C bus device node [default: /dev/i2c-0]
    #[arg(long)]
    bus: Option<PathBuf>,
    /// 7-bit device address, decimal or 0x-prefixed hex [default: 0x40]
    #[arg(long, allow_hyphen_values = true)]
    addr: Option<String>,
    /// Byte order of the setpoint word: lsb-first or msb-first [default: lsb-first]
    #[arg(long)]
    write_order: Option<WordOrder>,
    /// Byte order of telemetry replies: lsb-first or msb-first [default: msb-first]
    #[arg(long)]
    read_order: Option<WordOrder>,
    /// JSON device configuration; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run continuously until Ctrl+C is pressed.
    #[arg(short, long)]
    continuous: bool,
    /// Number of samples to fetch if not running continuously.
    #[arg(short, long, default_value_t = 10)]
    samples: u32,
    /// Polling interval in milliseconds.
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,
    /// Print each sample as a JSON line
    #[arg(long)]
    json: bool,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn setup_logging(log_file_path: Option<&PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file_path {
        Some(path) => {
            let log_file = File::create(path)
                .with_context(|| format!("Failed to create log file at: {:?}", path))?;
            let (writer, guard) = tracing_appender::non_blocking(log_file);
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(verbosity.tracing_level_filter().into())
                .from_env_lossy(),
        )
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.as_ref(), &cli.verbose)?;

    tokio::select! {
        res = run(cli) => {
            if let Err(e) = res {
                error!("Monitor failed: {:?}", e);
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Ctrl+C received, shutting down gracefully.");
        }
    }
    Ok(())
}

fn device_config(cli: &Cli) -> Result<DeviceConfig> {
    let mut config = match &cli.config {
        Some(path) => DeviceConfig::load(path)
            .with_context(|| format!("Failed to load device config {:?}", path))?,
        None => DeviceConfig::default(),
    };
    if let Some(bus) = &cli.bus {
        config.bus = bus.clone();
    }
    if let Some(addr) = &cli.addr {
        config.address = PmbusAddress::parse(addr).context("Rejected --addr")?;
    }
    if let Some(order) = cli.write_order {
        config.wire.write_order = order;
    }
    if let Some(order) = cli.read_order {
        config.wire.read_order = order;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = device_config(&cli)?;
    info!(bus = ?config.bus, address = %config.address, "Opening PMBus device");
    let pmbus = open_device(&config)?;

    info!("--- Entering telemetry polling loop ---");
    let iterations = if cli.continuous { u32::MAX } else { cli.samples };
    let mut ticker = time::interval(Duration::from_millis(cli.interval_ms.max(1)));
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    for i in 0..iterations {
        ticker.tick().await;

        let session = pmbus.clone();
        let sample = task::spawn_blocking(move || session.sample())
            .await
            .context("Telemetry task panicked")?
            .with_context(|| format!("Sample {} failed", i + 1))?;

        if sample.power_w < 0.0 {
            warn!("Negative output power: {:.3} W", sample.power_w);
        }
        if cli.json {
            println!("{}", serde_json::to_string(&sample)?);
        } else {
            println!("[Sample {}] {}", i + 1, sample);
        }
    }

    info!("Finished polling.");
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_device(config: &DeviceConfig) -> Result<SharedPmbus<pmbus_lib::I2cDevice>> {
    let session = pmbus_lib::open_session(config)
        .with_context(|| format!("Failed to open PMBus device on {:?}", config.bus))?;
    Ok(SharedPmbus::new(session))
}

#[cfg(not(target_os = "linux"))]
fn open_device(config: &DeviceConfig) -> Result<SharedPmbus<std::fs::File>> {
    anyhow::bail!("I2C bus {:?} unavailable: i2c-dev is Linux only", config.bus)
}
