use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uom::si::electric_potential::{millivolt, volt};
use uom::si::f64::ElectricPotential;

use pmbus_lib::linear11::Linear11;
use pmbus_lib::{Command, WordOrder, write_word_frame};

/// Offline LINEAR11 calculator: what a setpoint looks like on the wire, or
/// what a raw telemetry word means.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Encode a value in volts into a LINEAR11 word
    Encode {
        #[arg(allow_hyphen_values = true)]
        volts: f64,
        /// Byte order of the VOUT_COMMAND frame
        #[arg(long, default_value = "lsb-first")]
        order: WordOrder,
    },
    /// Decode a 16-bit LINEAR11 word (hex with 0x prefix, or decimal)
    Decode { word: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    match Cli::parse().command {
        Mode::Encode { volts, order } => encode(volts, order),
        Mode::Decode { word } => decode(&word),
    }
}

fn encode(volts: f64, order: WordOrder) -> Result<()> {
    let value = Linear11::encode(volts)?;
    let word = value.to_word();
    let frame = write_word_frame(Command::VoutCommand, word, order);
    let decoded = ElectricPotential::new::<volt>(value.to_f64());
    let error = decoded - ElectricPotential::new::<volt>(volts);

    println!("Word:     0x{:04X}", word);
    println!("Exponent: {}", value.exponent());
    println!("Mantissa: {}", value.mantissa());
    println!("Value:    {} = {:.6} V", value, decoded.get::<volt>());
    println!("Error:    {:+.3} mV", error.get::<millivolt>());
    println!("Frame:    {} ({})", hex::encode(&frame), order);
    Ok(())
}

fn decode(raw: &str) -> Result<()> {
    let word = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => raw.parse::<u16>(),
    }
    .with_context(|| format!("'{raw}' is not a 16-bit word"))?;
    let value = Linear11::from_word(word);

    println!("Word:     0x{:04X}", word);
    println!("Exponent: {}", value.exponent());
    println!("Mantissa: {}", value.mantissa());
    println!("Value:    {} = {}", value, value.to_f64());
    Ok(())
}
