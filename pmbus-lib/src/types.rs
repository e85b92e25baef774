use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uom::si::electric_potential::volt;
use uom::si::f64::ElectricPotential;

use crate::constants::{DEFAULT_ADDRESS, DEFAULT_VOUT_MAX, DEFAULT_VOUT_MIN, MAX_ADDRESS};
use crate::error::ValidationError;

/// 7-bit PMBus slave address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct PmbusAddress(u8);

impl PmbusAddress {
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        match u8::try_from(raw) {
            Ok(addr) if addr <= MAX_ADDRESS => Ok(Self(addr)),
            _ => Err(ValidationError::InvalidAddress(raw)),
        }
    }

    /// Parse a decimal or `0x`-prefixed hexadecimal address, then check it
    /// against the 7-bit domain.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let raw = parse_integer(s.trim()).ok_or_else(|| ValidationError::MalformedAddress(s.to_string()))?;
        Self::new(raw)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.starts_with(['-', '+']) {
        return None;
    }
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

impl FromStr for PmbusAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Default for PmbusAddress {
    fn default() -> Self {
        Self(DEFAULT_ADDRESS)
    }
}

impl TryFrom<i64> for PmbusAddress {
    type Error = ValidationError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        PmbusAddress::new(raw)
    }
}

impl From<PmbusAddress> for u8 {
    fn from(addr: PmbusAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for PmbusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Inclusive safe operating range for the output voltage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageLimits {
    pub min: f64,
    pub max: f64,
}

impl VoltageLimits {
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        let limits = Self { min, max };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ValidationError::InvalidLimits {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, volts: f64) -> bool {
        (self.min..=self.max).contains(&volts)
    }
}

impl Default for VoltageLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_VOUT_MIN,
            max: DEFAULT_VOUT_MAX,
        }
    }
}

/// An output voltage that has been checked against a [`VoltageLimits`].
///
/// Values outside the limits are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageSetpoint(f64);

impl VoltageSetpoint {
    pub fn new(volts: f64, limits: &VoltageLimits) -> Result<Self, ValidationError> {
        if !volts.is_finite() {
            return Err(ValidationError::NonFiniteVoltage);
        }
        if !limits.contains(volts) {
            return Err(ValidationError::VoltageOutOfRange {
                value: volts,
                min: limits.min,
                max: limits.max,
            });
        }
        Ok(Self(volts))
    }

    pub fn volts(self) -> f64 {
        self.0
    }

    pub fn as_potential(self) -> ElectricPotential {
        ElectricPotential::new::<volt>(self.0)
    }
}

impl fmt::Display for VoltageSetpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} V", self.0)
    }
}
