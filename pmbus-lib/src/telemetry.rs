use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uom::si::electric_current::ampere;
use uom::si::electric_potential::volt;
use uom::si::f64::{ElectricCurrent, ElectricPotential, Power};
use uom::si::power::watt;

/// One VOUT/IOUT readout of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub vout_v: f64, // Volts
    pub iout_a: f64, // Amperes
    /// Derived as VOUT × IOUT; never read from the device
    pub power_w: f64,
}

impl TelemetrySample {
    pub fn new(vout: ElectricPotential, iout: ElectricCurrent) -> Self {
        Self::at(Utc::now(), vout, iout)
    }

    pub fn at(timestamp: DateTime<Utc>, vout: ElectricPotential, iout: ElectricCurrent) -> Self {
        let power: Power = vout * iout;
        Self {
            timestamp,
            vout_v: vout.get::<volt>(),
            iout_a: iout.get::<ampere>(),
            power_w: power.get::<watt>(),
        }
    }

    pub fn vout(&self) -> ElectricPotential {
        ElectricPotential::new::<volt>(self.vout_v)
    }

    pub fn iout(&self) -> ElectricCurrent {
        ElectricCurrent::new::<ampere>(self.iout_a)
    }

    pub fn power(&self) -> Power {
        Power::new::<watt>(self.power_w)
    }
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VOUT: {:.3} V, IOUT: {:.3} A, Power: {:.3} W",
            self.vout_v, self.iout_a, self.power_w
        )
    }
}
