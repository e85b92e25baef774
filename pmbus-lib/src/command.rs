use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

/// PMBus registers used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Command {
    /// Output voltage setpoint (write word)
    #[strum(to_string = "VOUT_COMMAND")]
    VoutCommand = 0x21,
    /// Measured output voltage (read word)
    #[strum(to_string = "READ_VOUT")]
    ReadVout = 0x8B,
    /// Measured output current (read word)
    #[strum(to_string = "READ_IOUT")]
    ReadIout = 0x8C,
}

impl Command {
    pub fn code(self) -> u8 {
        self.into()
    }
}
