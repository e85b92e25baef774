// Protocol and deployment constants for PMBus controllers

/// Highest valid 7-bit PMBus/SMBus slave address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Default slave address of the SiC45x regulator in the reference deployment
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Default i2c-dev bus node
pub const DEFAULT_BUS_PATH: &str = "/dev/i2c-0";

/// Lowest setpoint accepted by default (V)
pub const DEFAULT_VOUT_MIN: f64 = 0.3;

/// Highest setpoint accepted by default (V)
pub const DEFAULT_VOUT_MAX: f64 = 5.0;

/// Size of a LINEAR11 data word on the wire
pub const WORD_SIZE: usize = 2;

/// Size of a setpoint write frame: command byte + data word
pub const WRITE_WORD_FRAME_SIZE: usize = 1 + WORD_SIZE;

/// Smallest exponent the encoder will emit
pub const MIN_ENCODE_EXPONENT: i8 = -15;

/// Largest exponent the encoder will emit
pub const MAX_ENCODE_EXPONENT: i8 = 15;

/// Mantissa bounds of the 11-bit two's-complement field (inclusive)
pub const MANTISSA_MIN: i16 = -1024;
pub const MANTISSA_MAX: i16 = 1023;

/// Linux i2c-dev ioctl request that binds a slave address to the open fd
pub const I2C_SLAVE: u16 = 0x0703;
