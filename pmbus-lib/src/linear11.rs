//! PMBus LINEAR11 codec.
//!
//! A LINEAR11 word packs a 5-bit two's-complement exponent `E` (bits 15-11)
//! and an 11-bit two's-complement mantissa `N` (bits 10-0) and represents
//! `N × 2^E`. The codec deals in 16-bit words only; splitting a word into
//! wire bytes is up to the transaction layer.
//!
//! Encoding rounds to nearest with ties away from zero (`f64::round`), so the
//! decoded value never differs from the input by more than half of `2^E`.

use std::fmt;

use modular_bitfield::prelude::*;

use crate::constants::{MANTISSA_MAX, MANTISSA_MIN, MAX_ENCODE_EXPONENT, MIN_ENCODE_EXPONENT};
use crate::error::Linear11Error;

const EXPONENT_BITS: u32 = 5;
const MANTISSA_BITS: u32 = 11;

/// Raw bit layout of a LINEAR11 word, least significant field first.
/// Byte 0 is the low byte of the word.
#[bitfield(bytes = 2)]
#[derive(Debug, Clone, Copy, PartialEq)]
struct Linear11Word {
    mantissa: B11,
    exponent: B5,
}

/// A decoded LINEAR11 quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Linear11 {
    exponent: i8,
    mantissa: i16,
}

impl Linear11 {
    /// Encode `value`, picking the most negative exponent in -15..=15 whose
    /// rounded mantissa still fits the 11-bit field.
    pub fn encode(value: f64) -> Result<Self, Linear11Error> {
        if !value.is_finite() {
            return Err(Linear11Error::OutOfRange(value));
        }

        (MIN_ENCODE_EXPONENT..=MAX_ENCODE_EXPONENT)
            .find_map(|exponent| {
                let mantissa = (value / 2f64.powi(exponent as i32)).round();
                (MANTISSA_MIN as f64..=MANTISSA_MAX as f64)
                    .contains(&mantissa)
                    .then_some(Linear11 {
                        exponent,
                        mantissa: mantissa as i16,
                    })
            })
            .ok_or(Linear11Error::OutOfRange(value))
    }

    /// Unpack a raw word. Every bit pattern is valid.
    pub fn from_word(word: u16) -> Self {
        let bits = Linear11Word::from_bytes(word.to_le_bytes());
        Self {
            exponent: sign_extend(bits.exponent() as u16, EXPONENT_BITS) as i8,
            mantissa: sign_extend(bits.mantissa(), MANTISSA_BITS),
        }
    }

    pub fn to_word(self) -> u16 {
        let exponent_mask = (1u16 << EXPONENT_BITS) - 1;
        let mantissa_mask = (1u16 << MANTISSA_BITS) - 1;
        let bits = Linear11Word::new()
            .with_mantissa(self.mantissa as u16 & mantissa_mask)
            .with_exponent((self.exponent as u16 & exponent_mask) as u8);
        u16::from_le_bytes(bits.into_bytes())
    }

    pub fn to_f64(self) -> f64 {
        self.mantissa as f64 * self.resolution()
    }

    pub fn exponent(&self) -> i8 {
        self.exponent
    }

    pub fn mantissa(&self) -> i16 {
        self.mantissa
    }

    /// Weight of one mantissa step, `2^E`.
    pub fn resolution(&self) -> f64 {
        2f64.powi(self.exponent as i32)
    }
}

impl From<u16> for Linear11 {
    fn from(word: u16) -> Self {
        Linear11::from_word(word)
    }
}

impl From<Linear11> for u16 {
    fn from(value: Linear11) -> Self {
        value.to_word()
    }
}

impl fmt::Display for Linear11 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × 2^{}", self.mantissa, self.exponent)
    }
}

/// Encode `value` straight to a LINEAR11 word.
pub fn encode(value: f64) -> Result<u16, Linear11Error> {
    Linear11::encode(value).map(Linear11::to_word)
}

/// Decode a LINEAR11 word. Total over all inputs.
pub fn decode(word: u16) -> f64 {
    Linear11::from_word(word).to_f64()
}

/// Interpret the low `bits` bits of `raw` as a two's-complement number.
fn sign_extend(raw: u16, bits: u32) -> i16 {
    let mask = (1u16 << bits) - 1;
    let sign = 1u16 << (bits - 1);
    let value = raw & mask;
    if value & sign != 0 {
        (value | !mask) as i16
    } else {
        value as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_extend_field_edges() {
        assert_eq!(sign_extend(0x0F, 5), 15);
        assert_eq!(sign_extend(0x10, 5), -16);
        assert_eq!(sign_extend(0x1F, 5), -1);
        assert_eq!(sign_extend(0x3FF, 11), 1023);
        assert_eq!(sign_extend(0x400, 11), -1024);
        assert_eq!(sign_extend(0x7FF, 11), -1);
    }

    #[test]
    fn sign_extend_ignores_bits_above_field() {
        assert_eq!(sign_extend(0xFFE1, 5), 1);
        assert_eq!(sign_extend(0xF801, 11), 1);
    }

    #[test]
    fn bitfield_places_exponent_in_high_bits() {
        let bits = Linear11Word::new().with_mantissa(0x39A).with_exponent(0x17);
        assert_eq!(bits.into_bytes(), [0x9A, 0xBB]);
    }
}
