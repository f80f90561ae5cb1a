//! # RUT — Chilean Taxpayer Identifier
//!
//! `Rut` is a validated newtype for the Rol Único Tributario. The check
//! digit is verified at construction with the modulo-11 algorithm, so a
//! `Rut` value in hand is always internally consistent.
//!
//! ## Wire Format
//!
//! The SII wire format is `NNNNNNNN-D`: no thousands separators, a single
//! dash, and `K` (upper case) for the check digit ten. `Display`, `Serialize`
//! and `Deserialize` all use that form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DteError;

/// A validated Chilean RUT: number plus modulo-11 check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rut {
    number: u32,
    check_digit: char,
}

impl Rut {
    /// Build a RUT from its numeric part, computing the check digit.
    pub fn from_number(number: u32) -> Self {
        Self {
            number,
            check_digit: compute_check_digit(number),
        }
    }

    /// Parse a RUT from `NNNNNNNN-D` form. Dots are tolerated and stripped;
    /// the check digit is validated.
    pub fn parse(s: &str) -> Result<Self, DteError> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '.').collect();
        let (num_part, dv_part) = cleaned
            .split_once('-')
            .ok_or_else(|| DteError::Config(format!("RUT {s:?} is missing the check digit dash")))?;
        let number: u32 = num_part
            .parse()
            .map_err(|_| DteError::Config(format!("RUT {s:?} has a non-numeric body")))?;
        let dv = dv_part
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .filter(|_| dv_part.chars().count() == 1)
            .ok_or_else(|| DteError::Config(format!("RUT {s:?} has a malformed check digit")))?;
        let expected = compute_check_digit(number);
        if dv != expected {
            return Err(DteError::Config(format!(
                "RUT {s:?} fails check digit validation (expected {expected})"
            )));
        }
        Ok(Self {
            number,
            check_digit: dv,
        })
    }

    /// The generic end-consumer RUT stamped on sub-threshold receipts when
    /// no recipient was identified.
    pub fn generic_consumer() -> Self {
        Self::from_number(66_666_666)
    }

    /// Whether this is the generic end-consumer RUT.
    pub fn is_generic_consumer(&self) -> bool {
        self.number == 66_666_666
    }

    /// Numeric part, without check digit.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The check digit character (`0`-`9` or `K`).
    pub fn check_digit(&self) -> char {
        self.check_digit
    }
}

impl std::fmt::Display for Rut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.number, self.check_digit)
    }
}

impl Serialize for Rut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rut::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Modulo-11 check digit: weights 2..=7 cycling from the least significant
/// digit; remainder 11 maps to `0`, 10 maps to `K`.
fn compute_check_digit(number: u32) -> char {
    let mut sum: u32 = 0;
    let mut factor: u32 = 2;
    let mut n = number;
    while n > 0 {
        sum += (n % 10) * factor;
        n /= 10;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}
