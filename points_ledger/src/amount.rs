//! Fixed-point point amounts.
//!
//! Callers speak in points with up to two decimal places ("50.00"); the ledger
//! stores integer minor units (5000). Parsing truncates anything past the
//! second decimal place.

use crate::errors::{LedgerError, LedgerResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Minor units per displayed point
pub const MINOR_UNITS_PER_POINT: i64 = 100;

/// An amount of points held as integer minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Points(i64);

impl Points {
    /// Wrap a raw minor-unit value.
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Raw minor-unit value.
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Convert a decimal point value into minor units, truncating toward zero.
    pub fn from_decimal(value: Decimal) -> LedgerResult<Self> {
        value
            .checked_mul(Decimal::from(MINOR_UNITS_PER_POINT))
            .map(|scaled| scaled.trunc())
            .and_then(|scaled| scaled.to_i64())
            .map(Self)
            .ok_or_else(|| LedgerError::InvalidArgument(format!("points out of range: {value}")))
    }

    /// Value as displayed to callers: minor units / 100.
    ///
    /// 17500 renders as 175.0, 8334 as 83.34, 8305 as 83.05.
    pub fn display_value(self) -> f64 {
        Decimal::new(self.0, 2).to_f64().unwrap_or_default()
    }
}

impl FromStr for Points {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str(trimmed)
            .map_err(|_| LedgerError::InvalidArgument(format!("malformed points: {s:?}")))?;
        Self::from_decimal(value)
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Points::from_decimal(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Decimal::new(self.0, 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_points() {
        assert_eq!("100".parse::<Points>().unwrap().minor(), 10_000);
        assert_eq!("50.00".parse::<Points>().unwrap().minor(), 5_000);
    }

    #[test]
    fn test_parse_truncates_sub_minor_digits() {
        assert_eq!("83.339".parse::<Points>().unwrap().minor(), 8_333);
        assert_eq!("0.299".parse::<Points>().unwrap().minor(), 29);
        assert_eq!("0.001".parse::<Points>().unwrap().minor(), 0);
    }

    #[test]
    fn test_parse_is_exact_for_binary_unfriendly_values() {
        // 0.29 * 100 in binary floating point is 28.999...
        assert_eq!("0.29".parse::<Points>().unwrap().minor(), 29);
        assert_eq!("1.15".parse::<Points>().unwrap().minor(), 115);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "abc".parse::<Points>(),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!("".parse::<Points>().is_err());
        assert!("99999999999999999999".parse::<Points>().is_err());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(Points::from_minor(17_500).display_value(), 175.0);
        assert_eq!(Points::from_minor(8_334).display_value(), 83.34);
        assert_eq!(Points::from_minor(8_305).display_value(), 83.05);
        assert_eq!(Points::from_minor(0).display_value(), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Points::from_minor(8_305).to_string(), "83.05");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_int: Points = serde_json::from_str("100").unwrap();
        let from_float: Points = serde_json::from_str("83.34").unwrap();
        let from_str: Points = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(from_int.minor(), 10_000);
        assert_eq!(from_float.minor(), 8_334);
        assert_eq!(from_str.minor(), 1_250);
    }
}
