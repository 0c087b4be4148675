use std::{fmt::Display, str::FromStr};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;

use crate::{
    fixed_point::{fmt_hundredths, parse_hundredths},
    Money,
    MoneyConversionError,
};

/// A percentage with two decimal places, stored as hundredths of a percent (`18%` is `1800`).
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[sqlx(transparent)]
pub struct TaxRate(i64);

impl TaxRate {
    pub fn from_hundredths(value: i64) -> Result<Self, MoneyConversionError> {
        if value < 0 {
            return Err(MoneyConversionError(format!("Tax rate cannot be negative ({value})")));
        }
        Ok(Self(value))
    }

    /// Whole percent, e.g. `TaxRate::from_percent(18)`.
    pub fn from_percent(percent: u32) -> Self {
        Self(i64::from(percent) * 100)
    }

    pub fn hundredths(&self) -> i64 {
        self.0
    }

    /// `amount × rate / 100`, rounded half away from zero to the nearest minor unit.
    pub fn tax_on(&self, amount: Money) -> Result<Money, MoneyConversionError> {
        let product = i128::from(amount.value()) * i128::from(self.0);
        let half = 5_000i128;
        let rounded = if product >= 0 { (product + half) / 10_000 } else { (product - half) / 10_000 };
        i64::try_from(rounded)
            .map(Money::from)
            .map_err(|_| MoneyConversionError(format!("Tax of {self}% on {amount} overflows")))
    }
}

impl FromStr for TaxRate {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_hundredths(s).map_err(MoneyConversionError)?;
        Self::from_hundredths(value)
    }
}

impl Display for TaxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_hundredths(self.0, f)
    }
}

impl Serialize for TaxRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaxRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
