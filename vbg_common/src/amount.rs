use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub, SubAssign},
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_DEPOSIT_PERCENT: u8 = 30;
pub const MIN_DEPOSIT_PERCENT: u8 = 10;
pub const MAX_DEPOSIT_PERCENT: u8 = 50;

//--------------------------------------      Amount       -----------------------------------------------------------
/// A monetary amount, stored as an integer number of minor currency units (cents).
///
/// All arithmetic is integer arithmetic on minor units, so deposit and remainder always reconstruct the total
/// exactly. The JSON representation is the major-unit decimal value (e.g. `300.0` for 30000 cents), matching what
/// API clients expect to send and receive.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Amount(i64);

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct AmountConversionError(String);

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Amount {}

impl TryFrom<f64> for Amount {
    type Error = AmountConversionError;

    fn try_from(major: f64) -> Result<Self, Self::Error> {
        if !major.is_finite() {
            return Err(AmountConversionError(format!("{major} is not a finite number")));
        }
        let minor = (major * 100.0).round();
        if minor.abs() >= i64::MAX as f64 {
            return Err(AmountConversionError(format!("{major} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(minor as i64))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0.2}", self.to_major())
    }
}

impl Amount {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn from_major(major: i64) -> Self {
        Self(major * 100)
    }

    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The deposit due for this total at the given percentage, rounded half-up to the nearest minor unit.
    ///
    /// Half-up is the single rounding rule used everywhere, so `deposit + remainder == total` always holds
    /// exactly in minor units.
    pub fn deposit_at_percent(self, percent: u8) -> Self {
        Self((self.0 * i64::from(percent) + 50).div_euclid(100))
    }

    /// The balance still owed after subtracting `deposit`, clamped at zero.
    pub fn remaining_after(self, deposit: Self) -> Self {
        Self((self.0 - deposit.0).max(0))
    }
}

// Serialized as the major-unit decimal value. The minor-unit integer is an internal representation only.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        Amount::try_from(major).map_err(de::Error::custom)
    }
}
