use crate::error::{CryptoError, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// An arbitrary-precision non-negative monetary value. Rendered as a decimal
/// string at every serialized boundary (transactions, balances, JSON
/// responses) so it round-trips without precision loss.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(v: u64) -> Self {
        Self(BigUint::from(v))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }
}

impl Add for &Amount {
    type Output = Amount;
    fn add(self, rhs: Self) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl Sub for &Amount {
    type Output = Amount;
    fn sub(self, rhs: Self) -> Amount {
        Amount(&self.0 - &rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = CryptoError;
    fn from_str(s: &str) -> Result<Self> {
        BigUint::from_str(s)
            .map(Amount)
            .map_err(|e| CryptoError::InvalidAmount(e.to_string()))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}
