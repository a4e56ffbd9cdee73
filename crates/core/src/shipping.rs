//! Shipping
//!
//! Flat shipping rates keyed by delivery speed.

use std::{fmt, str::FromStr};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    money::{self, MoneyMathError},
    parse::UnknownValue,
};

/// Default standard shipping rate in minor units.
pub const DEFAULT_STANDARD_RATE: u64 = 5_99;

/// Default express shipping rate in minor units.
pub const DEFAULT_EXPRESS_RATE: u64 = 14_99;

/// Default overnight shipping rate in minor units.
pub const DEFAULT_OVERNIGHT_RATE: u64 = 29_99;

/// Requested delivery speed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Ground delivery.
    #[default]
    Standard,

    /// Expedited delivery.
    Express,

    /// Next-day delivery.
    Overnight,
}

impl ShippingMethod {
    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }

    /// Parse a method name, falling back to [`ShippingMethod::Standard`] for
    /// anything unrecognised.
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "overnight" => Ok(Self::Overnight),
            _ => Err(UnknownValue::new("shipping method", value)),
        }
    }
}

/// Shipping rate table in minor units of the order currency.
///
/// Methods without an explicit rate are charged the standard rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRates {
    standard: u64,
    rates: FxHashMap<ShippingMethod, u64>,
}

impl ShippingRates {
    /// Create a table with only a standard rate.
    #[must_use]
    pub fn new(standard: u64) -> Self {
        Self {
            standard,
            rates: FxHashMap::default(),
        }
    }

    /// Set the rate for a method.
    #[must_use]
    pub fn with_rate(mut self, method: ShippingMethod, rate: u64) -> Self {
        if method == ShippingMethod::Standard {
            self.standard = rate;
        } else {
            self.rates.insert(method, rate);
        }

        self
    }

    /// Rate for a method in minor units.
    pub fn rate_minor(&self, method: ShippingMethod) -> u64 {
        self.rates.get(&method).copied().unwrap_or(self.standard)
    }

    /// Rate for a method in the given currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyMathError::Overflow`] if the configured rate does not fit in an `i64`.
    pub fn rate_for<'a>(
        &self,
        method: ShippingMethod,
        currency: &'a Currency,
    ) -> Result<Money<'a, Currency>, MoneyMathError> {
        money::from_minor(self.rate_minor(method), currency)
    }
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self::new(DEFAULT_STANDARD_RATE)
            .with_rate(ShippingMethod::Express, DEFAULT_EXPRESS_RATE)
            .with_rate(ShippingMethod::Overnight, DEFAULT_OVERNIGHT_RATE)
    }
}
