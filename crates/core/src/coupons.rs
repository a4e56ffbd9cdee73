//! Coupons
//!
//! Stateless coupon rule evaluation. A coupon is checked against the lines of a
//! candidate cart at a point in time; nothing here mutates usage counters, that
//! happens in storage when an order is placed.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::money::{self, MoneyMathError};

/// Coupon code parsing errors.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CouponCodeError {
    /// The code was empty after trimming.
    #[error("coupon code must not be empty")]
    Empty,

    /// The code contained whitespace or control characters.
    #[error("coupon code contains invalid characters")]
    InvalidCharacters,
}

/// Case-normalised coupon code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Trim and upper-case a raw code.
    ///
    /// # Errors
    ///
    /// Returns [`CouponCodeError`] for empty codes or codes containing whitespace.
    pub fn parse(raw: &str) -> Result<Self, CouponCodeError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CouponCodeError::Empty);
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(CouponCodeError::InvalidCharacters);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// Normalised code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CouponCode {
    type Err = CouponCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CouponRejection {
    /// No coupon with this code exists, or it has been deactivated.
    #[error("coupon not found")]
    CouponNotFound,

    /// The current time is outside the coupon's validity window.
    #[error("coupon has expired or is not yet valid")]
    CouponExpired,

    /// The coupon has been redeemed as many times as allowed.
    #[error("coupon usage limit reached")]
    UsageLimitReached,

    /// The cart subtotal is below the coupon's minimum purchase.
    #[error("cart subtotal is below the coupon minimum purchase")]
    MinPurchaseNotMet,

    /// No cart line matches the coupon's product or category restrictions.
    #[error("coupon does not apply to any item in the cart")]
    NotApplicable,
}

impl CouponRejection {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CouponNotFound => "coupon_not_found",
            Self::CouponExpired => "coupon_expired",
            Self::UsageLimitReached => "usage_limit_reached",
            Self::MinPurchaseNotMet => "min_purchase_not_met",
            Self::NotApplicable => "not_applicable",
        }
    }
}

/// How a coupon reduces the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponDiscount {
    /// Whole percentage points off the subtotal.
    Percentage {
        /// Percentage points, 1 to 100.
        percentage: u16,
    },

    /// A fixed amount off the subtotal, in minor units of the order currency.
    Fixed {
        /// Amount in minor units.
        amount: u64,
    },
}

impl CouponDiscount {
    /// Stable string form of the discount type.
    #[must_use]
    pub const fn kind_as_str(&self) -> &'static str {
        match self {
            Self::Percentage { .. } => "percentage",
            Self::Fixed { .. } => "fixed",
        }
    }

    /// Raw value: percentage points or minor units.
    #[must_use]
    pub fn value(&self) -> u64 {
        match self {
            Self::Percentage { percentage } => u64::from(*percentage),
            Self::Fixed { amount } => *amount,
        }
    }
}

/// A single cart line as seen by coupon applicability checks.
#[derive(Debug, Clone)]
pub struct CouponLine<'a> {
    /// Product on the line.
    pub product: Uuid,

    /// Categories the product belongs to.
    pub categories: &'a [Uuid],

    /// Effective unit price times quantity.
    pub line_total: Money<'a, Currency>,
}

/// Coupon record fields that govern whether and how it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRules {
    /// Discount type and value.
    pub discount: CouponDiscount,

    /// Minimum cart subtotal in minor units.
    pub min_purchase: u64,

    /// Optional cap on the discount in minor units.
    pub max_discount: Option<u64>,

    /// Start of the validity window (inclusive).
    pub valid_from: Timestamp,

    /// End of the validity window (inclusive).
    pub valid_until: Timestamp,

    /// Maximum number of redemptions, unlimited when `None`.
    pub usage_limit: Option<u64>,

    /// Redemptions so far.
    pub usage_count: u64,

    /// Inactive coupons behave as if they did not exist.
    pub is_active: bool,

    /// Products the coupon is restricted to. Empty means unrestricted.
    pub applicable_products: FxHashSet<Uuid>,

    /// Categories the coupon is restricted to. Empty means unrestricted.
    pub applicable_categories: FxHashSet<Uuid>,
}

impl CouponRules {
    /// Check the coupon against candidate cart lines.
    ///
    /// Checks run in a fixed order and the first failure wins: active, validity
    /// window, usage limit, minimum purchase, product/category applicability.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponRejection`] for the first failing check.
    pub fn validate(&self, lines: &[CouponLine<'_>], now: Timestamp) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::CouponNotFound);
        }

        if now < self.valid_from || now > self.valid_until {
            return Err(CouponRejection::CouponExpired);
        }

        if self
            .usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
        {
            return Err(CouponRejection::UsageLimitReached);
        }

        let subtotal: i128 = lines
            .iter()
            .map(|line| i128::from(line.line_total.to_minor_units()))
            .sum();

        if subtotal < i128::from(self.min_purchase) {
            return Err(CouponRejection::MinPurchaseNotMet);
        }

        if !self.applies_to_any(lines) {
            return Err(CouponRejection::NotApplicable);
        }

        Ok(())
    }

    /// Discount this coupon gives on a subtotal.
    ///
    /// Percentage discounts are rounded to whole minor units. The result is capped
    /// at `max_discount` when set, and never exceeds the subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyMathError`] if the calculation overflows.
    pub fn discount_on<'a>(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, MoneyMathError> {
        let subtotal_minor = subtotal.to_minor_units().max(0);

        let raw = match self.discount {
            CouponDiscount::Percentage { percentage } => {
                money::percent_of_minor(&money::percentage_points(percentage), subtotal_minor)?
            }
            CouponDiscount::Fixed { amount } => {
                i64::try_from(amount).map_err(|_overflow| MoneyMathError::Overflow)?
            }
        };

        let capped = match self.max_discount {
            Some(max) => raw.min(i64::try_from(max).unwrap_or(i64::MAX)),
            None => raw,
        };

        Ok(Money::from_minor(
            capped.clamp(0, subtotal_minor),
            subtotal.currency(),
        ))
    }

    fn applies_to_any(&self, lines: &[CouponLine<'_>]) -> bool {
        if self.applicable_products.is_empty() && self.applicable_categories.is_empty() {
            return true;
        }

        lines.iter().any(|line| {
            self.applicable_products.contains(&line.product)
                || line
                    .categories
                    .iter()
                    .any(|category| self.applicable_categories.contains(category))
        })
    }
}
