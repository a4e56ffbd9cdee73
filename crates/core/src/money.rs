//! Money
//!
//! Checked arithmetic over minor units shared by pricing, coupons and refunds.
//! Persisted amounts are unsigned minor units; arithmetic happens on
//! [`rusty_money::Money`] so currency mismatches surface as errors.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Findable, Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors raised by money helpers.
#[derive(Debug, Error, PartialEq)]
pub enum MoneyMathError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// An amount did not fit in the target integer type.
    #[error("amount overflowed")]
    Overflow,

    /// An amount that must be non-negative was negative.
    #[error("amount must not be negative")]
    Negative,

    /// The ISO currency code is not recognised.
    #[error("unknown currency code {0:?}")]
    UnknownCurrency(String),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Resolve an ISO-4217 currency code.
///
/// # Errors
///
/// Returns [`MoneyMathError::UnknownCurrency`] when the code is not an ISO currency.
pub fn currency(code: &str) -> Result<&'static Currency, MoneyMathError> {
    Currency::find(code).ok_or_else(|| MoneyMathError::UnknownCurrency(code.to_owned()))
}

/// Build money from unsigned minor units.
///
/// # Errors
///
/// Returns [`MoneyMathError::Overflow`] if `minor` does not fit in an `i64`.
pub fn from_minor(minor: u64, currency: &Currency) -> Result<Money<'_, Currency>, MoneyMathError> {
    let minor = i64::try_from(minor).map_err(|_overflow| MoneyMathError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

/// Convert money back to unsigned minor units for storage.
///
/// # Errors
///
/// Returns [`MoneyMathError::Negative`] for negative amounts.
pub fn to_minor(money: &Money<'_, Currency>) -> Result<u64, MoneyMathError> {
    u64::try_from(money.to_minor_units()).map_err(|_negative| MoneyMathError::Negative)
}

/// Zero in the given currency.
pub fn zero(currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(0, currency)
}

/// Multiply a price by a quantity.
///
/// # Errors
///
/// Returns [`MoneyMathError::Overflow`] if the product does not fit in minor units.
pub fn multiply<'a>(
    money: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    let minor = money
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(MoneyMathError::Overflow)?;

    Ok(Money::from_minor(minor, money.currency()))
}

/// Sum amounts that must share one currency.
///
/// # Errors
///
/// Returns [`MoneyMathError::Money`] on a currency mismatch or overflow.
pub fn sum<'a, I>(currency: &'a Currency, amounts: I) -> Result<Money<'a, Currency>, MoneyMathError>
where
    I: IntoIterator<Item = Money<'a, Currency>>,
{
    amounts
        .into_iter()
        .try_fold(zero(currency), |acc, amount| Ok(acc.add(amount)?))
}

/// Take a percentage of an amount, rounding half away from zero to whole minor units.
///
/// # Errors
///
/// Returns [`MoneyMathError::PercentConversion`] if the calculation overflows.
pub fn percent_of<'a>(
    money: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    let minor = percent_of_minor(percent, money.to_minor_units())?;

    Ok(Money::from_minor(minor, money.currency()))
}

/// Calculate a percentage of a minor unit amount.
///
/// # Errors
///
/// Returns [`MoneyMathError::PercentConversion`] if the calculation overflows or
/// cannot be represented in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, MoneyMathError> {
    let minor = Decimal::from_i64(minor).ok_or(MoneyMathError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(MoneyMathError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyMathError::PercentConversion)
}

/// Build a percentage from whole percentage points (`10` is 10%).
pub fn percentage_points(points: u16) -> Percentage {
    Percentage::from(f64::from(points) / 100.0)
}
