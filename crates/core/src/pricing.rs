//! Pricing
//!
//! Computes order totals from a cart snapshot. Pure and deterministic: the same
//! lines, coupon, method and configuration always produce the same totals.

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    coupons::CouponRules,
    money::{self, MoneyMathError},
    shipping::{ShippingMethod, ShippingRates},
    variants::{self, SelectedVariant},
};

/// Default tax rate in whole percentage points.
pub const DEFAULT_TAX_RATE_POINTS: u16 = 10;

/// Errors raised while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// There are no lines to price.
    #[error("cannot price an empty cart")]
    NoItems,

    /// Variant modifiers pushed a unit price below zero.
    #[error("effective unit price must not be negative")]
    NegativeUnitPrice,

    /// Checked arithmetic failed.
    #[error(transparent)]
    Math(#[from] MoneyMathError),

    /// Money arithmetic or currency mismatch.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A priced cart line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingLine<'a> {
    effective_unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> PricingLine<'a> {
    /// Build a line from the unit price snapshot, quantity and chosen variants.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeUnitPrice`] if modifiers take the unit price
    /// below zero.
    pub fn new(
        unit_price: Money<'a, Currency>,
        quantity: u32,
        variants: &[SelectedVariant],
    ) -> Result<Self, PricingError> {
        let modifier = variants::modifier_total(variants)?;

        let effective = unit_price
            .to_minor_units()
            .checked_add(modifier)
            .ok_or(MoneyMathError::Overflow)?;

        if effective < 0 {
            return Err(PricingError::NegativeUnitPrice);
        }

        Ok(Self {
            effective_unit_price: Money::from_minor(effective, unit_price.currency()),
            quantity,
        })
    }

    /// Unit price including variant modifiers.
    pub fn effective_unit_price(&self) -> Money<'a, Currency> {
        self.effective_unit_price
    }

    /// Quantity purchased.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Effective unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyMathError::Overflow`] if the product overflows.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, MoneyMathError> {
        money::multiply(&self.effective_unit_price, self.quantity)
    }
}

/// Tax and shipping configuration.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Tax rate applied to the pre-discount subtotal.
    pub tax_rate: Percentage,

    /// Shipping rate table.
    pub shipping: ShippingRates,
}

impl PricingConfig {
    /// Build a configuration from a whole-point tax rate and a rate table.
    #[must_use]
    pub fn new(tax_rate_points: u16, shipping: ShippingRates) -> Self {
        Self {
            tax_rate: money::percentage_points(tax_rate_points),
            shipping,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TAX_RATE_POINTS, ShippingRates::default())
    }
}

/// Computed order totals in one currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals<'a> {
    /// Sum of line totals.
    pub subtotal: Money<'a, Currency>,

    /// Coupon discount, never more than the subtotal.
    pub discount: Money<'a, Currency>,

    /// Tax on the subtotal.
    pub tax: Money<'a, Currency>,

    /// Shipping charge.
    pub shipping: Money<'a, Currency>,

    /// `subtotal + tax + shipping - discount`.
    pub total: Money<'a, Currency>,
}

/// Price a cart snapshot.
///
/// The coupon, if any, must already have been validated; this only computes its
/// discount.
///
/// # Errors
///
/// - [`PricingError::NoItems`]: `lines` is empty.
/// - [`PricingError::Money`]: lines are in different currencies.
/// - [`PricingError::Math`]: arithmetic overflowed.
pub fn price<'a>(
    lines: &[PricingLine<'a>],
    coupon: Option<&CouponRules>,
    method: ShippingMethod,
    config: &PricingConfig,
) -> Result<Totals<'a>, PricingError> {
    let currency = lines
        .first()
        .ok_or(PricingError::NoItems)?
        .effective_unit_price
        .currency();

    let line_totals = lines
        .iter()
        .map(PricingLine::line_total)
        .collect::<Result<SmallVec<[_; 8]>, _>>()?;

    let subtotal = money::sum(currency, line_totals)?;

    let discount = match coupon {
        Some(rules) => rules.discount_on(&subtotal)?,
        None => money::zero(currency),
    };

    let tax = money::percent_of(&subtotal, &config.tax_rate)?;
    let shipping = config.shipping.rate_for(method, currency)?;

    let total = subtotal.add(tax)?.add(shipping)?.sub(discount)?;

    Ok(Totals {
        subtotal,
        discount,
        tax,
        shipping,
        total,
    })
}
