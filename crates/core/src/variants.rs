//! Variant Selections

use serde::{Deserialize, Serialize};

use crate::money::MoneyMathError;

/// A chosen product option (e.g. size "L") and its effect on the unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedVariant {
    /// Option group name, e.g. "size".
    pub name: String,

    /// Chosen option, e.g. "L".
    pub option: String,

    /// Signed adjustment to the unit price in minor units.
    #[serde(default)]
    pub price_modifier: i64,
}

/// Sum the price modifiers of a variant selection.
///
/// # Errors
///
/// Returns [`MoneyMathError::Overflow`] if the sum does not fit in an `i64`.
pub fn modifier_total(variants: &[SelectedVariant]) -> Result<i64, MoneyMathError> {
    variants.iter().try_fold(0_i64, |acc, variant| {
        acc.checked_add(variant.price_modifier)
            .ok_or(MoneyMathError::Overflow)
    })
}
