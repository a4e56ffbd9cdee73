//! Variant Body

use fulfilment::variants::SelectedVariant;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Selected product option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct VariantBody {
    /// Option group, e.g. "size"
    pub name: String,

    /// Chosen option, e.g. "L"
    pub option: String,

    /// Signed unit price adjustment in minor units
    #[serde(default)]
    pub price_modifier: i64,
}

impl From<VariantBody> for SelectedVariant {
    fn from(body: VariantBody) -> Self {
        SelectedVariant {
            name: body.name,
            option: body.option,
            price_modifier: body.price_modifier,
        }
    }
}

impl From<SelectedVariant> for VariantBody {
    fn from(variant: SelectedVariant) -> Self {
        Self {
            name: variant.name,
            option: variant.option,
            price_modifier: variant.price_modifier,
        }
    }
}
