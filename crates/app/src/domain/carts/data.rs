//! Cart Data

use fulfilment::variants::SelectedVariant;

use crate::domain::products::records::ProductUuid;

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product: ProductUuid,
    pub quantity: u32,
    pub variants: Vec<SelectedVariant>,
}

/// Cart Item Update Data
///
/// `variants` replaces the current selection when present.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemUpdate {
    pub quantity: u32,
    pub variants: Option<Vec<SelectedVariant>>,
}
