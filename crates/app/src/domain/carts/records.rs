//! Cart Records

use fulfilment::variants::SelectedVariant;
use jiff::Timestamp;

use crate::{domain::products::records::ProductUuid, identity::UserUuid, uuids::TypedUuid};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone, PartialEq)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user: UserUuid,
    pub coupon_code: Option<String>,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency shared by every item, if the cart has any.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.items.first().map(|item| item.currency.as_str())
    }
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product: ProductUuid,
    pub quantity: u32,
    pub unit_price: u64,
    pub currency: String,
    pub variants: Vec<SelectedVariant>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
