//! Order Records

use fulfilment::{
    addresses::Address,
    orders::{OrderStatus, PaymentMethod},
    payments::OrderPaymentStatus,
    shipping::ShippingMethod,
    variants::SelectedVariant,
};
use jiff::Timestamp;

use crate::{domain::products::records::ProductUuid, identity::UserUuid, uuids::TypedUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
///
/// Amounts are minor units of `currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub user: UserUuid,
    pub currency: String,
    pub subtotal: u64,
    pub discount: u64,
    pub tax: u64,
    pub shipping: u64,
    pub total: u64,
    pub coupon_code: Option<String>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub payment_status: OrderPaymentStatus,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<Timestamp>,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record
///
/// A snapshot of the product at checkout; later catalog changes do not affect it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub product: ProductUuid,
    pub name: String,
    pub sku: String,
    pub image: Option<String>,
    pub unit_price: u64,
    pub quantity: u32,
    pub variants: Vec<SelectedVariant>,
    pub line_total: u64,
}
