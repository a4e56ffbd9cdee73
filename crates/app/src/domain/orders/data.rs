//! Order Data

use fulfilment::{
    addresses::Address,
    orders::{OrderStatus, PaymentMethod},
    shipping::ShippingMethod,
};
use jiff::Timestamp;

use crate::{domain::orders::records::OrderUuid, identity::UserUuid};

/// Checkout Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub shipping_address: Address,

    /// Defaults to the shipping address.
    pub billing_address: Option<Address>,

    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub notes: Option<String>,
}

/// Staff status change, with optional fulfilment annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<Timestamp>,
}

/// A fully priced order ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PricedOrder {
    pub uuid: OrderUuid,
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
    pub notes: Option<String>,
}
