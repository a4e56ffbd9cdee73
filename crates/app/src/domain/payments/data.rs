//! Payment Data

use fulfilment::{addresses::Address, orders::PaymentMethod};

use crate::domain::payments::records::PaymentUuid;

/// A capture already completed by the payment gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub uuid: PaymentUuid,
    pub method: PaymentMethod,
    pub amount: u64,
    pub currency: String,
    pub transaction_id: Option<String>,
    pub billing_address: Option<Address>,
}

/// New Refund Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewRefund {
    pub amount: u64,
    pub reason: Option<String>,
}
