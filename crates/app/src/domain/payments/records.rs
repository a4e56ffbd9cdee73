//! Payment Records

use fulfilment::{addresses::Address, orders::PaymentMethod, payments::PaymentStatus};
use jiff::Timestamp;

use crate::{domain::orders::records::OrderUuid, identity::UserUuid, uuids::TypedUuid};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// Payment Record
///
/// `amount` and `refund_amount` are minor units of `currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub order: OrderUuid,
    pub user: UserUuid,
    pub amount: u64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub billing_address: Option<Address>,
    pub refund_amount: u64,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Amount that can still be refunded.
    #[must_use]
    pub fn refundable(&self) -> u64 {
        self.amount.saturating_sub(self.refund_amount)
    }
}
