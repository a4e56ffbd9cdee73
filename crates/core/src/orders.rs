//! Orders
//!
//! Fulfilment status state machine and payment method vocabulary.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parse::UnknownValue;

/// Fulfilment status of an order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment or processing.
    #[default]
    Pending,

    /// Paid and being prepared.
    Processing,

    /// Handed to the carrier.
    Shipped,

    /// Received by the customer.
    Delivered,

    /// Cancelled before shipping.
    Cancelled,

    /// Sent back after shipping.
    Returned,
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionError {
    /// Current status.
    pub from: OrderStatus,

    /// Requested status.
    pub to: OrderStatus,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Returned,
    ];

    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
        }
    }

    /// Statuses reachable from this one.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered, Self::Returned],
            Self::Delivered => &[Self::Returned],
            Self::Cancelled | Self::Returned => &[],
        }
    }

    /// Whether `next` is a legal successor.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Validate a move to `next`, returning the new status.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] for same-state and illegal transitions.
    pub fn transition_to(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }

    /// No further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownValue::new("order status", value))
    }
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card.
    CreditCard,

    /// Debit card.
    DebitCard,

    /// PayPal.
    Paypal,

    /// Bank transfer.
    BankTransfer,

    /// Cash on delivery.
    CashOnDelivery,
}

impl PaymentMethod {
    const ALL: [Self; 5] = [
        Self::CreditCard,
        Self::DebitCard,
        Self::Paypal,
        Self::BankTransfer,
        Self::CashOnDelivery,
    ];

    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank_transfer",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| UnknownValue::new("payment method", value))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn happy_path_is_legal() -> TestResult {
        let status = OrderStatus::Pending
            .transition_to(OrderStatus::Processing)?
            .transition_to(OrderStatus::Shipped)?
            .transition_to(OrderStatus::Delivered)?
            .transition_to(OrderStatus::Returned)?;

        assert!(status.is_terminal(), "returned should be terminal");

        Ok(())
    }

    #[test]
    fn cancellation_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn regressions_and_same_state_are_rejected() {
        assert_eq!(
            OrderStatus::Shipped.transition_to(OrderStatus::Pending),
            Err(TransitionError {
                from: OrderStatus::Shipped,
                to: OrderStatus::Pending,
            })
        );

        for status in OrderStatus::ALL {
            assert!(
                status.transition_to(status).is_err(),
                "{status} -> {status} should be rejected"
            );
        }
    }

    #[test]
    fn terminal_statuses_have_no_successors() {
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
            assert!(!OrderStatus::Returned.can_transition_to(next));
        }
    }

    #[test]
    fn statuses_round_trip_through_strings() -> TestResult {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>()?, status);
        }

        assert!("archived".parse::<OrderStatus>().is_err());

        Ok(())
    }

    #[test]
    fn payment_methods_parse() -> TestResult {
        assert_eq!(
            "cash_on_delivery".parse::<PaymentMethod>()?,
            PaymentMethod::CashOnDelivery
        );
        assert!("bitcoin".parse::<PaymentMethod>().is_err());

        Ok(())
    }
}
