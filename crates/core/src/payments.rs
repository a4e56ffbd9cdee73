//! Payments
//!
//! Payment-level and order-level payment status, and refund arithmetic.

use std::{fmt, str::FromStr};

use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parse::UnknownValue;

/// Status of a single payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, not yet captured.
    Pending,

    /// Captured.
    Completed,

    /// Capture failed.
    Failed,

    /// Fully refunded.
    Refunded,

    /// Some, but not all, of the amount refunded.
    PartiallyRefunded,
}

impl PaymentStatus {
    const ALL: [Self; 5] = [
        Self::Pending,
        Self::Completed,
        Self::Failed,
        Self::Refunded,
        Self::PartiallyRefunded,
    ];

    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        }
    }

    /// Whether further refunds may be issued against this payment.
    #[must_use]
    pub const fn is_refundable(self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyRefunded)
    }

    /// Order-level status mirrored from this payment, if it drives one.
    #[must_use]
    pub const fn order_payment_status(self) -> Option<OrderPaymentStatus> {
        match self {
            Self::Completed => Some(OrderPaymentStatus::Paid),
            Self::Refunded => Some(OrderPaymentStatus::Refunded),
            Self::PartiallyRefunded => Some(OrderPaymentStatus::PartiallyRefunded),
            Self::Pending | Self::Failed => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownValue::new("payment status", value))
    }
}

/// Payment status as recorded on the order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPaymentStatus {
    /// Awaiting payment.
    #[default]
    Pending,

    /// Paid in full.
    Paid,

    /// Fully refunded.
    Refunded,

    /// Partially refunded.
    PartiallyRefunded,
}

impl OrderPaymentStatus {
    const ALL: [Self; 4] = [
        Self::Pending,
        Self::Paid,
        Self::Refunded,
        Self::PartiallyRefunded,
    ];

    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl fmt::Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderPaymentStatus {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownValue::new("order payment status", value))
    }
}

/// Refund rejections.
#[derive(Debug, Error, PartialEq)]
pub enum RefundError {
    /// The payment is not in a refundable state.
    #[error("payment in status {0} cannot be refunded")]
    NotRefundable(PaymentStatus),

    /// The refund amount must be positive.
    #[error("refund amount must be greater than zero")]
    InvalidAmount,

    /// The refund exceeds what remains of the payment.
    #[error("refund exceeds remaining amount of {remaining} minor units")]
    OverRefund {
        /// Remaining refundable amount in minor units.
        remaining: i64,
    },

    /// Money arithmetic or currency mismatch.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Result of applying a refund.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefundOutcome<'a> {
    /// Cumulative refunded amount after this refund.
    pub refunded: Money<'a, Currency>,

    /// New payment status.
    pub status: PaymentStatus,
}

/// Apply a refund to a payment.
///
/// `paid` is the original payment amount and `refunded` what has been refunded so
/// far. The payment becomes [`PaymentStatus::Refunded`] once the cumulative refund
/// equals the paid amount.
///
/// # Errors
///
/// - [`RefundError::NotRefundable`]: status is not completed or partially refunded.
/// - [`RefundError::InvalidAmount`]: `amount` is zero or negative.
/// - [`RefundError::OverRefund`]: `amount` exceeds `paid - refunded`.
/// - [`RefundError::Money`]: amounts are in different currencies.
pub fn apply_refund<'a>(
    paid: Money<'a, Currency>,
    refunded: Money<'a, Currency>,
    status: PaymentStatus,
    amount: Money<'a, Currency>,
) -> Result<RefundOutcome<'a>, RefundError> {
    if !status.is_refundable() {
        return Err(RefundError::NotRefundable(status));
    }

    if amount.to_minor_units() <= 0 {
        return Err(RefundError::InvalidAmount);
    }

    let remaining = paid.sub(refunded)?;

    if remaining.sub(amount)?.to_minor_units() < 0 {
        return Err(RefundError::OverRefund {
            remaining: remaining.to_minor_units(),
        });
    }

    let refunded = refunded.add(amount)?;

    let status = if refunded == paid {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    };

    Ok(RefundOutcome { refunded, status })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn repeated_partial_refunds_then_over_refund() -> TestResult {
        let paid = Money::from_minor(100_00, USD);

        let first = apply_refund(
            paid,
            Money::from_minor(0, USD),
            PaymentStatus::Completed,
            Money::from_minor(40_00, USD),
        )?;

        assert_eq!(first.status, PaymentStatus::PartiallyRefunded);

        let second = apply_refund(
            paid,
            first.refunded,
            first.status,
            Money::from_minor(40_00, USD),
        )?;

        assert_eq!(second.refunded, Money::from_minor(80_00, USD));
        assert_eq!(second.status, PaymentStatus::PartiallyRefunded);

        let third = apply_refund(
            paid,
            second.refunded,
            second.status,
            Money::from_minor(30_00, USD),
        );

        assert_eq!(third, Err(RefundError::OverRefund { remaining: 20_00 }));

        Ok(())
    }

    #[test]
    fn full_refund_marks_refunded() -> TestResult {
        let paid = Money::from_minor(50_00, USD);

        let outcome = apply_refund(
            paid,
            Money::from_minor(10_00, USD),
            PaymentStatus::PartiallyRefunded,
            Money::from_minor(40_00, USD),
        )?;

        assert_eq!(outcome.status, PaymentStatus::Refunded);
        assert_eq!(outcome.refunded, paid);

        Ok(())
    }

    #[test]
    fn refunded_and_pending_payments_cannot_be_refunded() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(
                apply_refund(
                    Money::from_minor(10_00, USD),
                    Money::from_minor(0, USD),
                    status,
                    Money::from_minor(1_00, USD),
                ),
                Err(RefundError::NotRefundable(status))
            );
        }
    }

    #[test]
    fn zero_refund_is_rejected() {
        assert_eq!(
            apply_refund(
                Money::from_minor(10_00, USD),
                Money::from_minor(0, USD),
                PaymentStatus::Completed,
                Money::from_minor(0, USD),
            ),
            Err(RefundError::InvalidAmount)
        );
    }

    #[test]
    fn refund_in_other_currency_is_rejected() {
        let result = apply_refund(
            Money::from_minor(10_00, USD),
            Money::from_minor(0, USD),
            PaymentStatus::Completed,
            Money::from_minor(1_00, EUR),
        );

        assert!(
            matches!(result, Err(RefundError::Money(_))),
            "expected currency mismatch, got {result:?}"
        );
    }

    #[test]
    fn order_payment_status_mirrors_payment() {
        assert_eq!(
            PaymentStatus::Completed.order_payment_status(),
            Some(OrderPaymentStatus::Paid)
        );
        assert_eq!(
            PaymentStatus::PartiallyRefunded.order_payment_status(),
            Some(OrderPaymentStatus::PartiallyRefunded)
        );
        assert_eq!(PaymentStatus::Failed.order_payment_status(), None);
    }
}
