//! Payments service errors.

use fulfilment::{
    money::MoneyMathError,
    payments::{PaymentStatus, RefundError},
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment already exists")]
    AlreadyExists,

    #[error("payment or order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("not allowed to access this payment")]
    Unauthorized,

    #[error("order is already paid")]
    AlreadySettled,

    #[error("order is cancelled")]
    OrderCancelled,

    #[error("payment must be {expected} {currency}")]
    AmountMismatch { expected: u64, currency: String },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("refund exceeds remaining {remaining}")]
    OverRefund { remaining: u64 },

    #[error("payment in status {0} cannot be refunded")]
    NotRefundable(PaymentStatus),

    #[error("money calculation failed")]
    Money(#[from] MoneyMathError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<RefundError> for PaymentsServiceError {
    fn from(error: RefundError) -> Self {
        match error {
            RefundError::NotRefundable(status) => Self::NotRefundable(status),
            RefundError::InvalidAmount => Self::InvalidAmount,
            RefundError::OverRefund { remaining } => Self::OverRefund {
                remaining: u64::try_from(remaining).unwrap_or_default(),
            },
            RefundError::Money(error) => Self::Money(error.into()),
        }
    }
}
