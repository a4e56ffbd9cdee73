//! Carts service errors.

use fulfilment::{coupons::CouponRejection, pricing::PricingError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart already exists")]
    AlreadyExists,

    #[error("cart item not found")]
    NotFound,

    #[error("product not found")]
    ProductNotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("cart items must share one currency")]
    CurrencyMismatch,

    #[error("only {available} of {product_name} in stock")]
    InsufficientStock { product_name: String, available: u32 },

    #[error("cart is empty")]
    EmptyCart,

    #[error("coupon rejected: {0}")]
    CouponRejected(#[from] CouponRejection),

    #[error("cart cannot be priced")]
    Pricing(#[from] PricingError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
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
