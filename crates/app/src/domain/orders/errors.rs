//! Orders service errors.

use fulfilment::{
    addresses::AddressError, coupons::CouponRejection, orders::TransitionError,
    pricing::PricingError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("not allowed to access this order")]
    Unauthorized,

    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("only {available} of {product_name} in stock")]
    InsufficientStock { product_name: String, available: u32 },

    #[error("coupon rejected: {0}")]
    CouponRejected(#[from] CouponRejection),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("order cannot be priced")]
    Pricing(#[from] PricingError),

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
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
