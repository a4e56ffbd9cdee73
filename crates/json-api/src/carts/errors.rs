//! Errors

use salvo::http::StatusError;
use tracing::error;

use fulfilment_app::domain::carts::CartsServiceError;

use crate::coupons::errors::{pricing_failed, rejected};

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::AlreadyExists => StatusError::conflict().brief("Cart already exists"),
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        CartsServiceError::CurrencyMismatch => {
            StatusError::bad_request().brief("Cart items must share one currency")
        }
        CartsServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        error @ CartsServiceError::InsufficientStock { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        CartsServiceError::CouponRejected(rejection) => rejected(rejection),
        CartsServiceError::Pricing(source) => pricing_failed(&source),
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
