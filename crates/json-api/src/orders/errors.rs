//! Errors

use salvo::http::StatusError;
use tracing::error;

use fulfilment_app::domain::orders::OrdersServiceError;

use crate::coupons::errors::{pricing_failed, rejected};

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::Unauthorized => {
            StatusError::forbidden().brief("Not allowed to access this order")
        }
        OrdersServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        OrdersServiceError::InvalidAddress(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        error @ (OrdersServiceError::InsufficientStock { .. }
        | OrdersServiceError::InvalidTransition(_)) => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::CouponRejected(rejection) => rejected(rejection),
        OrdersServiceError::Pricing(source) => pricing_failed(&source),
        OrdersServiceError::OrderNumberExhausted => {
            error!("could not allocate a unique order number");

            StatusError::service_unavailable().brief("Please retry the order")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
