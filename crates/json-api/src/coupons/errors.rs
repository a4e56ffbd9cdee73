//! Errors

use fulfilment::{coupons::CouponRejection, pricing::PricingError};
use salvo::http::StatusError;
use tracing::error;

use fulfilment_app::domain::coupons::CouponsServiceError;

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon code already exists")
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        CouponsServiceError::InvalidReference
        | CouponsServiceError::MissingRequiredData
        | CouponsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid coupon payload")
        }
        CouponsServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CouponsServiceError::CouponRejected(rejection) => rejected(rejection),
        CouponsServiceError::Pricing(source) => pricing_failed(&source),
        CouponsServiceError::Sql(source) => {
            error!("coupon storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// 422 carrying the machine-readable rejection reason.
pub(crate) fn rejected(rejection: CouponRejection) -> StatusError {
    StatusError::unprocessable_entity().brief(format!("{}: {rejection}", rejection.as_str()))
}

/// Carts that cannot be priced are client errors unless arithmetic overflowed.
pub(crate) fn pricing_failed(source: &PricingError) -> StatusError {
    match source {
        PricingError::Math(_) => {
            error!("pricing arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
        PricingError::NoItems | PricingError::NegativeUnitPrice | PricingError::Money(_) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
    }
}
