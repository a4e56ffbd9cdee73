//! Validate Coupon Handler

use std::sync::Arc;

use fulfilment::coupons::CouponCode;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use fulfilment_app::domain::coupons::records::ValidatedCoupon;

use crate::{coupons::errors::into_status_error, extensions::*, state::State};

/// Coupon Code Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponCodeRequest {
    pub code: String,
}

/// Validated Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidatedCouponResponse {
    pub code: String,
    pub discount_type: String,
    pub discount_value: u64,

    /// Discount the coupon would give the current cart, in minor units
    pub discount: u64,

    pub currency: String,
}

impl From<ValidatedCoupon> for ValidatedCouponResponse {
    fn from(validated: ValidatedCoupon) -> Self {
        Self {
            discount_type: validated.coupon.discount.kind_as_str().to_string(),
            discount_value: validated.coupon.discount.value(),
            code: validated.coupon.code,
            discount: validated.discount,
            currency: validated.currency,
        }
    }
}

/// Validate Coupon Handler
///
/// Checks a coupon against the caller's cart without applying it.
#[endpoint(
    tags("coupons"),
    summary = "Validate Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon is valid for the cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon rejected"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CouponCodeRequest>,
    depot: &mut Depot,
) -> Result<Json<ValidatedCouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let code = CouponCode::parse(&json.into_inner().code).or_400("Invalid coupon code")?;

    let validated = state
        .app
        .coupons
        .validate_coupon(actor.user, code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(validated.into()))
}
