//! Apply Coupon Handler

use std::sync::Arc;

use fulfilment::coupons::CouponCode;
use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    coupons::validate::CouponCodeRequest,
    extensions::*,
    state::State,
};

/// Apply Coupon Handler
///
/// Attaches a coupon after validating it against the cart. Usage is only
/// counted when an order is placed.
#[endpoint(
    tags("carts"),
    summary = "Apply Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon attached"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty or code is invalid"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon rejected"),
    ),
)]
#[tracing::instrument(
    name = "carts.coupon.apply",
    skip(json, depot),
    fields(user_uuid = tracing::field::Empty, coupon_code = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CouponCodeRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let code = CouponCode::parse(&json.into_inner().code).or_400("Invalid coupon code")?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("coupon_code", code.as_str());

    let cart = state
        .app
        .carts
        .apply_coupon(actor.user, code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
