//! Create Order Handler

use std::sync::Arc;

use fulfilment::{orders::PaymentMethod, shipping::ShippingMethod};
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use fulfilment_app::domain::orders::data::NewOrder;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    schemas::AddressBody,
    state::State,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    pub shipping_address: AddressBody,

    /// Defaults to the shipping address
    pub billing_address: Option<AddressBody>,

    /// `credit_card`, `debit_card`, `paypal`, `bank_transfer` or `cash_on_delivery`
    pub payment_method: String,

    /// `standard`, `express` or `overnight`; anything else ships standard
    pub shipping_method: Option<String>,

    pub notes: Option<String>,
}

impl TryFrom<CreateOrderRequest> for NewOrder {
    type Error = StatusError;

    fn try_from(request: CreateOrderRequest) -> Result<Self, Self::Error> {
        let payment_method = request
            .payment_method
            .parse::<PaymentMethod>()
            .or_400("Unknown payment method")?;

        let shipping_method = request
            .shipping_method
            .as_deref()
            .map_or_else(ShippingMethod::default, ShippingMethod::from_str_or_default);

        Ok(NewOrder {
            shipping_address: request.shipping_address.into(),
            billing_address: request.billing_address.map(Into::into),
            payment_method,
            shipping_method,
            notes: request.notes,
        })
    }
}

/// Create Order Handler
///
/// Checks out the caller's cart. Stock is reserved, the coupon is consumed and
/// the cart is emptied in the same transaction as the order is written.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Empty cart or invalid address"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon no longer valid"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(user_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let new_order = NewOrder::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));

    let order = state
        .app
        .orders
        .create_order(actor.user, new_order)
        .await
        .map_err(into_status_error)?;

    span.record("order_uuid", tracing::field::display(order.uuid));

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
