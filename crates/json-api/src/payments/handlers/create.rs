//! Create Payment Handler

use std::sync::Arc;

use fulfilment::orders::PaymentMethod;
use salvo::{
    http::header::LOCATION,
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::payments::data::NewPayment;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, get::PaymentResponse},
    schemas::AddressBody,
    state::State,
};

/// Create Payment Request
///
/// A capture the payment gateway has already completed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreatePaymentRequest {
    pub uuid: Uuid,

    /// `credit_card`, `debit_card`, `paypal`, `bank_transfer` or `cash_on_delivery`
    pub method: String,

    /// Minor units; must equal the order total
    pub amount: u64,

    pub currency: String,
    pub transaction_id: Option<String>,
    pub billing_address: Option<AddressBody>,
}

impl TryFrom<CreatePaymentRequest> for NewPayment {
    type Error = StatusError;

    fn try_from(request: CreatePaymentRequest) -> Result<Self, Self::Error> {
        Ok(NewPayment {
            uuid: request.uuid.into(),
            method: request
                .method
                .parse::<PaymentMethod>()
                .or_400("Unknown payment method")?,
            amount: request.amount,
            currency: request.currency,
            transaction_id: request.transaction_id,
            billing_address: request.billing_address.map(Into::into),
        })
    }
}

/// Create Payment Handler
///
/// Settles one of the caller's orders.
#[endpoint(
    tags("payments"),
    summary = "Create Payment",
    responses(
        (status_code = StatusCode::CREATED, description = "Payment recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the order owner"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order already paid or cancelled"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Amount does not match the order total"),
    ),
)]
#[tracing::instrument(
    name = "payments.create",
    skip(order, json, depot, res),
    fields(order_uuid = tracing::field::Empty, payment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<CreatePaymentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let order = order.into_inner();
    let payment = NewPayment::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("payment_uuid", tracing::field::display(payment.uuid));

    let payment = state
        .app
        .payments
        .process_payment(actor.user, order.into(), payment)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/payments/{}", payment.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(payment.into()))
}
