//! Get Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::payments::records::PaymentRecord;

use crate::{
    extensions::*, payments::errors::into_status_error, schemas::AddressBody, state::State,
};

/// Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub uuid: Uuid,
    pub order_uuid: Uuid,
    pub user_uuid: Uuid,
    pub amount: u64,
    pub currency: String,
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub billing_address: Option<AddressBody>,
    pub refund_amount: u64,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            uuid: payment.uuid.into(),
            order_uuid: payment.order.into(),
            user_uuid: payment.user.into(),
            amount: payment.amount,
            currency: payment.currency,
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            transaction_id: payment.transaction_id,
            billing_address: payment.billing_address.map(AddressBody::from),
            refund_amount: payment.refund_amount,
            refund_reason: payment.refund_reason,
            refunded_at: payment.refunded_at.map(|at| at.to_string()),
            created_at: payment.created_at.to_string(),
            updated_at: payment.updated_at.to_string(),
        }
    }
}

/// Get Payment Handler
#[endpoint(
    tags("payments"),
    summary = "Get Payment",
    responses(
        (status_code = StatusCode::OK, description = "Payment found"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the payment owner"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let payment = state
        .app
        .payments
        .get_payment(actor, payment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(payment.into()))
}
