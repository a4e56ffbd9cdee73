//! Update Order Status Handler

use std::sync::Arc;

use fulfilment::orders::OrderStatus;
use jiff::Timestamp;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use fulfilment_app::domain::orders::data::StatusUpdate;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// `pending`, `processing`, `shipped`, `delivered`, `cancelled` or `returned`
    pub status: String,

    pub tracking_number: Option<String>,

    /// RFC 3339 timestamp
    pub estimated_delivery: Option<String>,
}

impl TryFrom<UpdateOrderStatusRequest> for StatusUpdate {
    type Error = StatusError;

    fn try_from(request: UpdateOrderStatusRequest) -> Result<Self, Self::Error> {
        let status = request
            .status
            .parse::<OrderStatus>()
            .or_400("Unknown order status")?;

        let estimated_delivery = request
            .estimated_delivery
            .as_deref()
            .map(str::parse::<Timestamp>)
            .transpose()
            .or_400("Invalid estimated delivery")?;

        Ok(StatusUpdate {
            status,
            tracking_number: request.tracking_number,
            estimated_delivery,
        })
    }
}

/// Update Order Status Handler
///
/// Staff move orders through fulfilment along the allowed transitions.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Staff role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
    ),
)]
#[tracing::instrument(
    name = "orders.status.update",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty, status = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let order = order.into_inner();
    let update = StatusUpdate::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("status", update.status.as_str());

    let updated = state
        .app
        .orders
        .update_status(actor, order.into(), update)
        .await
        .map_err(into_status_error)?;

    info!(status = %updated.status, "order status changed");

    Ok(Json(updated.into()))
}
