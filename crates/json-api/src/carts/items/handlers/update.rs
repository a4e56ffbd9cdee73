//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::carts::data::CartItemUpdate;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    schemas::VariantBody,
    state::State,
};

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    pub quantity: u32,

    /// Replaces the selection when present
    pub variants: Option<Vec<VariantBody>>,
}

impl From<UpdateCartItemRequest> for CartItemUpdate {
    fn from(request: UpdateCartItemRequest) -> Self {
        CartItemUpdate {
            quantity: request.quantity,
            variants: request
                .variants
                .map(|variants| variants.into_iter().map(Into::into).collect()),
        }
    }
}

/// Update Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Update Cart Item",
    responses(
        (status_code = StatusCode::OK, description = "Item updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.update",
    skip(item, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        cart_item_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let item = item.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("cart_item_uuid", tracing::field::display(item));

    let cart = state
        .app
        .carts
        .update_item(actor.user, item.into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
