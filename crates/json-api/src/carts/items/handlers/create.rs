//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::carts::data::NewCartItem;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    schemas::VariantBody,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub product_uuid: Uuid,
    pub quantity: u32,

    /// Leave empty to keep the selection of an item already in the cart
    #[serde(default)]
    pub variants: Vec<VariantBody>,
}

impl From<AddCartItemRequest> for NewCartItem {
    fn from(request: AddCartItemRequest) -> Self {
        NewCartItem {
            product: request.product_uuid.into(),
            quantity: request.quantity,
            variants: request.variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Add Cart Item Handler
///
/// Adding a product already in the cart increases its quantity.
#[endpoint(
    tags("carts"),
    summary = "Add Item to Cart",
    responses(
        (status_code = StatusCode::OK, description = "Item added"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.add",
    skip(json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("product_uuid", tracing::field::display(request.product_uuid));
    span.record("quantity", request.quantity);

    let cart = state
        .app
        .carts
        .add_item(actor.user, request.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
