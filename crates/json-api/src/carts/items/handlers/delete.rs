//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
///
/// Removing the last item also detaches the coupon.
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Item",
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.remove",
    skip(item, depot),
    fields(
        user_uuid = tracing::field::Empty,
        cart_item_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
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
        .remove_item(actor.user, item.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(cart_item_uuid = %item, "removed cart item");

    Ok(Json(cart.into()))
}
