//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::carts::records::{CartItemRecord, CartRecord};

use crate::{carts::errors::into_status_error, extensions::*, schemas::VariantBody, state::State};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// Attached coupon code, not yet redeemed
    pub coupon_code: Option<String>,

    /// Currency shared by every item, absent while the cart is empty
    pub currency: Option<String>,

    /// The items in the cart
    pub items: Vec<CartItemResponse>,

    pub created_at: String,
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        CartResponse {
            uuid: cart.uuid.into(),
            currency: cart.currency().map(str::to_owned),
            coupon_code: cart.coupon_code,
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub quantity: u32,

    /// Catalog price when the item was last added, in minor units
    pub unit_price: u64,

    pub currency: String,
    pub variants: Vec<VariantBody>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            uuid: item.uuid.into(),
            product_uuid: item.product.into(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            currency: item.currency,
            variants: item.variants.into_iter().map(VariantBody::from).collect(),
            created_at: item.created_at.to_string(),
            updated_at: item.updated_at.to_string(),
        }
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart, creating an empty one on first use.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    responses(
        (status_code = StatusCode::OK, description = "The caller's cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing user identity"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let cart = state
        .app
        .carts
        .get_or_create_cart(actor.user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
