//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::orders::records::{OrderItemRecord, OrderRecord};

use crate::{
    extensions::*,
    orders::errors::into_status_error,
    schemas::{AddressBody, VariantBody},
    state::State,
};

/// Order Response
///
/// Amounts are minor units of `currency`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub order_number: String,
    pub user_uuid: Uuid,
    pub currency: String,
    pub subtotal: u64,
    pub discount: u64,
    pub tax: u64,
    pub shipping: u64,
    pub total: u64,
    pub coupon_code: Option<String>,
    pub shipping_address: AddressBody,
    pub billing_address: AddressBody,
    pub payment_method: String,
    pub shipping_method: String,
    pub payment_status: String,
    pub status: String,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into(),
            order_number: order.order_number,
            user_uuid: order.user.into(),
            currency: order.currency,
            subtotal: order.subtotal,
            discount: order.discount,
            tax: order.tax,
            shipping: order.shipping,
            total: order.total,
            coupon_code: order.coupon_code,
            shipping_address: order.shipping_address.into(),
            billing_address: order.billing_address.into(),
            payment_method: order.payment_method.to_string(),
            shipping_method: order.shipping_method.to_string(),
            payment_status: order.payment_status.to_string(),
            status: order.status.to_string(),
            notes: order.notes,
            tracking_number: order.tracking_number,
            estimated_delivery: order.estimated_delivery.map(|at| at.to_string()),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Item Response
///
/// Product details as they were at checkout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub name: String,
    pub sku: String,
    pub image: Option<String>,
    pub unit_price: u64,
    pub quantity: u32,
    pub variants: Vec<VariantBody>,
    pub line_total: u64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            uuid: item.uuid.into(),
            product_uuid: item.product.into(),
            name: item.name,
            sku: item.sku,
            image: item.image,
            unit_price: item.unit_price,
            quantity: item.quantity,
            variants: item.variants.into_iter().map(VariantBody::from).collect(),
            line_total: item.line_total,
        }
    }
}

/// Get Order Handler
///
/// Owners see their own orders; staff see any order.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the order owner"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let order = state
        .app
        .orders
        .get_order(actor, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
