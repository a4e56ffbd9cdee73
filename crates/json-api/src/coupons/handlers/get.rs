//! Get Coupon Handler

use std::sync::Arc;

use fulfilment::coupons::CouponCode;
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::coupons::records::CouponRecord;

use crate::{coupons::errors::into_status_error, extensions::*, state::State};

/// Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    pub uuid: Uuid,
    pub code: String,

    /// `percentage` or `fixed`
    pub discount_type: String,

    /// Percentage points, or minor units for fixed discounts
    pub discount_value: u64,

    pub min_purchase: u64,
    pub max_discount: Option<u64>,
    pub valid_from: String,
    pub valid_until: String,
    pub usage_limit: Option<u64>,
    pub usage_count: u64,
    pub is_active: bool,
    pub applicable_products: Vec<Uuid>,
    pub applicable_categories: Vec<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        Self {
            uuid: coupon.uuid.into(),
            code: coupon.code,
            discount_type: coupon.discount.kind_as_str().to_string(),
            discount_value: coupon.discount.value(),
            min_purchase: coupon.min_purchase,
            max_discount: coupon.max_discount,
            valid_from: coupon.valid_from.to_string(),
            valid_until: coupon.valid_until.to_string(),
            usage_limit: coupon.usage_limit,
            usage_count: coupon.usage_count,
            is_active: coupon.is_active,
            applicable_products: coupon.applicable_products,
            applicable_categories: coupon.applicable_categories,
            created_at: coupon.created_at.to_string(),
            updated_at: coupon.updated_at.to_string(),
        }
    }
}

/// Get Coupon Handler
///
/// Staff only.
#[endpoint(
    tags("coupons"),
    summary = "Get Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon found"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Staff role required"),
    ),
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.staff_or_403()?;

    let code = CouponCode::parse(&code.into_inner()).or_400("Invalid coupon code")?;

    let coupon = state
        .app
        .coupons
        .get_coupon(code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(coupon.into()))
}
