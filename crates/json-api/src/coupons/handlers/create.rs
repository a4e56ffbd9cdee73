//! Create Coupon Handler

use std::sync::Arc;

use fulfilment::coupons::{CouponCode, CouponDiscount};
use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::coupons::data::NewCoupon;

use crate::{
    coupons::{errors::into_status_error, get::CouponResponse},
    extensions::*,
    state::State,
};

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCouponRequest {
    pub uuid: Uuid,
    pub code: String,

    /// `percentage` or `fixed`
    pub discount_type: String,

    /// Percentage points, or minor units for fixed discounts
    pub discount_value: u64,

    #[serde(default)]
    pub min_purchase: u64,
    pub max_discount: Option<u64>,

    /// RFC 3339 timestamp, defaults to now
    pub valid_from: Option<String>,

    /// RFC 3339 timestamp
    pub valid_until: String,

    pub usage_limit: Option<u64>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub applicable_products: Vec<Uuid>,
    #[serde(default)]
    pub applicable_categories: Vec<Uuid>,
}

fn active_by_default() -> bool {
    true
}

impl TryFrom<CreateCouponRequest> for NewCoupon {
    type Error = StatusError;

    fn try_from(request: CreateCouponRequest) -> Result<Self, Self::Error> {
        let discount = match request.discount_type.as_str() {
            "percentage" => CouponDiscount::Percentage {
                percentage: u16::try_from(request.discount_value)
                    .or_400("Percentage must be between 1 and 100")?,
            },
            "fixed" => CouponDiscount::Fixed {
                amount: request.discount_value,
            },
            _ => {
                return Err(StatusError::bad_request()
                    .brief("discount_type must be \"percentage\" or \"fixed\""));
            }
        };

        let valid_from = match request.valid_from {
            Some(raw) => raw
                .parse::<Timestamp>()
                .or_400("could not parse \"valid_from\"")?,
            None => Timestamp::now(),
        };

        Ok(NewCoupon {
            uuid: request.uuid.into(),
            code: CouponCode::parse(&request.code).or_400("Invalid coupon code")?,
            discount,
            min_purchase: request.min_purchase,
            max_discount: request.max_discount,
            valid_from,
            valid_until: request
                .valid_until
                .parse::<Timestamp>()
                .or_400("could not parse \"valid_until\"")?,
            usage_limit: request.usage_limit,
            is_active: request.is_active,
            applicable_products: request.applicable_products,
            applicable_categories: request.applicable_categories,
        })
    }
}

/// Create Coupon Handler
///
/// Staff only.
#[endpoint(
    tags("coupons"),
    summary = "Create Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::CONFLICT, description = "Coupon code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Staff role required"),
    ),
)]
#[tracing::instrument(
    name = "coupons.create",
    skip(json, depot, res),
    fields(coupon_code = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.staff_or_403()?;

    let coupon = NewCoupon::try_from(json.into_inner())?;

    tracing::Span::current().record("coupon_code", coupon.code.as_str());

    let coupon = state
        .app
        .coupons
        .create_coupon(coupon)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/coupons/{}", coupon.code), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(coupon.into()))
}
