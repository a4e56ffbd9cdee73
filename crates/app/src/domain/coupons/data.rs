//! Coupons Data

use fulfilment::coupons::{CouponCode, CouponDiscount};
use jiff::Timestamp;
use uuid::Uuid;

use crate::domain::coupons::records::CouponUuid;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: CouponCode,
    pub discount: CouponDiscount,
    pub min_purchase: u64,
    pub max_discount: Option<u64>,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub usage_limit: Option<u64>,
    pub is_active: bool,
    pub applicable_products: Vec<Uuid>,
    pub applicable_categories: Vec<Uuid>,
}
