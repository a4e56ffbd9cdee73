//! Coupon Records

use fulfilment::coupons::{CouponDiscount, CouponRules};
use jiff::Timestamp;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: CouponDiscount,
    pub min_purchase: u64,
    pub max_discount: Option<u64>,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub usage_limit: Option<u64>,
    pub usage_count: u64,
    pub is_active: bool,
    pub applicable_products: Vec<Uuid>,
    pub applicable_categories: Vec<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    /// Rules used for validation and discount calculation.
    #[must_use]
    pub fn rules(&self) -> CouponRules {
        CouponRules {
            discount: self.discount,
            min_purchase: self.min_purchase,
            max_discount: self.max_discount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            is_active: self.is_active,
            applicable_products: self.applicable_products.iter().copied().collect(),
            applicable_categories: self.applicable_categories.iter().copied().collect(),
        }
    }
}

/// Outcome of a dry-run coupon check against a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCoupon {
    pub coupon: CouponRecord,
    pub discount: u64,
    pub currency: String,
}
