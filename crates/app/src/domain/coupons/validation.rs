//! Coupon validation against a cart snapshot.

use fulfilment::coupons::{CouponLine, CouponRejection};
use jiff::Timestamp;

use crate::domain::coupons::records::CouponRecord;

/// Validate a looked-up coupon against cart lines.
///
/// A missing coupon is rejected the same way as an inactive one.
pub(crate) fn validate_coupon(
    coupon: Option<CouponRecord>,
    lines: &[CouponLine<'_>],
    now: Timestamp,
) -> Result<CouponRecord, CouponRejection> {
    let coupon = coupon.ok_or(CouponRejection::CouponNotFound)?;

    coupon.rules().validate(lines, now)?;

    Ok(coupon)
}
