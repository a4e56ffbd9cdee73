//! Cart Coupon

mod handlers;

pub(crate) use handlers::*;
