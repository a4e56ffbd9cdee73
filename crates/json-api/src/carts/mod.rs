//! Carts
//!
//! Every caller has exactly one cart, addressed as `/cart`.

pub(crate) mod coupon;
mod errors;
mod handlers;
pub(crate) mod items;

pub(crate) use handlers::*;
