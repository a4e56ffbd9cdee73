//! Fulfilment
//!
//! Pure order fulfilment and payment settlement rules: money arithmetic, coupon
//! validation, cart pricing, shipping rates, address validation and the order and
//! payment state machines. Nothing in this crate performs I/O; persistence and
//! transport live in the `fulfilment-app` and `fulfilment-json` crates.

pub mod addresses;
pub mod coupons;
pub mod money;
pub mod orders;
pub mod parse;
pub mod payments;
pub mod pricing;
pub mod shipping;
pub mod variants;
