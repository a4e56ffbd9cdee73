//! Carts
//!
//! One mutable cart per user. Cart mutations check stock optimistically; stock
//! is only reserved at checkout.

pub mod data;
pub mod errors;
mod lines;
pub mod records;
mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub(crate) use lines::{CartLine, coupon_lines, load_cart_lines};
pub(crate) use repositories::{PgCartItemsRepository, PgCartsRepository};
pub use service::*;
