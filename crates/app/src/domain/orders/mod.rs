//! Orders
//!
//! The order ledger. Checkout turns a cart snapshot into an immutable order in
//! a single transaction.

pub mod data;
pub mod errors;
mod number;
pub mod records;
mod repositories;
mod reservation;
pub mod service;

pub use errors::OrdersServiceError;
pub(crate) use repositories::{PgOrderItemsRepository, PgOrdersRepository};
pub use service::*;
