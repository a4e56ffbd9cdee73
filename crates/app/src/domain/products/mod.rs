//! Products
//!
//! Read-mostly catalog capability. Checkout is the only writer of stock.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub(crate) use repository::PgProductsRepository;
pub use service::*;
