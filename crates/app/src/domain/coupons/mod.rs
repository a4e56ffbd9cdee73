//! Coupons

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;
mod validation;

pub use errors::CouponsServiceError;
pub(crate) use repository::PgCouponsRepository;
pub use service::*;
pub(crate) use validation::validate_coupon;
