//! Payments
//!
//! Settlement of captures already taken by an external gateway, and refunds
//! against them.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::PaymentsServiceError;
pub use service::*;
