//! Product Handlers

pub(crate) mod create;
pub(crate) mod get;
