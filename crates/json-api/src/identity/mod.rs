//! Identity
//!
//! Requests arrive already authenticated by an upstream gateway, which forwards
//! the caller as `x-user-uuid` and `x-user-role` headers.

pub(crate) mod middleware;

pub(crate) const USER_UUID_HEADER: &str = "x-user-uuid";
pub(crate) const USER_ROLE_HEADER: &str = "x-user-role";
