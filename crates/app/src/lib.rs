//! Persistence services for the fulfilment engine.

pub mod context;
pub mod database;
pub mod domain;
pub mod identity;

#[cfg(test)]
mod test;

mod uuids;
