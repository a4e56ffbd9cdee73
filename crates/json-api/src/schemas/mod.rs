//! Request and response bodies shared between resources.

mod addresses;
mod variants;

pub(crate) use addresses::AddressBody;
pub(crate) use variants::VariantBody;
