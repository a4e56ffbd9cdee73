//! Addresses

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address validation failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AddressError {
    /// A required field was missing or blank.
    #[error("address field `{0}` is required")]
    MissingField(&'static str),
}

/// Postal address snapshot stored on an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient name.
    pub full_name: String,

    /// First address line.
    pub line1: String,

    /// Optional second address line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,

    /// City or town.
    pub city: String,

    /// State, county or province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Postal or ZIP code.
    pub postal_code: String,

    /// Country name or ISO code.
    pub country: String,

    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Address {
    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first blank required field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("full_name", &self.full_name),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(AddressError::MissingField(*field)),
            None => Ok(()),
        }
    }
}
