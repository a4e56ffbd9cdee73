//! Parsing helpers for string-backed enums.

use thiserror::Error;

/// A string did not name any known value of an enum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownValue {
    /// Name of the enum being parsed.
    pub kind: &'static str,

    /// The rejected input.
    pub value: String,
}

impl UnknownValue {
    /// Create an error for `value` not being a known `kind`.
    #[must_use]
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
