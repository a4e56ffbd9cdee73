//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::{debug, error};

/// Map errors onto HTTP errors.
pub(crate) trait ResultExt<T> {
    /// Log the error and hide it behind a 500.
    fn or_500(self, context: &str) -> Result<T, StatusError>;

    /// Reject the request as malformed with a brief message.
    fn or_400(self, brief: &str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            error!("{context}: {error}");

            StatusError::internal_server_error()
        })
    }

    fn or_400(self, brief: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            debug!("{brief}: {error}");

            StatusError::bad_request().brief(brief)
        })
    }
}
