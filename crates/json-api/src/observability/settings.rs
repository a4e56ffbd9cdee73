//! Request logging settings fixed at startup.

use std::{sync::OnceLock, time::Duration};

use tracing::warn;

use crate::config::ServerConfig;

const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct RequestSettings {
    slow_request_threshold: Duration,
    propagate_parent_context: bool,
}

static SETTINGS: OnceLock<RequestSettings> = OnceLock::new();

pub(super) fn apply(config: &ServerConfig) {
    let settings = RequestSettings {
        slow_request_threshold: Duration::from_millis(config.logging.slow_request_threshold_ms),
        propagate_parent_context: config.observability.otel_enabled
            && config.observability.otel_parent_propagation_enabled,
    };

    if SETTINGS.set(settings).is_err() {
        warn!("request settings were already applied");
    }
}

pub(super) fn slow_request_threshold() -> Duration {
    SETTINGS
        .get()
        .map_or(DEFAULT_SLOW_REQUEST_THRESHOLD, |s| s.slow_request_threshold)
}

/// Only honoured when traces are exported; otherwise incoming `traceparent`
/// headers are ignored.
pub(super) fn propagate_parent_context() -> bool {
    SETTINGS.get().is_some_and(|s| s.propagate_parent_context)
}
