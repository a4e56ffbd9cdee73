//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    pricing::PricingSettings,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod pricing;
pub(crate) mod server;

/// Fulfilment JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "fulfilment-json", about = "Fulfilment JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Trace export settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Tax and shipping settings.
    #[command(flatten)]
    pub pricing: PricingSettings,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use fulfilment::shipping::ShippingMethod;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_apply_when_only_database_url_is_given() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "fulfilment-json",
            "--database-url",
            "postgres://localhost/fulfilment",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.server.shutdown_grace().as_secs(), 30);
        assert_eq!(config.logging.slow_request_threshold_ms, 1_000);
        assert_eq!(config.pricing.tax_rate_percent, 10);
        assert_eq!(config.pricing.shipping_standard_minor, 5_99);
        assert!(!config.observability.otel_enabled, "otel should be opt-in");

        Ok(())
    }

    #[test]
    fn pricing_flags_override_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "fulfilment-json",
            "--database-url",
            "postgres://localhost/fulfilment",
            "--tax-rate-percent",
            "20",
            "--shipping-express-minor",
            "999",
        ])?;

        let pricing = config.pricing.to_pricing_config();

        assert_eq!(pricing.shipping.rate_minor(ShippingMethod::Express), 9_99);
        assert_eq!(pricing.shipping.rate_minor(ShippingMethod::Overnight), 29_99);
        assert_eq!(pricing.shipping.rate_minor(ShippingMethod::Standard), 5_99);

        Ok(())
    }
}
