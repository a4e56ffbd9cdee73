//! Pricing Config

use clap::Args;
use fulfilment::{
    pricing::{DEFAULT_TAX_RATE_POINTS, PricingConfig},
    shipping::{
        DEFAULT_EXPRESS_RATE, DEFAULT_OVERNIGHT_RATE, DEFAULT_STANDARD_RATE, ShippingMethod,
        ShippingRates,
    },
};

/// Tax rate and flat shipping rates used at checkout.
#[derive(Debug, Args)]
pub struct PricingSettings {
    /// Tax rate in whole percentage points
    #[arg(long, env = "TAX_RATE_PERCENT", default_value_t = DEFAULT_TAX_RATE_POINTS)]
    pub tax_rate_percent: u16,

    /// Standard shipping rate in minor units
    #[arg(long, env = "SHIPPING_STANDARD_MINOR", default_value_t = DEFAULT_STANDARD_RATE)]
    pub shipping_standard_minor: u64,

    /// Express shipping rate in minor units
    #[arg(long, env = "SHIPPING_EXPRESS_MINOR", default_value_t = DEFAULT_EXPRESS_RATE)]
    pub shipping_express_minor: u64,

    /// Overnight shipping rate in minor units
    #[arg(long, env = "SHIPPING_OVERNIGHT_MINOR", default_value_t = DEFAULT_OVERNIGHT_RATE)]
    pub shipping_overnight_minor: u64,
}

impl PricingSettings {
    /// Build the pricing engine configuration.
    #[must_use]
    pub fn to_pricing_config(&self) -> PricingConfig {
        let rates = ShippingRates::new(self.shipping_standard_minor)
            .with_rate(ShippingMethod::Express, self.shipping_express_minor)
            .with_rate(ShippingMethod::Overnight, self.shipping_overnight_minor);

        PricingConfig::new(self.tax_rate_percent, rates)
    }
}
