//! App Context

use std::sync::Arc;

use fulfilment::pricing::PricingConfig;
use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        coupons::{CouponsService, PgCouponsService},
        orders::{OrdersService, PgOrdersService},
        payments::{PaymentsService, PgPaymentsService},
        products::{PgProductsService, ProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(
        url: &str,
        pricing: PricingConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        Ok(Self::new(Db::new(pool), pricing))
    }

    /// Wire every service onto one database handle.
    #[must_use]
    pub fn new(db: Db, pricing: PricingConfig) -> Self {
        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone(), pricing)),
            payments: Arc::new(PgPaymentsService::new(db)),
        }
    }
}
