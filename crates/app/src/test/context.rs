//! Test context for service-level integration tests.

use fulfilment::pricing::PricingConfig;

use crate::{
    database::Db,
    domain::{
        carts::PgCartsService, coupons::PgCouponsService, orders::PgOrdersService,
        payments::PgPaymentsService, products::PgProductsService,
    },
};

use super::db::TestDb;

/// Every service wired to one freshly migrated database, with default pricing.
pub(crate) struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub coupons: PgCouponsService,
    pub carts: PgCartsService,
    pub orders: PgOrdersService,
    pub payments: PgPaymentsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            coupons: PgCouponsService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            orders: PgOrdersService::new(db.clone(), PricingConfig::default()),
            payments: PgPaymentsService::new(db),
            db: test_db,
        }
    }
}
