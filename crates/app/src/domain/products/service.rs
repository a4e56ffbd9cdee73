//! Products service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::{Db, fits_bigint},
    domain::products::{
        data::NewProduct,
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    #[tracing::instrument(
        name = "products.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid, sku = %product.sku),
        err
    )]
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, ProductsServiceError> {
        fulfilment::money::currency(&product.currency)
            .map_err(|_unknown| ProductsServiceError::UnknownCurrency(product.currency.clone()))?;

        if !fits_bigint(product.price) {
            return Err(ProductsServiceError::InvalidData);
        }

        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        Ok(created)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Seed a catalog product.
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::new_product};

    use super::*;

    #[tokio::test]
    async fn create_product_returns_stored_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let new = new_product(1_999, 7);

        let product = ctx.products.create_product(new.clone()).await?;

        assert_eq!(product.uuid, new.uuid);
        assert_eq!(product.name, new.name);
        assert_eq!(product.sku, new.sku);
        assert_eq!(product.price, 1_999);
        assert_eq!(product.currency, "USD");
        assert_eq!(product.stock_quantity, 7);
        assert_eq!(product.primary_image(), Some("https://img.example/1.png"));

        Ok(())
    }

    #[tokio::test]
    async fn get_product_returns_created_product() -> TestResult {
        let ctx = TestContext::new().await;
        let created = ctx.products.create_product(new_product(500, 1)).await?;

        let product = ctx.products.get_product(created.uuid).await?;

        assert_eq!(product, created);

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn duplicate_sku_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let first = new_product(100, 1);

        ctx.products.create_product(first.clone()).await?;

        let result = ctx
            .products
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                ..first
            })
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_currency_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx
            .products
            .create_product(NewProduct {
                currency: "ZZZ".to_string(),
                ..new_product(100, 1)
            })
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::UnknownCurrency(ref code)) if code == "ZZZ"),
            "expected UnknownCurrency, got {result:?}"
        );
    }

    #[tokio::test]
    async fn price_beyond_storage_range_is_invalid() {
        let ctx = TestContext::new().await;

        let result = ctx.products.create_product(new_product(u64::MAX, 1)).await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn decrement_stock_never_goes_negative() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(100, 3)).await?;
        let repository = PgProductsRepository::new();

        let mut tx = ctx.db.begin_test_transaction().await;

        assert!(repository.decrement_stock(&mut tx, product.uuid, 2).await?);
        assert!(!repository.decrement_stock(&mut tx, product.uuid, 2).await?);

        let remaining = repository.get_product(&mut tx, product.uuid).await?;

        assert_eq!(remaining.stock_quantity, 1);

        Ok(())
    }
}
