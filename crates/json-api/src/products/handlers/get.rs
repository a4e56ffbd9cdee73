//! Get Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::products::records::ProductRecord;

use crate::{extensions::*, products::errors::into_status_error, state::State};

/// Product Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    pub uuid: Uuid,
    pub name: String,
    pub sku: String,

    /// Price in minor units
    pub price: u64,

    /// ISO 4217 currency code
    pub currency: String,

    pub stock_quantity: u32,
    pub images: Vec<String>,
    pub categories: Vec<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        Self {
            uuid: product.uuid.into(),
            name: product.name,
            sku: product.sku,
            price: product.price,
            currency: product.currency,
            stock_quantity: product.stock_quantity,
            images: product.images,
            categories: product.categories,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Get Product Handler
///
/// Returns a product with its current price and stock.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing user identity"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.actor_or_401()?;

    let product = state
        .app
        .products
        .get_product(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use fulfilment_app::domain::products::ProductsServiceError;

    use crate::test_helpers::{Mocks, as_customer, service};

    use super::*;

    fn make_product(uuid: Uuid) -> ProductRecord {
        ProductRecord {
            uuid: uuid.into(),
            name: "Widget".to_string(),
            sku: "WID-1".to_string(),
            price: 12_50,
            currency: "USD".to_string(),
            stock_quantity: 4,
            images: vec!["https://img.example/widget.png".to_string()],
            categories: Vec::new(),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("products/{product}").get(handler))
    }

    #[tokio::test]
    async fn test_get_product_returns_200() -> TestResult {
        let uuid = Uuid::now_v7();
        let product = make_product(uuid);
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_get_product()
            .once()
            .withf(move |p| p.into_uuid() == uuid)
            .return_once(move |_| Ok(product));

        let mut res = as_customer(TestClient::get(format!("http://example.com/products/{uuid}")))
            .send(&make_service(mocks))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid);
        assert_eq!(body.price, 12_50);
        assert_eq!(body.stock_quantity, 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_product_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_get_product()
            .once()
            .return_once(|_| Err(ProductsServiceError::NotFound));

        let res = as_customer(TestClient::get(format!(
            "http://example.com/products/{}",
            Uuid::now_v7()
        )))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_get_without_identity_returns_401() {
        let mut mocks = Mocks::default();

        mocks.products.expect_get_product().never();

        let res = TestClient::get(format!("http://example.com/products/{}", Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }
}
