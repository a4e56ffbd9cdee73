//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulfilment_app::domain::products::data::NewProduct;

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    pub uuid: Uuid,
    pub name: String,
    pub sku: String,
    pub price: u64,
    pub currency: String,
    pub stock_quantity: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        NewProduct {
            uuid: request.uuid.into(),
            name: request.name,
            sku: request.sku,
            price: request.price,
            currency: request.currency,
            stock_quantity: request.stock_quantity,
            images: request.images,
            categories: request.categories,
        }
    }
}

/// Create Product Handler
///
/// Seeds the catalog. Staff only.
#[endpoint(
    tags("products"),
    summary = "Create Product",
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Staff role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.create",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty, sku = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.staff_or_403()?;

    let request = json.into_inner();
    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(request.uuid));
    span.record("sku", request.sku.as_str());

    let product = state
        .app
        .products
        .create_product(request.into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use fulfilment_app::domain::products::{ProductsServiceError, records::ProductRecord};

    use crate::test_helpers::{Mocks, as_customer, as_staff, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("products").post(handler))
    }

    fn body(uuid: Uuid) -> serde_json::Value {
        json!({
            "uuid": uuid,
            "name": "Widget",
            "sku": "WID-1",
            "price": 1250,
            "currency": "USD",
            "stock_quantity": 4
        })
    }

    #[tokio::test]
    async fn test_create_product_success() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_create_product()
            .once()
            .withf(move |new| {
                new.uuid.into_uuid() == uuid
                    && new.sku == "WID-1"
                    && new.price == 12_50
                    && new.images.is_empty()
            })
            .return_once(|new| {
                Ok(ProductRecord {
                    uuid: new.uuid,
                    name: new.name,
                    sku: new.sku,
                    price: new.price,
                    currency: new.currency,
                    stock_quantity: new.stock_quantity,
                    images: new.images,
                    categories: new.categories,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = as_staff(TestClient::post("http://example.com/products"))
            .json(&body(uuid))
            .send(&make_service(mocks))
            .await;

        let product: ProductResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/products/{uuid}").as_str()));
        assert_eq!(product.sku, "WID-1");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_requires_staff() {
        let mut mocks = Mocks::default();

        mocks.products.expect_create_product().never();

        let res = as_customer(TestClient::post("http://example.com/products"))
            .json(&body(Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn test_create_duplicate_product_returns_409() {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_create_product()
            .once()
            .return_once(|_| Err(ProductsServiceError::AlreadyExists));

        let res = as_staff(TestClient::post("http://example.com/products"))
            .json(&body(Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_create_product_unknown_currency_returns_400() {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_create_product()
            .once()
            .return_once(|new| Err(ProductsServiceError::UnknownCurrency(new.currency)));

        let res = as_staff(TestClient::post("http://example.com/products"))
            .json(&body(Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
