//! Errors

use salvo::http::StatusError;
use tracing::error;

use fulfilment_app::domain::products::ProductsServiceError;

pub(crate) fn into_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product UUID or SKU already exists")
        }
        ProductsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        ProductsServiceError::InvalidReference
        | ProductsServiceError::MissingRequiredData
        | ProductsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid product payload")
        }
        ProductsServiceError::UnknownCurrency(code) => {
            StatusError::bad_request().brief(format!("Unknown currency {code:?}"))
        }
        ProductsServiceError::Sql(source) => {
            error!("product storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
