//! Products Data

use uuid::Uuid;

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,
    pub price: u64,
    pub currency: String,
    pub stock_quantity: u32,
    pub images: Vec<String>,
    pub categories: Vec<Uuid>,
}
