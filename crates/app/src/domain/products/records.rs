//! Product Records

use jiff::Timestamp;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,
    pub price: u64,
    pub currency: String,
    pub stock_quantity: u32,
    pub images: Vec<String>,
    pub categories: Vec<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// First image, used as the order line thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
