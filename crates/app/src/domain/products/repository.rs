//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{amount_to_i64, quantity_to_i32, try_get_amount, try_get_quantity},
    domain::products::{
        data::NewProduct,
        records::{ProductRecord, ProductUuid},
    },
};

const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name)
            .bind(product.sku)
            .bind(amount_to_i64(product.price, "price")?)
            .bind(product.currency)
            .bind(quantity_to_i32(product.stock_quantity, "stock_quantity")?)
            .bind(product.images)
            .bind(product.categories)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Atomically take `quantity` units of stock.
    ///
    /// Returns `false`, leaving stock untouched, when fewer than `quantity` units
    /// remain.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(quantity_to_i32(quantity, "stock_quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: try_get_amount(row, "price")?,
            currency: row.try_get("currency")?,
            stock_quantity: try_get_quantity(row, "stock_quantity")?,
            images: row.try_get("images")?,
            categories: row.try_get("categories")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
