//! Cart Items Repository

use fulfilment::variants::SelectedVariant;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    database::{amount_to_i64, quantity_to_i32, try_get_amount, try_get_quantity},
    domain::{
        carts::records::{CartItemRecord, CartItemUuid, CartUuid},
        products::records::{ProductRecord, ProductUuid},
    },
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const GET_CART_ITEM_SQL: &str = include_str!("../sql/get_cart_item.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const UPDATE_CART_ITEM_SQL: &str = include_str!("../sql/update_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const CLEAR_CART_ITEMS_SQL: &str = include_str!("../sql/clear_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Add a product line, or grow the existing line for the same product.
    ///
    /// Existing lines take the new unit price and keep their variant selection
    /// unless `variants` is non-empty.
    pub(crate) async fn upsert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        product: &ProductRecord,
        quantity: u32,
        variants: &[SelectedVariant],
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(cart.into_uuid())
            .bind(product.uuid.into_uuid())
            .bind(quantity_to_i32(quantity, "quantity")?)
            .bind(amount_to_i64(product.price, "unit_price")?)
            .bind(&product.currency)
            .bind(Json(variants))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
        variants: Option<&[SelectedVariant]>,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(UPDATE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .bind(quantity_to_i32(quantity, "quantity")?)
            .bind(variants.map(Json))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_quantity(row, "quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
            currency: row.try_get("currency")?,
            variants: row
                .try_get::<Json<Vec<SelectedVariant>>, _>("variants")?
                .0,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
