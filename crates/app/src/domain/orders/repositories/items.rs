//! Order Items Repository

use fulfilment::variants::SelectedVariant;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};
use uuid::Uuid;

use crate::{
    database::{amount_to_i64, quantity_to_i32, try_get_amount, try_get_quantity},
    domain::{
        orders::records::{OrderItemRecord, OrderItemUuid, OrderUuid},
        products::records::ProductUuid,
    },
};

const INSERT_ORDER_ITEM_SQL: &str = include_str!("../sql/insert_order_item.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("../sql/get_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        position: u32,
        item: &OrderItemRecord,
    ) -> Result<OrderItemRecord, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(INSERT_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(quantity_to_i32(position, "position")?)
            .bind(item.product.into_uuid())
            .bind(&item.name)
            .bind(&item.sku)
            .bind(item.image.as_deref())
            .bind(amount_to_i64(item.unit_price, "unit_price")?)
            .bind(quantity_to_i32(item.quantity, "quantity")?)
            .bind(Json(&item.variants))
            .bind(amount_to_i64(item.line_total, "line_total")?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Items of several orders at once, in checkout order, keyed by order.
    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<FxHashMap<OrderUuid, Vec<OrderItemRecord>>, sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut items: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for row in rows {
            items.entry(row.order).or_default().push(row.item);
        }

        Ok(items)
    }
}

struct OrderItemRow {
    order: OrderUuid,
    item: OrderItemRecord,
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item: OrderItemRecord::from_row(row)?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            image: row.try_get("image")?,
            unit_price: try_get_amount(row, "unit_price")?,
            quantity: try_get_quantity(row, "quantity")?,
            variants: row
                .try_get::<Json<Vec<SelectedVariant>>, _>("variants")?
                .0,
            line_total: try_get_amount(row, "line_total")?,
        })
    }
}
