//! Orders Repository

use fulfilment::{
    addresses::Address,
    orders::{OrderStatus, PaymentMethod},
    payments::OrderPaymentStatus,
    shipping::ShippingMethod,
};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    database::{amount_to_i64, try_get_amount, try_get_parsed},
    domain::orders::{
        data::{PricedOrder, StatusUpdate},
        records::{OrderRecord, OrderUuid},
    },
    identity::UserUuid,
};

const INSERT_ORDER_SQL: &str = include_str!("../sql/insert_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const SET_ORDER_PAYMENT_STATUS_SQL: &str = include_str!("../sql/set_order_payment_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert an order under `order_number`.
    ///
    /// Returns `None` when the number is already taken.
    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &PricedOrder,
        order_number: &str,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order_number)
            .bind(order.user.into_uuid())
            .bind(&order.currency)
            .bind(amount_to_i64(order.subtotal, "subtotal")?)
            .bind(amount_to_i64(order.discount, "discount")?)
            .bind(amount_to_i64(order.tax, "tax")?)
            .bind(amount_to_i64(order.shipping, "shipping")?)
            .bind(amount_to_i64(order.total, "total")?)
            .bind(order.coupon_code.as_deref())
            .bind(Json(&order.shipping_address))
            .bind(Json(&order.billing_address))
            .bind(order.payment_method.as_str())
            .bind(order.shipping_method.as_str())
            .bind(order.notes.as_deref())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an order and hold its row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// A user's orders, newest first.
    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        update: &StatusUpdate,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(update.status.as_str())
            .bind(update.tracking_number.as_deref())
            .bind(update.estimated_delivery.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    /// Record a settlement outcome on the order.
    pub(crate) async fn set_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment_status: OrderPaymentStatus,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(SET_ORDER_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(payment_status.as_str())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            currency: row.try_get("currency")?,
            subtotal: try_get_amount(row, "subtotal")?,
            discount: try_get_amount(row, "discount")?,
            tax: try_get_amount(row, "tax")?,
            shipping: try_get_amount(row, "shipping")?,
            total: try_get_amount(row, "total")?,
            coupon_code: row.try_get("coupon_code")?,
            shipping_address: row.try_get::<Json<Address>, _>("shipping_address")?.0,
            billing_address: row.try_get::<Json<Address>, _>("billing_address")?.0,
            payment_method: try_get_parsed::<PaymentMethod>(row, "payment_method")?,
            shipping_method: try_get_parsed::<ShippingMethod>(row, "shipping_method")?,
            payment_status: try_get_parsed::<OrderPaymentStatus>(row, "payment_status")?,
            status: try_get_parsed::<OrderStatus>(row, "status")?,
            notes: row.try_get("notes")?,
            tracking_number: row.try_get("tracking_number")?,
            estimated_delivery: row
                .try_get::<Option<SqlxTimestamp>, _>("estimated_delivery")?
                .map(SqlxTimestamp::to_jiff),
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
