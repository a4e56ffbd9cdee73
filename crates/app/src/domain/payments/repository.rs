//! Payments Repository

use fulfilment::{addresses::Address, orders::PaymentMethod, payments::PaymentStatus};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    database::{amount_to_i64, try_get_amount, try_get_parsed},
    domain::{
        orders::records::OrderUuid,
        payments::{
            data::NewPayment,
            records::{PaymentRecord, PaymentUuid},
        },
    },
    identity::UserUuid,
};

const INSERT_PAYMENT_SQL: &str = include_str!("sql/insert_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("sql/get_payment.sql");
const LOCK_PAYMENT_SQL: &str = include_str!("sql/lock_payment.sql");
const LIST_ORDER_PAYMENTS_SQL: &str = include_str!("sql/list_order_payments.sql");
const RECORD_REFUND_SQL: &str = include_str!("sql/record_refund.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        user: UserUuid,
        status: PaymentStatus,
        payment: &NewPayment,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(INSERT_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .bind(amount_to_i64(payment.amount, "amount")?)
            .bind(&payment.currency)
            .bind(payment.method.as_str())
            .bind(status.as_str())
            .bind(payment.transaction_id.as_deref())
            .bind(payment.billing_address.as_ref().map(Json))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a payment and hold its row lock until the transaction ends.
    pub(crate) async fn lock_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LOCK_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_order_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_ORDER_PAYMENTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn record_refund(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        refund_amount: u64,
        status: PaymentStatus,
        reason: Option<&str>,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(RECORD_REFUND_SQL)
            .bind(payment.into_uuid())
            .bind(amount_to_i64(refund_amount, "refund_amount")?)
            .bind(status.as_str())
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            amount: try_get_amount(row, "amount")?,
            currency: row.try_get("currency")?,
            method: try_get_parsed::<PaymentMethod>(row, "method")?,
            status: try_get_parsed::<PaymentStatus>(row, "status")?,
            transaction_id: row.try_get("transaction_id")?,
            billing_address: row
                .try_get::<Option<Json<Address>>, _>("billing_address")?
                .map(|address| address.0),
            refund_amount: try_get_amount(row, "refund_amount")?,
            refund_reason: row.try_get("refund_reason")?,
            refunded_at: row
                .try_get::<Option<SqlxTimestamp>, _>("refunded_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
