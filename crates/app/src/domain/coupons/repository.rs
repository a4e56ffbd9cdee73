//! Coupons Repository

use fulfilment::{
    coupons::{CouponCode, CouponDiscount},
    parse::UnknownValue,
};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{amount_to_i64, try_get_amount, try_get_optional_amount},
    domain::coupons::{
        data::NewCoupon,
        records::{CouponRecord, CouponUuid},
    },
};

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const FIND_COUPON_SQL: &str = include_str!("sql/find_coupon.sql");
const CONSUME_COUPON_SQL: &str = include_str!("sql/consume_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let max_discount = coupon
            .max_discount
            .map(|max| amount_to_i64(max, "max_discount"))
            .transpose()?;

        let usage_limit = coupon
            .usage_limit
            .map(|limit| amount_to_i64(limit, "usage_limit"))
            .transpose()?;

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code.as_str())
            .bind(coupon.discount.kind_as_str())
            .bind(amount_to_i64(coupon.discount.value(), "discount_value")?)
            .bind(amount_to_i64(coupon.min_purchase, "min_purchase")?)
            .bind(max_discount)
            .bind(SqlxTimestamp::from(coupon.valid_from))
            .bind(SqlxTimestamp::from(coupon.valid_until))
            .bind(usage_limit)
            .bind(coupon.is_active)
            .bind(coupon.applicable_products)
            .bind(coupon.applicable_categories)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &CouponCode,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPON_SQL)
            .bind(code.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Count one redemption.
    ///
    /// Returns `false` when the coupon is inactive or its usage limit has been
    /// reached, in which case nothing changes.
    pub(crate) async fn consume_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &CouponCode,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(CONSUME_COUPON_SQL)
            .bind(code.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

fn try_get_discount(row: &PgRow) -> Result<CouponDiscount, sqlx::Error> {
    let kind: String = row.try_get("discount_type")?;
    let value = try_get_amount(row, "discount_value")?;

    match kind.as_str() {
        "percentage" => {
            let percentage = u16::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
                index: "discount_value".to_string(),
                source: Box::new(e),
            })?;

            Ok(CouponDiscount::Percentage { percentage })
        }
        "fixed" => Ok(CouponDiscount::Fixed { amount: value }),
        _ => Err(sqlx::Error::ColumnDecode {
            index: "discount_type".to_string(),
            source: Box::new(UnknownValue::new("discount type", &kind)),
        }),
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount: try_get_discount(row)?,
            min_purchase: try_get_amount(row, "min_purchase")?,
            max_discount: try_get_optional_amount(row, "max_discount")?,
            valid_from: row.try_get::<SqlxTimestamp, _>("valid_from")?.to_jiff(),
            valid_until: row.try_get::<SqlxTimestamp, _>("valid_until")?.to_jiff(),
            usage_limit: try_get_optional_amount(row, "usage_limit")?,
            usage_count: try_get_amount(row, "usage_count")?,
            is_active: row.try_get("is_active")?,
            applicable_products: row.try_get("applicable_products")?,
            applicable_categories: row.try_get("applicable_categories")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
