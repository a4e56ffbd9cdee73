//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    domain::carts::records::{CartRecord, CartUuid},
    identity::UserUuid,
};

const GET_OR_CREATE_CART_SQL: &str = include_str!("../sql/get_or_create_cart.sql");
const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const SET_CART_COUPON_SQL: &str = include_str!("../sql/set_cart_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Fetch the user's cart, creating it on first access.
    ///
    /// The cart row stays locked until the transaction ends, so concurrent
    /// mutations of one user's cart are serialised.
    pub(crate) async fn get_or_create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_OR_CREATE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(FIND_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        coupon_code: Option<&str>,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(SET_CART_COUPON_SQL)
            .bind(cart.into_uuid())
            .bind(coupon_code)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            coupon_code: row.try_get("coupon_code")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
