//! Database connection management

use sqlx::{PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow};

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// The transaction rolls back when dropped unless committed.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a non-negative `BIGINT` amount column.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read an optional non-negative `BIGINT` amount column.
pub(crate) fn try_get_optional_amount(row: &PgRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
    let amount_i64: Option<i64> = row.try_get(col)?;

    amount_i64
        .map(|amount| {
            u64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

/// Convert an amount for binding as `BIGINT`.
pub(crate) fn amount_to_i64(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Whether an amount can be stored in a `BIGINT` column.
pub(crate) fn fits_bigint(amount: u64) -> bool {
    i64::try_from(amount).is_ok()
}

/// Read a non-negative `INTEGER` quantity column.
pub(crate) fn try_get_quantity(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let quantity_i32: i32 = row.try_get(col)?;

    u32::try_from(quantity_i32).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert a quantity for binding as `INTEGER`.
pub(crate) fn quantity_to_i32(quantity: u32, col: &str) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Decode a text column through [`std::str::FromStr`].
pub(crate) fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: String = row.try_get(col)?;

    value.parse().map_err(|e: T::Err| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
