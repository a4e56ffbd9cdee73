//! Inventory reservation.

use smallvec::SmallVec;
use sqlx::{Postgres, Transaction};
use tracing::warn;

use crate::domain::{carts::CartLine, orders::errors::OrdersServiceError, products::PgProductsRepository};

/// Take stock for every line, or fail without keeping any decrement.
///
/// Products are decremented in UUID order so concurrent checkouts over the same
/// products lock rows in the same sequence. The caller's transaction must be
/// rolled back on error; earlier decrements are only undone that way.
pub(crate) async fn reserve_stock(
    tx: &mut Transaction<'_, Postgres>,
    products: &PgProductsRepository,
    lines: &[CartLine],
) -> Result<(), OrdersServiceError> {
    let mut ordered: SmallVec<[&CartLine; 8]> = lines.iter().collect();

    ordered.sort_by_key(|line| line.product.uuid);

    for line in ordered {
        let quantity = line.item.quantity;

        if products.decrement_stock(tx, line.product.uuid, quantity).await? {
            continue;
        }

        let current = products.get_product(tx, line.product.uuid).await?;

        warn!(
            product_uuid = %current.uuid,
            requested = quantity,
            available = current.stock_quantity,
            "insufficient stock at checkout"
        );

        return Err(OrdersServiceError::InsufficientStock {
            product_name: current.name,
            available: current.stock_quantity,
        });
    }

    Ok(())
}
