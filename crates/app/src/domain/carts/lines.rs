//! Cart snapshot lines joined with the current catalog.

use fulfilment::{
    coupons::CouponLine,
    money::{self, MoneyMathError},
    pricing::{PricingError, PricingLine},
};
use sqlx::{Postgres, Transaction};

use crate::domain::{
    carts::records::CartItemRecord,
    products::{PgProductsRepository, records::ProductRecord},
};

/// A cart item, the product it refers to, and its priced form.
#[derive(Debug, Clone)]
pub(crate) struct CartLine {
    pub item: CartItemRecord,
    pub product: ProductRecord,
    pub pricing: PricingLine<'static>,
}

impl CartLine {
    fn new(item: CartItemRecord, product: ProductRecord) -> Result<Self, PricingError> {
        let currency = money::currency(&item.currency)?;
        let unit_price = money::from_minor(item.unit_price, currency)?;
        let pricing = PricingLine::new(unit_price, item.quantity, &item.variants)?;

        Ok(Self {
            item,
            product,
            pricing,
        })
    }

    /// View of this line for coupon applicability checks.
    pub(crate) fn coupon_line(&self) -> Result<CouponLine<'_>, MoneyMathError> {
        Ok(CouponLine {
            product: self.item.product.into_uuid(),
            categories: &self.product.categories,
            line_total: self.pricing.line_total()?,
        })
    }
}

/// Join cart items with their products and price each line.
pub(crate) async fn load_cart_lines<E>(
    tx: &mut Transaction<'_, Postgres>,
    products: &PgProductsRepository,
    items: Vec<CartItemRecord>,
) -> Result<Vec<CartLine>, E>
where
    E: From<sqlx::Error> + From<PricingError>,
{
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let product = products.get_product(tx, item.product).await?;

        lines.push(CartLine::new(item, product)?);
    }

    Ok(lines)
}

/// Coupon views of every line.
pub(crate) fn coupon_lines(lines: &[CartLine]) -> Result<Vec<CouponLine<'_>>, MoneyMathError> {
    lines.iter().map(CartLine::coupon_line).collect()
}
