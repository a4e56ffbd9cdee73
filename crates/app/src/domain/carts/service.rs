//! Carts service.

use async_trait::async_trait;
use fulfilment::{
    coupons::CouponCode,
    money,
    pricing::{PricingError, PricingLine},
    variants::SelectedVariant,
};
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            coupon_lines,
            data::{CartItemUpdate, NewCartItem},
            errors::CartsServiceError,
            load_cart_lines,
            records::{CartItemUuid, CartRecord},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        coupons::{PgCouponsRepository, validate_coupon},
        products::{
            PgProductsRepository,
            records::{ProductRecord, ProductUuid},
        },
    },
    identity::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    products: PgProductsRepository,
    coupons: PgCouponsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            products: PgProductsRepository::new(),
            coupons: PgCouponsRepository::new(),
        }
    }

    async fn with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut cart: CartRecord,
    ) -> Result<CartRecord, sqlx::Error> {
        cart.items = self.items.get_cart_items(tx, cart.uuid).await?;

        Ok(cart)
    }

    async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, CartsServiceError> {
        self.products
            .get_product(tx, product)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CartsServiceError::ProductNotFound,
                error => error.into(),
            })
    }
}

fn ensure_in_stock(product: &ProductRecord, quantity: u32) -> Result<(), CartsServiceError> {
    if quantity > product.stock_quantity {
        warn!(
            product_uuid = %product.uuid,
            requested = quantity,
            available = product.stock_quantity,
            "insufficient stock"
        );

        return Err(CartsServiceError::InsufficientStock {
            product_name: product.name.clone(),
            available: product.stock_quantity,
        });
    }

    Ok(())
}

fn ensure_priceable(
    product: &ProductRecord,
    quantity: u32,
    variants: &[SelectedVariant],
) -> Result<(), CartsServiceError> {
    let currency = money::currency(&product.currency).map_err(PricingError::from)?;
    let unit_price = money::from_minor(product.price, currency).map_err(PricingError::from)?;

    PricingLine::new(unit_price, quantity, variants)?;

    Ok(())
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_or_create_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;
        let cart = self.with_items(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(
            user_uuid = %user,
            product_uuid = %item.product,
            quantity = item.quantity,
            cart_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;

        tracing::Span::current().record("cart_uuid", tracing::field::display(cart.uuid));

        let cart = self.with_items(&mut tx, cart).await?;
        let product = self.get_product(&mut tx, item.product).await?;

        if cart
            .items
            .iter()
            .any(|existing| existing.currency != product.currency)
        {
            return Err(CartsServiceError::CurrencyMismatch);
        }

        let existing = cart
            .items
            .iter()
            .find(|existing| existing.product == product.uuid);

        let quantity = existing
            .map_or(0, |existing| existing.quantity)
            .checked_add(item.quantity)
            .ok_or(CartsServiceError::InvalidQuantity)?;

        ensure_in_stock(&product, quantity)?;

        let variants = match existing {
            Some(existing) if item.variants.is_empty() => existing.variants.as_slice(),
            _ => item.variants.as_slice(),
        };

        ensure_priceable(&product, quantity, variants)?;

        self.items
            .upsert_cart_item(&mut tx, cart.uuid, &product, item.quantity, &item.variants)
            .await?;

        let cart = self.with_items(&mut tx, cart).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, "added cart item");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.update_item",
        skip(self, update),
        fields(user_uuid = %user, item_uuid = %item, quantity = update.quantity),
        err
    )]
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartRecord, CartsServiceError> {
        if update.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;
        let existing = self.items.get_cart_item(&mut tx, cart.uuid, item).await?;
        let product = self.get_product(&mut tx, existing.product).await?;

        ensure_in_stock(&product, update.quantity)?;

        let variants = update.variants.as_deref();

        ensure_priceable(
            &product,
            update.quantity,
            variants.unwrap_or(&existing.variants),
        )?;

        self.items
            .update_cart_item(&mut tx, cart.uuid, item, update.quantity, variants)
            .await?;

        let cart = self.with_items(&mut tx, cart).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, "updated cart item");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, item_uuid = %item),
        err
    )]
    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;

        let rows_affected = self.items.delete_cart_item(&mut tx, cart.uuid, item).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let mut cart = self.with_items(&mut tx, cart).await?;

        if cart.is_empty() && cart.coupon_code.is_some() {
            cart = self.carts.set_coupon(&mut tx, cart.uuid, None).await?;
        }

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, "removed cart item");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.clear_cart",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn clear_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;

        self.items.clear_cart_items(&mut tx, cart.uuid).await?;

        let cart = self.carts.set_coupon(&mut tx, cart.uuid, None).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, "cleared cart");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.apply_coupon",
        skip(self),
        fields(user_uuid = %user, coupon_code = %code),
        err
    )]
    async fn apply_coupon(
        &self,
        user: UserUuid,
        code: CouponCode,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;
        let cart = self.with_items(&mut tx, cart).await?;

        if cart.is_empty() {
            return Err(CartsServiceError::EmptyCart);
        }

        let lines = load_cart_lines::<CartsServiceError>(
            &mut tx,
            &self.products,
            cart.items.clone(),
        )
        .await?;

        let coupon_lines = coupon_lines(&lines).map_err(PricingError::from)?;
        let coupon = self.coupons.find_coupon(&mut tx, &code).await?;

        validate_coupon(coupon, &coupon_lines, Timestamp::now()).inspect_err(|rejection| {
            warn!(reason = rejection.as_str(), "coupon rejected");
        })?;

        let mut updated = self
            .carts
            .set_coupon(&mut tx, cart.uuid, Some(code.as_str()))
            .await?;

        updated.items = cart.items;

        tx.commit().await?;

        info!(cart_uuid = %updated.uuid, "applied coupon");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "carts.service.remove_coupon",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn remove_coupon(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;
        let cart = self.carts.set_coupon(&mut tx, cart.uuid, None).await?;
        let cart = self.with_items(&mut tx, cart).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, "removed coupon");

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart, creating an empty one on first access.
    async fn get_or_create_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add a product to the cart, summing quantities if it is already present.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Change an item's quantity and optionally replace its variant selection.
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove an item. Removing the last item also drops the coupon.
    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove every item and the coupon.
    async fn clear_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Validate a coupon against the cart and attach it. Usage is not counted.
    async fn apply_coupon(
        &self,
        user: UserUuid,
        code: CouponCode,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Detach the coupon.
    async fn remove_coupon(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use fulfilment::coupons::{CouponDiscount, CouponRejection};
    use testresult::TestResult;

    use crate::{
        domain::{
            coupons::{CouponsService, data::NewCoupon},
            products::{ProductsService, data::NewProduct},
        },
        test::{
            TestContext,
            helpers::{add_to_cart, create_coupon, create_product, new_coupon, new_product, variant},
        },
    };

    use super::*;

    #[tokio::test]
    async fn get_or_create_cart_returns_same_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let first = ctx.carts.get_or_create_cart(user).await?;
        let second = ctx.carts.get_or_create_cart(user).await?;

        assert_eq!(first.uuid, second.uuid);
        assert_eq!(first.user, user);
        assert!(second.is_empty());
        assert!(second.coupon_code.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn adding_same_product_sums_quantities() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 10).await?;

        add_to_cart(&ctx, user, product.uuid, 2).await?;
        let cart = add_to_cart(&ctx, user, product.uuid, 3).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|item| item.quantity), Some(5));
        assert_eq!(cart.items.first().map(|item| item.unit_price), Some(1_000));

        Ok(())
    }

    #[tokio::test]
    async fn re_adding_keeps_variants_unless_new_selection_given() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 10).await?;

        ctx.carts
            .add_item(
                user,
                NewCartItem {
                    product: product.uuid,
                    quantity: 1,
                    variants: vec![variant("size", "L", 200)],
                },
            )
            .await?;

        let cart = add_to_cart(&ctx, user, product.uuid, 1).await?;

        assert_eq!(
            cart.items.first().map(|item| item.variants.clone()),
            Some(vec![variant("size", "L", 200)])
        );

        let cart = ctx
            .carts
            .add_item(
                user,
                NewCartItem {
                    product: product.uuid,
                    quantity: 1,
                    variants: vec![variant("size", "S", 0)],
                },
            )
            .await?;

        assert_eq!(
            cart.items.first().map(|item| item.variants.clone()),
            Some(vec![variant("size", "S", 0)])
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_beyond_stock_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 3).await?;

        add_to_cart(&ctx, user, product.uuid, 2).await?;

        let result = add_to_cart(&ctx, user, product.uuid, 2).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::InsufficientStock { available: 3, .. })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        let cart = ctx.carts.get_or_create_cart(user).await?;

        assert_eq!(cart.items.first().map(|item| item.quantity), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn add_item_rejects_zero_quantity_and_unknown_product() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 3).await?;

        let zero = add_to_cart(&ctx, user, product.uuid, 0).await;

        assert!(
            matches!(zero, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {zero:?}"
        );

        let unknown = add_to_cart(&ctx, user, ProductUuid::new(), 1).await;

        assert!(
            matches!(unknown, Err(CartsServiceError::ProductNotFound)),
            "expected ProductNotFound, got {unknown:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn mixed_currencies_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let dollars = create_product(&ctx, 1_000, 3).await?;
        let pounds = ctx
            .products
            .create_product(NewProduct {
                currency: "GBP".to_string(),
                ..new_product(1_000, 3)
            })
            .await?;

        add_to_cart(&ctx, user, dollars.uuid, 1).await?;

        let result = add_to_cart(&ctx, user, pounds.uuid, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::CurrencyMismatch)),
            "expected CurrencyMismatch, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_item_replaces_variants_and_checks_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 4).await?;

        let cart = ctx
            .carts
            .add_item(
                user,
                NewCartItem {
                    product: product.uuid,
                    quantity: 1,
                    variants: vec![variant("size", "L", 200), variant("colour", "red", 0)],
                },
            )
            .await?;

        let item = cart.items.first().map(|item| item.uuid).ok_or("no item")?;

        let cart = ctx
            .carts
            .update_item(
                user,
                item,
                CartItemUpdate {
                    quantity: 4,
                    variants: Some(vec![variant("size", "M", 0)]),
                },
            )
            .await?;

        let updated = cart.items.first().ok_or("no item")?;

        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.variants, vec![variant("size", "M", 0)]);

        let result = ctx
            .carts
            .update_item(
                user,
                item,
                CartItemUpdate {
                    quantity: 5,
                    variants: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::InsufficientStock { .. })),
            "expected InsufficientStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_item_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .carts
            .update_item(
                UserUuid::new(),
                CartItemUuid::new(),
                CartItemUpdate {
                    quantity: 1,
                    variants: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn removing_last_item_clears_coupon() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 5).await?;
        let coupon = create_coupon(&ctx, new_coupon(CouponDiscount::Percentage { percentage: 10 }))
            .await?;

        let cart = add_to_cart(&ctx, user, product.uuid, 1).await?;

        ctx.carts
            .apply_coupon(user, CouponCode::parse(&coupon.code)?)
            .await?;

        let item = cart.items.first().map(|item| item.uuid).ok_or("no item")?;
        let cart = ctx.carts.remove_item(user, item).await?;

        assert!(cart.is_empty());
        assert!(cart.coupon_code.is_none(), "coupon should be cleared");

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_resets_items_and_coupon() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 5).await?;
        let coupon = create_coupon(&ctx, new_coupon(CouponDiscount::Fixed { amount: 100 })).await?;

        add_to_cart(&ctx, user, product.uuid, 2).await?;
        ctx.carts
            .apply_coupon(user, CouponCode::parse(&coupon.code)?)
            .await?;

        let cart = ctx.carts.clear_cart(user).await?;

        assert!(cart.is_empty());
        assert!(cart.coupon_code.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn apply_coupon_attaches_without_counting_usage() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 5).await?;
        let coupon = create_coupon(&ctx, new_coupon(CouponDiscount::Percentage { percentage: 10 }))
            .await?;

        add_to_cart(&ctx, user, product.uuid, 2).await?;

        let cart = ctx
            .carts
            .apply_coupon(user, CouponCode::parse(&coupon.code.to_lowercase())?)
            .await?;

        assert_eq!(cart.coupon_code.as_deref(), Some(coupon.code.as_str()));
        assert_eq!(cart.items.len(), 1);

        let stored = ctx.coupons.get_coupon(CouponCode::parse(&coupon.code)?).await?;

        assert_eq!(stored.usage_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn coupon_below_min_purchase_is_rejected_without_side_effects() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 5).await?;
        let coupon = create_coupon(
            &ctx,
            NewCoupon {
                min_purchase: 5_000,
                ..new_coupon(CouponDiscount::Fixed { amount: 500 })
            },
        )
        .await?;

        add_to_cart(&ctx, user, product.uuid, 2).await?;

        let result = ctx
            .carts
            .apply_coupon(user, CouponCode::parse(&coupon.code)?)
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::CouponRejected(
                    CouponRejection::MinPurchaseNotMet
                ))
            ),
            "expected MinPurchaseNotMet, got {result:?}"
        );

        let stored = ctx.coupons.get_coupon(CouponCode::parse(&coupon.code)?).await?;
        let cart = ctx.carts.get_or_create_cart(user).await?;

        assert_eq!(stored.usage_count, 0);
        assert!(cart.coupon_code.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn apply_unknown_coupon_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 5).await?;

        add_to_cart(&ctx, user, product.uuid, 1).await?;

        let result = ctx
            .carts
            .apply_coupon(user, CouponCode::parse("NOPE")?)
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::CouponRejected(
                    CouponRejection::CouponNotFound
                ))
            ),
            "expected CouponNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn apply_coupon_to_empty_cart_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, new_coupon(CouponDiscount::Fixed { amount: 100 })).await?;

        let result = ctx
            .carts
            .apply_coupon(UserUuid::new(), CouponCode::parse(&coupon.code)?)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_coupon_detaches_it() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let product = create_product(&ctx, 1_000, 5).await?;
        let coupon = create_coupon(&ctx, new_coupon(CouponDiscount::Fixed { amount: 100 })).await?;

        add_to_cart(&ctx, user, product.uuid, 1).await?;
        ctx.carts
            .apply_coupon(user, CouponCode::parse(&coupon.code)?)
            .await?;

        let cart = ctx.carts.remove_coupon(user).await?;

        assert!(cart.coupon_code.is_none());
        assert_eq!(cart.items.len(), 1);

        Ok(())
    }
}
