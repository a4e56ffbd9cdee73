//! Orders service.

use async_trait::async_trait;
use fulfilment::{
    coupons::{CouponCode, CouponRejection, CouponRules},
    money,
    orders::{OrderStatus, TransitionError},
    pricing::{self, PricingConfig, PricingError, PricingLine},
};
use jiff::Timestamp;
use mockall::automock;
use smallvec::SmallVec;
use sqlx::{Postgres, Transaction};
use tracing::{Span, field, info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{CartLine, PgCartItemsRepository, PgCartsRepository, coupon_lines, load_cart_lines},
        coupons::{PgCouponsRepository, validate_coupon},
        orders::{
            data::{NewOrder, PricedOrder, StatusUpdate},
            errors::OrdersServiceError,
            number::{MAX_ATTEMPTS, generate_order_number},
            records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
            reservation::reserve_stock,
        },
        products::PgProductsRepository,
    },
    identity::{Actor, UserUuid},
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    pricing: PricingConfig,
    orders: PgOrdersRepository,
    order_items: PgOrderItemsRepository,
    carts: PgCartsRepository,
    cart_items: PgCartItemsRepository,
    products: PgProductsRepository,
    coupons: PgCouponsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, pricing: PricingConfig) -> Self {
        Self {
            db,
            pricing,
            orders: PgOrdersRepository::new(),
            order_items: PgOrderItemsRepository::new(),
            carts: PgCartsRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            products: PgProductsRepository::new(),
            coupons: PgCouponsRepository::new(),
        }
    }

    async fn with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: OrderRecord,
    ) -> Result<OrderRecord, sqlx::Error> {
        let mut items = self.order_items.get_order_items(tx, &[order.uuid]).await?;

        order.items = items.remove(&order.uuid).unwrap_or_default();

        Ok(order)
    }

    /// Re-validate the attached coupon against the checkout snapshot.
    async fn checkout_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon_code: Option<&str>,
        lines: &[CartLine],
    ) -> Result<Option<(CouponCode, CouponRules)>, OrdersServiceError> {
        let Some(raw) = coupon_code else {
            return Ok(None);
        };

        let code = CouponCode::parse(raw).map_err(|_invalid| OrdersServiceError::InvalidData)?;
        let views = coupon_lines(lines).map_err(PricingError::from)?;
        let found = self.coupons.find_coupon(tx, &code).await?;

        let coupon = validate_coupon(found, &views, Timestamp::now()).inspect_err(|rejection| {
            warn!(reason = rejection.as_str(), "coupon rejected at checkout");
        })?;

        Ok(Some((code, coupon.rules())))
    }

    async fn insert_with_unique_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &PricedOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        for _ in 0..MAX_ATTEMPTS {
            let order_number = generate_order_number(Timestamp::now(), &mut rand::thread_rng());

            if let Some(created) = self.orders.insert_order(tx, order, &order_number).await? {
                return Ok(created);
            }

            warn!(%order_number, "order number collision");
        }

        Err(OrdersServiceError::OrderNumberExhausted)
    }
}

fn snapshot_item(line: &CartLine) -> Result<OrderItemRecord, PricingError> {
    let line_total = line.pricing.line_total()?;

    Ok(OrderItemRecord {
        uuid: OrderItemUuid::new(),
        product: line.product.uuid,
        name: line.product.name.clone(),
        sku: line.product.sku.clone(),
        image: line.product.primary_image().map(str::to_string),
        unit_price: line.item.unit_price,
        quantity: line.item.quantity,
        variants: line.item.variants.clone(),
        line_total: money::to_minor(&line_total)?,
    })
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(
            user_uuid = %user,
            shipping_method = %order.shipping_method,
            order_uuid = field::Empty,
            order_number = field::Empty
        ),
        err
    )]
    async fn create_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        order.shipping_address.validate()?;

        let billing_address = order
            .billing_address
            .unwrap_or_else(|| order.shipping_address.clone());

        billing_address.validate()?;

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;
        let items = self.cart_items.get_cart_items(&mut tx, cart.uuid).await?;

        if items.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let lines = load_cart_lines::<OrdersServiceError>(&mut tx, &self.products, items).await?;

        let coupon = self
            .checkout_coupon(&mut tx, cart.coupon_code.as_deref(), &lines)
            .await?;

        reserve_stock(&mut tx, &self.products, &lines).await?;

        let pricing_lines: SmallVec<[PricingLine<'static>; 8]> =
            lines.iter().map(|line| line.pricing).collect();

        let totals = pricing::price(
            &pricing_lines,
            coupon.as_ref().map(|(_, rules)| rules),
            order.shipping_method,
            &self.pricing,
        )?;

        if let Some((code, _)) = &coupon
            && !self.coupons.consume_coupon(&mut tx, code).await?
        {
            return Err(CouponRejection::UsageLimitReached.into());
        }

        let priced = PricedOrder {
            uuid: OrderUuid::new(),
            user,
            currency: totals.subtotal.currency().iso_alpha_code.to_string(),
            subtotal: money::to_minor(&totals.subtotal).map_err(PricingError::from)?,
            discount: money::to_minor(&totals.discount).map_err(PricingError::from)?,
            tax: money::to_minor(&totals.tax).map_err(PricingError::from)?,
            shipping: money::to_minor(&totals.shipping).map_err(PricingError::from)?,
            total: money::to_minor(&totals.total).map_err(PricingError::from)?,
            coupon_code: coupon.as_ref().map(|(code, _)| code.as_str().to_string()),
            shipping_address: order.shipping_address,
            billing_address,
            payment_method: order.payment_method,
            shipping_method: order.shipping_method,
            notes: order.notes,
        };

        let mut created = self.insert_with_unique_number(&mut tx, &priced).await?;

        Span::current()
            .record("order_uuid", field::display(created.uuid))
            .record("order_number", field::display(&created.order_number));

        for (position, line) in lines.iter().enumerate() {
            let position =
                u32::try_from(position).map_err(|_overflow| OrdersServiceError::InvalidData)?;
            let item = snapshot_item(line)?;

            let stored = self
                .order_items
                .insert_order_item(&mut tx, created.uuid, position, &item)
                .await?;

            created.items.push(stored);
        }

        self.cart_items.clear_cart_items(&mut tx, cart.uuid).await?;
        self.carts.set_coupon(&mut tx, cart.uuid, None).await?;

        tx.commit().await?;

        info!(
            order_uuid = %created.uuid,
            order_number = %created.order_number,
            total = created.total,
            currency = %created.currency,
            "created order"
        );

        Ok(created)
    }

    async fn get_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.orders.get_order(&mut tx, order).await?;

        if !actor.can_access(order.user) {
            return Err(OrdersServiceError::Unauthorized);
        }

        let order = self.with_items(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let mut orders = self.orders.list_orders(&mut tx, user).await?;

        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();
        let mut items = self.order_items.get_order_items(&mut tx, &uuids).await?;

        tx.commit().await?;

        for order in &mut orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self, update),
        fields(
            actor_uuid = %actor.user,
            order_uuid = %order,
            status = %update.status
        ),
        err
    )]
    async fn update_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if !actor.role.is_staff() {
            return Err(OrdersServiceError::Unauthorized);
        }

        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        current.status.transition_to(update.status)?;

        let updated = self.orders.update_status(&mut tx, order, &update).await?;
        let updated = self.with_items(&mut tx, updated).await?;

        tx.commit().await?;

        info!(
            order_uuid = %updated.uuid,
            from = %current.status,
            to = %updated.status,
            "updated order status"
        );

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self),
        fields(actor_uuid = %actor.user, order_uuid = %order),
        err
    )]
    async fn cancel_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        if !actor.can_access(current.user) {
            return Err(OrdersServiceError::Unauthorized);
        }

        if current.status != OrderStatus::Pending {
            return Err(TransitionError {
                from: current.status,
                to: OrderStatus::Cancelled,
            }
            .into());
        }

        let update = StatusUpdate {
            status: OrderStatus::Cancelled,
            tracking_number: None,
            estimated_delivery: None,
        };

        let cancelled = self.orders.update_status(&mut tx, order, &update).await?;
        let cancelled = self.with_items(&mut tx, cancelled).await?;

        tx.commit().await?;

        info!(order_uuid = %cancelled.uuid, "cancelled order");

        Ok(cancelled)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Check out the user's cart.
    ///
    /// Stock reservation, coupon redemption, the order insert and clearing the
    /// cart happen in one transaction; any failure leaves none of them behind.
    async fn create_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve an order. Only its owner and staff may read it.
    async fn get_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// A user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Staff-only status change along the transition table.
    async fn update_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel a pending order. Reserved stock is not returned.
    async fn cancel_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
