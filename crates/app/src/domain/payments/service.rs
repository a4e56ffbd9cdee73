//! Payments service.

use async_trait::async_trait;
use fulfilment::{
    money,
    orders::OrderStatus,
    payments::{OrderPaymentStatus, PaymentStatus, apply_refund},
};
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        orders::{PgOrdersRepository, records::OrderUuid},
        payments::{
            data::{NewPayment, NewRefund},
            errors::PaymentsServiceError,
            records::{PaymentRecord, PaymentUuid},
            repository::PgPaymentsRepository,
        },
    },
    identity::{Actor, UserUuid},
};

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    payments: PgPaymentsRepository,
    orders: PgOrdersRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            payments: PgPaymentsRepository::new(),
            orders: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.process_payment",
        skip(self, payment),
        fields(
            user_uuid = %user,
            order_uuid = %order,
            payment_uuid = %payment.uuid,
            amount = payment.amount
        ),
        err
    )]
    async fn process_payment(
        &self,
        user: UserUuid,
        order: OrderUuid,
        payment: NewPayment,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        if payment.amount == 0 {
            return Err(PaymentsServiceError::InvalidAmount);
        }

        let mut tx = self.db.begin_transaction().await?;

        let order = self.orders.lock_order(&mut tx, order).await?;

        if order.user != user {
            return Err(PaymentsServiceError::Unauthorized);
        }

        if order.payment_status != OrderPaymentStatus::Pending {
            warn!(payment_status = %order.payment_status, "order already settled");

            return Err(PaymentsServiceError::AlreadySettled);
        }

        if order.status == OrderStatus::Cancelled {
            return Err(PaymentsServiceError::OrderCancelled);
        }

        if payment.amount != order.total || !payment.currency.eq_ignore_ascii_case(&order.currency) {
            warn!(
                expected = order.total,
                currency = %order.currency,
                "payment amount mismatch"
            );

            return Err(PaymentsServiceError::AmountMismatch {
                expected: order.total,
                currency: order.currency,
            });
        }

        let payment = NewPayment {
            currency: order.currency.clone(),
            ..payment
        };

        let created = self
            .payments
            .insert_payment(&mut tx, order.uuid, user, PaymentStatus::Completed, &payment)
            .await?;

        let status = if order.status == OrderStatus::Pending {
            OrderStatus::Processing
        } else {
            order.status
        };

        self.orders
            .set_payment_status(&mut tx, order.uuid, OrderPaymentStatus::Paid, status)
            .await?;

        tx.commit().await?;

        info!(
            payment_uuid = %created.uuid,
            order_uuid = %order.uuid,
            "processed payment"
        );

        Ok(created)
    }

    #[tracing::instrument(
        name = "payments.service.refund_payment",
        skip(self, refund),
        fields(actor_uuid = %actor.user, payment_uuid = %payment, amount = refund.amount),
        err
    )]
    async fn refund_payment(
        &self,
        actor: Actor,
        payment: PaymentUuid,
        refund: NewRefund,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        if !actor.role.is_staff() {
            return Err(PaymentsServiceError::Unauthorized);
        }

        let mut tx = self.db.begin_transaction().await?;

        // Order row first, then payment row, matching process_payment.
        let order = self.payments.get_payment(&mut tx, payment).await?.order;
        let order = self.orders.lock_order(&mut tx, order).await?;
        let current = self.payments.lock_payment(&mut tx, payment).await?;

        if current.status.is_refundable() && refund.amount > current.refundable() {
            warn!(refundable = current.refundable(), "refund exceeds remaining balance");

            return Err(PaymentsServiceError::OverRefund {
                remaining: current.refundable(),
            });
        }

        let currency = money::currency(&current.currency)?;

        let outcome = apply_refund(
            money::from_minor(current.amount, currency)?,
            money::from_minor(current.refund_amount, currency)?,
            current.status,
            money::from_minor(refund.amount, currency)?,
        )
        .inspect_err(|rejection| {
            warn!(
                refundable = current.refundable(),
                error = %rejection,
                "refund rejected"
            );
        })?;

        let updated = self
            .payments
            .record_refund(
                &mut tx,
                payment,
                money::to_minor(&outcome.refunded)?,
                outcome.status,
                refund.reason.as_deref(),
            )
            .await?;

        if let Some(payment_status) = outcome.status.order_payment_status() {
            self.orders
                .set_payment_status(&mut tx, order.uuid, payment_status, order.status)
                .await?;
        }

        tx.commit().await?;

        info!(
            payment_uuid = %updated.uuid,
            refund_amount = updated.refund_amount,
            status = %updated.status,
            "refunded payment"
        );

        Ok(updated)
    }

    async fn get_payment(
        &self,
        actor: Actor,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let payment = self.payments.get_payment(&mut tx, payment).await?;

        tx.commit().await?;

        if !actor.can_access(payment.user) {
            return Err(PaymentsServiceError::Unauthorized);
        }

        Ok(payment)
    }

    async fn list_payments(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.orders.get_order(&mut tx, order).await?;

        if !actor.can_access(order.user) {
            return Err(PaymentsServiceError::Unauthorized);
        }

        let payments = self.payments.list_order_payments(&mut tx, order.uuid).await?;

        tx.commit().await?;

        Ok(payments)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Settle an order with a completed capture.
    ///
    /// The amount and currency must match the order total. A pending order moves
    /// to processing.
    async fn process_payment(
        &self,
        user: UserUuid,
        order: OrderUuid,
        payment: NewPayment,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Staff-only refund. Partial refunds may be repeated until the payment is
    /// fully refunded.
    async fn refund_payment(
        &self,
        actor: Actor,
        payment: PaymentUuid,
        refund: NewRefund,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Retrieve a payment.
    async fn get_payment(
        &self,
        actor: Actor,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Payments recorded against an order, oldest first.
    async fn list_payments(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::orders::{OrdersService, records::OrderRecord},
        identity::Role,
        test::{
            TestContext,
            helpers::{add_to_cart, checkout, create_product, new_payment},
        },
    };

    use super::*;

    async fn placed_order(ctx: &TestContext, user: UserUuid, price: u64) -> TestResult<OrderRecord> {
        let product = create_product(ctx, price, 10).await?;

        add_to_cart(ctx, user, product.uuid, 1).await?;

        Ok(checkout(ctx, user).await?)
    }

    fn staff() -> Actor {
        Actor::new(UserUuid::new(), Role::Admin)
    }

    #[tokio::test]
    async fn payment_settles_order_and_advances_status() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 50_00).await?;

        let payment = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await?;

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.amount, order.total);
        assert_eq!(payment.order, order.uuid);
        assert_eq!(payment.refund_amount, 0);

        let settled = ctx
            .orders
            .get_order(Actor::new(user, Role::User), order.uuid)
            .await?;

        assert_eq!(settled.payment_status, OrderPaymentStatus::Paid);
        assert_eq!(settled.status, OrderStatus::Processing);

        Ok(())
    }

    #[tokio::test]
    async fn second_payment_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 50_00).await?;

        ctx.payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await?;

        let result = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::AlreadySettled)),
            "expected AlreadySettled, got {result:?}"
        );

        let payments = ctx.payments.list_payments(staff(), order.uuid).await?;
        let settled = ctx.orders.get_order(staff(), order.uuid).await?;

        assert_eq!(payments.len(), 1);
        assert_eq!(settled.payment_status, OrderPaymentStatus::Paid);

        Ok(())
    }

    #[tokio::test]
    async fn only_the_owner_can_pay() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = UserUuid::new();
        let order = placed_order(&ctx, owner, 50_00).await?;

        let result = ctx
            .payments
            .process_payment(UserUuid::new(), order.uuid, new_payment(&order))
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn payment_must_match_order_total() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 50_00).await?;

        let short = ctx
            .payments
            .process_payment(
                user,
                order.uuid,
                NewPayment {
                    amount: order.total - 1,
                    ..new_payment(&order)
                },
            )
            .await;

        assert!(
            matches!(short, Err(PaymentsServiceError::AmountMismatch { expected, .. }) if expected == order.total),
            "expected AmountMismatch, got {short:?}"
        );

        let wrong_currency = ctx
            .payments
            .process_payment(
                user,
                order.uuid,
                NewPayment {
                    currency: "EUR".to_string(),
                    ..new_payment(&order)
                },
            )
            .await;

        assert!(
            matches!(wrong_currency, Err(PaymentsServiceError::AmountMismatch { .. })),
            "expected AmountMismatch, got {wrong_currency:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_orders_cannot_be_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 50_00).await?;

        ctx.orders
            .cancel_order(Actor::new(user, Role::User), order.uuid)
            .await?;

        let result = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::OrderCancelled)),
            "expected OrderCancelled, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn partial_refunds_accumulate_until_over_refund() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        // 84.01 + 8.40 tax + 5.99 shipping
        let order = placed_order(&ctx, user, 84_01).await?;

        assert_eq!(order.total, 98_40);

        let payment = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await?;

        let first = ctx
            .payments
            .refund_payment(
                staff(),
                payment.uuid,
                NewRefund {
                    amount: 40_00,
                    reason: Some("damaged".to_string()),
                },
            )
            .await?;

        assert_eq!(first.refund_amount, 40_00);
        assert_eq!(first.status, PaymentStatus::PartiallyRefunded);
        assert_eq!(first.refund_reason.as_deref(), Some("damaged"));
        assert!(first.refunded_at.is_some());

        let second = ctx
            .payments
            .refund_payment(
                staff(),
                payment.uuid,
                NewRefund {
                    amount: 40_00,
                    reason: None,
                },
            )
            .await?;

        assert_eq!(second.refund_amount, 80_00);
        assert_eq!(second.status, PaymentStatus::PartiallyRefunded);

        let over = ctx
            .payments
            .refund_payment(
                staff(),
                payment.uuid,
                NewRefund {
                    amount: 30_00,
                    reason: None,
                },
            )
            .await;

        assert!(
            matches!(over, Err(PaymentsServiceError::OverRefund { remaining: 18_40 })),
            "expected OverRefund, got {over:?}"
        );

        let unchanged = ctx.payments.get_payment(staff(), payment.uuid).await?;
        let settled = ctx.orders.get_order(staff(), order.uuid).await?;

        assert_eq!(unchanged.refund_amount, 80_00);
        assert_eq!(settled.payment_status, OrderPaymentStatus::PartiallyRefunded);

        Ok(())
    }

    #[tokio::test]
    async fn full_refund_is_terminal() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 20_00).await?;

        let payment = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await?;

        let refunded = ctx
            .payments
            .refund_payment(
                staff(),
                payment.uuid,
                NewRefund {
                    amount: payment.amount,
                    reason: None,
                },
            )
            .await?;

        assert_eq!(refunded.status, PaymentStatus::Refunded);
        assert_eq!(refunded.refundable(), 0);

        let settled = ctx.orders.get_order(staff(), order.uuid).await?;

        assert_eq!(settled.payment_status, OrderPaymentStatus::Refunded);

        let again = ctx
            .payments
            .refund_payment(
                staff(),
                payment.uuid,
                NewRefund {
                    amount: 1,
                    reason: None,
                },
            )
            .await;

        assert!(
            matches!(
                again,
                Err(PaymentsServiceError::NotRefundable(PaymentStatus::Refunded))
            ),
            "expected NotRefundable, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn oversized_refund_is_an_over_refund() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 20_00).await?;

        let payment = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await?;

        let result = ctx
            .payments
            .refund_payment(
                staff(),
                payment.uuid,
                NewRefund {
                    amount: u64::MAX,
                    reason: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::OverRefund { remaining }) if remaining == payment.amount),
            "expected OverRefund, got {result:?}"
        );

        let unchanged = ctx.payments.get_payment(staff(), payment.uuid).await?;

        assert_eq!(unchanged.refund_amount, 0);
        assert_eq!(unchanged.status, PaymentStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn customers_cannot_refund() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 20_00).await?;

        let payment = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await?;

        let result = ctx
            .payments
            .refund_payment(
                Actor::new(user, Role::User),
                payment.uuid,
                NewRefund {
                    amount: 1_00,
                    reason: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn payments_are_private_to_owner_and_staff() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let order = placed_order(&ctx, user, 20_00).await?;

        let payment = ctx
            .payments
            .process_payment(user, order.uuid, new_payment(&order))
            .await?;

        let own = ctx
            .payments
            .get_payment(Actor::new(user, Role::User), payment.uuid)
            .await?;

        assert_eq!(own, payment);

        let stranger = Actor::new(UserUuid::new(), Role::User);

        let result = ctx.payments.get_payment(stranger, payment.uuid).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        let listed = ctx.payments.list_payments(stranger, order.uuid).await;

        assert!(
            matches!(listed, Err(PaymentsServiceError::Unauthorized)),
            "expected Unauthorized, got {listed:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_payment_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.payments.get_payment(staff(), PaymentUuid::new()).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
