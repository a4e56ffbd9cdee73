//! Test helpers.

use std::sync::Arc;

use fulfilment::{
    addresses::Address,
    orders::{OrderStatus, PaymentMethod},
    payments::{OrderPaymentStatus, PaymentStatus},
    shipping::ShippingMethod,
};
use fulfilment_app::{
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            records::{CartItemRecord, CartRecord},
        },
        coupons::MockCouponsService,
        orders::{MockOrdersService, records::OrderRecord},
        payments::{MockPaymentsService, records::PaymentRecord},
        products::MockProductsService,
    },
    identity::{Role, UserUuid},
};
use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*, test::RequestBuilder};
use uuid::Uuid;

use crate::{
    identity::{USER_ROLE_HEADER, USER_UUID_HEADER, middleware},
    state::State,
};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

/// Service mocks that fail the test on any call not explicitly expected.
#[derive(Default)]
pub(crate) struct Mocks {
    pub products: MockProductsService,
    pub coupons: MockCouponsService,
    pub carts: MockCartsService,
    pub orders: MockOrdersService,
    pub payments: MockPaymentsService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            products: Arc::new(self.products),
            coupons: Arc::new(self.coupons),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            payments: Arc::new(self.payments),
        })
    }
}

/// Serve `route` behind the identity middleware with mocked services.
pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(middleware::handler)
            .push(route),
    )
}

/// Send the request as [`TEST_USER_UUID`] with the given role.
pub(crate) fn as_role(builder: RequestBuilder, role: Role) -> RequestBuilder {
    builder
        .add_header(USER_UUID_HEADER, TEST_USER_UUID.to_string(), true)
        .add_header(USER_ROLE_HEADER, role.as_str(), true)
}

pub(crate) fn as_customer(builder: RequestBuilder) -> RequestBuilder {
    as_role(builder, Role::User)
}

pub(crate) fn as_staff(builder: RequestBuilder) -> RequestBuilder {
    as_role(builder, Role::Manager)
}

pub(crate) fn make_cart(items: Vec<CartItemRecord>) -> CartRecord {
    CartRecord {
        uuid: Uuid::now_v7().into(),
        user: TEST_USER_UUID,
        coupon_code: None,
        items,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_address() -> Address {
    Address {
        full_name: "Grace Hopper".to_string(),
        line1: "1 Compiler Way".to_string(),
        line2: None,
        city: "Arlington".to_string(),
        region: Some("VA".to_string()),
        postal_code: "22201".to_string(),
        country: "US".to_string(),
        phone: None,
    }
}

pub(crate) fn make_order(total: u64) -> OrderRecord {
    OrderRecord {
        uuid: Uuid::now_v7().into(),
        order_number: "ORD-20260101120000-ABC123".to_string(),
        user: TEST_USER_UUID,
        currency: "USD".to_string(),
        subtotal: total,
        discount: 0,
        tax: 0,
        shipping: 0,
        total,
        coupon_code: None,
        shipping_address: make_address(),
        billing_address: make_address(),
        payment_method: PaymentMethod::CreditCard,
        shipping_method: ShippingMethod::Standard,
        payment_status: OrderPaymentStatus::Pending,
        status: OrderStatus::Pending,
        notes: None,
        tracking_number: None,
        estimated_delivery: None,
        items: Vec::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_payment(order: &OrderRecord) -> PaymentRecord {
    PaymentRecord {
        uuid: Uuid::now_v7().into(),
        order: order.uuid,
        user: order.user,
        amount: order.total,
        currency: order.currency.clone(),
        method: order.payment_method,
        status: PaymentStatus::Completed,
        transaction_id: Some("txn_1".to_string()),
        billing_address: None,
        refund_amount: 0,
        refund_reason: None,
        refunded_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
