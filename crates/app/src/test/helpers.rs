//! Test Helpers

use std::sync::atomic::{AtomicU64, Ordering};

use fulfilment::{
    addresses::Address,
    coupons::{CouponCode, CouponDiscount},
    orders::PaymentMethod,
    shipping::ShippingMethod,
    variants::SelectedVariant,
};
use jiff::{Timestamp, ToSpan};

use crate::{
    domain::{
        carts::{CartsService, CartsServiceError, data::NewCartItem, records::CartRecord},
        coupons::{
            CouponsService, CouponsServiceError, data::NewCoupon,
            records::{CouponRecord, CouponUuid},
        },
        orders::{OrdersService, OrdersServiceError, data::NewOrder, records::OrderRecord},
        payments::{data::NewPayment, records::PaymentUuid},
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
    },
    identity::UserUuid,
    test::TestContext,
};

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// A USD product with a unique name and SKU.
pub(crate) fn new_product(price: u64, stock_quantity: u32) -> NewProduct {
    let id = next_id();

    NewProduct {
        uuid: ProductUuid::new(),
        name: format!("Product {id}"),
        sku: format!("SKU-{id}"),
        price,
        currency: "USD".to_string(),
        stock_quantity,
        images: vec![
            "https://img.example/1.png".to_string(),
            "https://img.example/2.png".to_string(),
        ],
        categories: Vec::new(),
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    price: u64,
    stock_quantity: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(new_product(price, stock_quantity))
        .await
}

/// An active, unrestricted coupon valid from yesterday until tomorrow.
pub(crate) fn new_coupon(discount: CouponDiscount) -> NewCoupon {
    let now = Timestamp::now();

    NewCoupon {
        uuid: CouponUuid::new(),
        code: CouponCode::parse(&format!("TEST{}", next_id())).expect("valid coupon code"),
        discount,
        min_purchase: 0,
        max_discount: None,
        valid_from: now.checked_sub(24.hours()).expect("valid timestamp"),
        valid_until: now.checked_add(24.hours()).expect("valid timestamp"),
        usage_limit: None,
        is_active: true,
        applicable_products: Vec::new(),
        applicable_categories: Vec::new(),
    }
}

pub(crate) async fn create_coupon(
    ctx: &TestContext,
    coupon: NewCoupon,
) -> Result<CouponRecord, CouponsServiceError> {
    ctx.coupons.create_coupon(coupon).await
}

pub(crate) fn variant(name: &str, option: &str, price_modifier: i64) -> SelectedVariant {
    SelectedVariant {
        name: name.to_string(),
        option: option.to_string(),
        price_modifier,
    }
}

pub(crate) async fn add_to_cart(
    ctx: &TestContext,
    user: UserUuid,
    product: ProductUuid,
    quantity: u32,
) -> Result<CartRecord, CartsServiceError> {
    ctx.carts
        .add_item(
            user,
            NewCartItem {
                product,
                quantity,
                variants: Vec::new(),
            },
        )
        .await
}

pub(crate) fn address() -> Address {
    Address {
        full_name: "Ada Lovelace".to_string(),
        line1: "12 Analytical Row".to_string(),
        line2: None,
        city: "London".to_string(),
        region: None,
        postal_code: "N1 9GU".to_string(),
        country: "GB".to_string(),
        phone: Some("+44 20 7946 0000".to_string()),
    }
}

pub(crate) fn new_order() -> NewOrder {
    NewOrder {
        shipping_address: address(),
        billing_address: None,
        payment_method: PaymentMethod::CreditCard,
        shipping_method: ShippingMethod::Standard,
        notes: None,
    }
}

pub(crate) async fn checkout(
    ctx: &TestContext,
    user: UserUuid,
) -> Result<OrderRecord, OrdersServiceError> {
    ctx.orders.create_order(user, new_order()).await
}

/// A capture for exactly the order total.
pub(crate) fn new_payment(order: &OrderRecord) -> NewPayment {
    NewPayment {
        uuid: PaymentUuid::new(),
        method: order.payment_method,
        amount: order.total,
        currency: order.currency.clone(),
        transaction_id: Some(format!("txn_{}", next_id())),
        billing_address: Some(order.billing_address.clone()),
    }
}
