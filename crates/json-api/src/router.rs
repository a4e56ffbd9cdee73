//! App Router

use salvo::Router;

use crate::{carts, coupons, identity, orders, payments, products};

/// Every route that acts on behalf of an identified caller.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(identity::middleware::handler)
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(
                    Router::with_path("items")
                        .post(carts::items::create::handler)
                        .push(
                            Router::with_path("{item}")
                                .put(carts::items::update::handler)
                                .delete(carts::items::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("coupon")
                        .put(carts::coupon::apply::handler)
                        .delete(carts::coupon::remove::handler),
                ),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::create::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("status").put(orders::status::handler))
                        .push(Router::with_path("cancel").post(orders::cancel::handler))
                        .push(
                            Router::with_path("payments")
                                .get(payments::index::handler)
                                .post(payments::create::handler),
                        ),
                ),
        )
        .push(
            Router::with_path("payments/{payment}")
                .get(payments::get::handler)
                .push(Router::with_path("refunds").post(payments::refund::handler)),
        )
        .push(
            Router::with_path("coupons")
                .post(coupons::create::handler)
                .push(Router::with_path("validate").post(coupons::validate::handler))
                .push(Router::with_path("{code}").get(coupons::get::handler)),
        )
        .push(
            Router::with_path("products")
                .post(products::create::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{affix_state::inject, prelude::*, test::TestClient};

    use crate::test_helpers::{Mocks, as_customer, make_cart};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(mocks.into_state()))
                .push(app_router()),
        )
    }

    #[tokio::test]
    async fn test_routes_require_identity() {
        for path in ["cart", "orders", "coupons/SAVE10", "products/00000000-0000-0000-0000-000000000000"] {
            let res = TestClient::get(format!("http://example.com/{path}"))
                .send(&make_service(Mocks::default()))
                .await;

            assert_eq!(
                res.status_code,
                Some(StatusCode::UNAUTHORIZED),
                "expected 401 for {path}"
            );
        }
    }

    #[tokio::test]
    async fn test_cart_route_is_mounted() {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_get_or_create_cart()
            .once()
            .return_once(|_| Ok(make_cart(Vec::new())));

        let res = as_customer(TestClient::get("http://example.com/cart"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }
}
