//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

/// Clear Cart Handler
///
/// Removes every item and the attached coupon.
#[endpoint(
    tags("carts"),
    summary = "Clear Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart cleared"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing user identity"),
    ),
)]
#[tracing::instrument(
    name = "carts.clear",
    skip(depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    tracing::Span::current().record("user_uuid", tracing::field::display(actor.user));

    let cart = state
        .app
        .carts
        .clear_cart(actor.user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, as_customer, make_cart, service};

    use super::*;

    #[tokio::test]
    async fn test_clear_cart_returns_empty_cart() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_clear_cart()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|_| Ok(make_cart(Vec::new())));

        mocks.carts.expect_get_or_create_cart().never();

        let mut res = as_customer(TestClient::delete("http://example.com/cart"))
            .send(&service(mocks, Router::with_path("cart").delete(handler)))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.items.is_empty(), "expected no items");
        assert_eq!(body.coupon_code, None);
        assert_eq!(body.currency, None);

        Ok(())
    }
}
