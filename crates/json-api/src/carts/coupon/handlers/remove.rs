//! Remove Coupon Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Coupon Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Coupon",
    responses((status_code = StatusCode::OK, description = "Coupon detached")),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let cart = state
        .app
        .carts
        .remove_coupon(actor.user)
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
    async fn test_remove_coupon_returns_cart() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_remove_coupon()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|_| Ok(make_cart(Vec::new())));

        let mut res = as_customer(TestClient::delete("http://example.com/cart/coupon"))
            .send(&service(mocks, Router::with_path("cart/coupon").delete(handler)))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.coupon_code, None);

        Ok(())
    }
}
