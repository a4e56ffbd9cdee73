//! List Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// List Orders Handler
///
/// The caller's orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing identity"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let orders = state
        .app
        .orders
        .list_orders(actor.user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, as_customer, make_order, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("orders").get(handler))
    }

    #[tokio::test]
    async fn test_list_orders_in_service_order() -> TestResult {
        let newer = make_order(20_00);
        let older = make_order(10_00);
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_list_orders()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(vec![newer, older]));

        let mut res = as_customer(TestClient::get("http://example.com/orders"))
            .send(&make_service(mocks))
            .await;

        let body: Vec<OrderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body.iter().map(|order| order.total).collect::<Vec<_>>(),
            vec![20_00, 10_00]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_requires_identity() {
        let res = TestClient::get("http://example.com/orders")
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }
}
