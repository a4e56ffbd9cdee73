//! List Order Payments Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, get::PaymentResponse},
    state::State,
};

/// List Order Payments Handler
#[endpoint(
    tags("payments"),
    summary = "List Order Payments",
    responses(
        (status_code = StatusCode::OK, description = "Payments for the order"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the order owner"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Vec<PaymentResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let payments = state
        .app
        .payments
        .list_payments(actor, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        payments.into_iter().map(PaymentResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use fulfilment_app::domain::payments::PaymentsServiceError;

    use crate::test_helpers::{Mocks, as_customer, make_order, make_payment, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("orders/{order}/payments").get(handler))
    }

    #[tokio::test]
    async fn test_list_order_payments() -> TestResult {
        let order = make_order(8_00);
        let uuid = order.uuid.into_uuid();
        let payment = make_payment(&order);
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_list_payments()
            .once()
            .withf(move |_, o| o.into_uuid() == uuid)
            .return_once(move |_, _| Ok(vec![payment]));

        let mut res = as_customer(TestClient::get(format!(
            "http://example.com/orders/{uuid}/payments"
        )))
        .send(&make_service(mocks))
        .await;

        let body: Vec<PaymentResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body.iter().map(|p| p.order_uuid).collect::<Vec<_>>(),
            vec![uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_order_returns_403() {
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_list_payments()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::Unauthorized));

        let res = as_customer(TestClient::get(format!(
            "http://example.com/orders/{}/payments",
            Uuid::now_v7()
        )))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
    }
}
