//! Refund Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use fulfilment_app::domain::payments::data::NewRefund;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, get::PaymentResponse},
    state::State,
};

/// Refund Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RefundRequest {
    /// Minor units, at most the amount not yet refunded
    pub amount: u64,
    pub reason: Option<String>,
}

impl From<RefundRequest> for NewRefund {
    fn from(request: RefundRequest) -> Self {
        NewRefund {
            amount: request.amount,
            reason: request.reason,
        }
    }
}

/// Refund Payment Handler
///
/// Staff only. Repeated partial refunds accumulate until the payment is fully
/// refunded.
#[endpoint(
    tags("payments"),
    summary = "Refund Payment",
    responses(
        (status_code = StatusCode::OK, description = "Refund recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Amount must be positive"),
        (status_code = StatusCode::FORBIDDEN, description = "Staff role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment cannot be refunded"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Refund exceeds remaining amount"),
    ),
)]
#[tracing::instrument(
    name = "payments.refund",
    skip(payment, json, depot),
    fields(payment_uuid = tracing::field::Empty, amount = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    json: JsonBody<RefundRequest>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.staff_or_403()?;
    let payment = payment.into_inner();
    let refund = NewRefund::from(json.into_inner());

    let span = tracing::Span::current();

    span.record("payment_uuid", tracing::field::display(payment));
    span.record("amount", refund.amount);

    let refunded = state
        .app
        .payments
        .refund_payment(actor, payment.into(), refund)
        .await
        .map_err(into_status_error)?;

    info!(
        refunded = refunded.refund_amount,
        status = %refunded.status,
        "payment refunded"
    );

    Ok(Json(refunded.into()))
}

#[cfg(test)]
mod tests {
    use fulfilment::payments::PaymentStatus;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use fulfilment_app::domain::payments::{PaymentsServiceError, records::PaymentRecord};

    use crate::test_helpers::{Mocks, as_customer, as_staff, make_order, make_payment, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("payments/{payment}/refunds").post(handler))
    }

    #[tokio::test]
    async fn test_partial_refund() -> TestResult {
        let payment = PaymentRecord {
            status: PaymentStatus::PartiallyRefunded,
            refund_amount: 5_00,
            refund_reason: Some("damaged".to_string()),
            ..make_payment(&make_order(20_00))
        };
        let uuid = payment.uuid.into_uuid();
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_refund_payment()
            .once()
            .withf(move |actor, p, refund| {
                actor.role.is_staff()
                    && p.into_uuid() == uuid
                    && refund.amount == 5_00
                    && refund.reason.as_deref() == Some("damaged")
            })
            .return_once(move |_, _, _| Ok(payment));

        let mut res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{uuid}/refunds"
        )))
        .json(&json!({ "amount": 5_00, "reason": "damaged" }))
        .send(&make_service(mocks))
        .await;

        let body: PaymentResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "partially_refunded");
        assert_eq!(body.refund_amount, 5_00);

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_cannot_refund() {
        let mut mocks = Mocks::default();

        mocks.payments.expect_refund_payment().never();

        let res = as_customer(TestClient::post(format!(
            "http://example.com/payments/{}/refunds",
            Uuid::now_v7()
        )))
        .json(&json!({ "amount": 1_00 }))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn test_over_refund_returns_422() {
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_refund_payment()
            .once()
            .return_once(|_, _, _| Err(PaymentsServiceError::OverRefund { remaining: 3_00 }));

        let res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{}/refunds",
            Uuid::now_v7()
        )))
        .json(&json!({ "amount": 10_00 }))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
    }
}
