//! Errors

use salvo::http::StatusError;
use tracing::error;

use fulfilment_app::domain::payments::PaymentsServiceError;

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Payment already exists")
        }
        PaymentsServiceError::NotFound => {
            StatusError::not_found().brief("Payment or order not found")
        }
        PaymentsServiceError::InvalidReference
        | PaymentsServiceError::MissingRequiredData
        | PaymentsServiceError::InvalidData
        | PaymentsServiceError::InvalidAmount => {
            StatusError::bad_request().brief("Invalid payment payload")
        }
        PaymentsServiceError::Unauthorized => {
            StatusError::forbidden().brief("Not allowed to access this payment")
        }
        error @ (PaymentsServiceError::AlreadySettled
        | PaymentsServiceError::OrderCancelled
        | PaymentsServiceError::NotRefundable(_)) => {
            StatusError::conflict().brief(error.to_string())
        }
        error @ (PaymentsServiceError::AmountMismatch { .. }
        | PaymentsServiceError::OverRefund { .. }) => {
            StatusError::unprocessable_entity().brief(error.to_string())
        }
        PaymentsServiceError::Money(source) => {
            error!("payment amount overflow: {source}");

            StatusError::internal_server_error()
        }
        PaymentsServiceError::Sql(source) => {
            error!("payment storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use fulfilment::payments::PaymentStatus;
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn settlement_conflicts_and_amount_errors() {
        assert_eq!(
            into_status_error(PaymentsServiceError::AlreadySettled).code,
            StatusCode::CONFLICT
        );
        assert_eq!(
            into_status_error(PaymentsServiceError::NotRefundable(PaymentStatus::Refunded)).code,
            StatusCode::CONFLICT
        );
        assert_eq!(
            into_status_error(PaymentsServiceError::OverRefund { remaining: 5 }).code,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            into_status_error(PaymentsServiceError::InvalidAmount).code,
            StatusCode::BAD_REQUEST
        );
    }
}
