use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skyroute_core::payment::PaymentError;
use skyroute_core::repository::LedgerError;
use skyroute_core::StoreError;
use skyroute_order::WizardError;
use skyroute_shared::FieldError;

#[derive(Debug)]
pub enum AppError {
    ValidationError { message: String, fields: Vec<FieldError> },
    BadRequestError(String),
    PaymentRequiredError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::ValidationError { message, fields } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "fields": fields }),
            ),
            AppError::BadRequestError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::PaymentRequiredError(msg) => (StatusCode::PAYMENT_REQUIRED, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Validation(fields) => AppError::ValidationError {
                message: "Passenger details are invalid".to_string(),
                fields,
            },
            WizardError::PassengerCount { .. } => AppError::ValidationError {
                message: err.to_string(),
                fields: Vec::new(),
            },
            WizardError::NoFlightSelected
            | WizardError::InvalidTransition { .. }
            | WizardError::TransitionInProgress
            | WizardError::Abandoned => AppError::ConflictError(err.to_string()),
            WizardError::NoConfirmation => AppError::NotFoundError(err.to_string()),
            WizardError::Payment(e) => e.into(),
            WizardError::Store(e) => e.into(),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InsufficientFunds { .. } => AppError::PaymentRequiredError(err.to_string()),
            PaymentError::Store(e) => e.into(),
            PaymentError::InvalidAmount(_)
            | PaymentError::InvalidCardDetails(_)
            | PaymentError::InvalidUpiId(_)
            | PaymentError::UnsupportedMethod(_) => AppError::BadRequestError(err.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        PaymentError::from(err).into()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
