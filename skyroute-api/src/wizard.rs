use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use skyroute_core::payment::PaymentDetails;
use skyroute_order::wizard::BookingConfirmation;
use skyroute_order::WizardSnapshot;
use skyroute_shared::PassengerInput;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWizardRequest {
    pub flight_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitPassengersRequest {
    pub passengers: Vec<PassengerInput>,
}

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub format: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/wizard", get(get_wizard))
        .route("/v1/wizard/open", post(open_wizard))
        .route("/v1/wizard/passengers", post(submit_passengers))
        .route("/v1/wizard/summary/confirm", post(confirm_summary))
        .route("/v1/wizard/back", post(go_back))
        .route("/v1/wizard/pay", post(pay))
        .route("/v1/wizard/close", post(close_wizard))
        .route("/v1/wizard/ticket", get(download_ticket))
}

/// GET /v1/wizard
async fn get_wizard(State(state): State<AppState>) -> Json<WizardSnapshot> {
    Json(state.wizard.snapshot())
}

/// POST /v1/wizard/open
async fn open_wizard(
    State(state): State<AppState>,
    Json(req): Json<OpenWizardRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let flight = state
        .catalog
        .find(&req.flight_id)
        .cloned()
        .ok_or_else(|| AppError::NotFoundError(format!("Flight not found: {}", req.flight_id)))?;
    Ok(Json(state.wizard.open(flight)))
}

/// POST /v1/wizard/passengers
async fn submit_passengers(
    State(state): State<AppState>,
    Json(req): Json<SubmitPassengersRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(state.wizard.submit_passengers(&req.passengers).await?))
}

/// POST /v1/wizard/summary/confirm
async fn confirm_summary(State(state): State<AppState>) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(state.wizard.confirm_summary().await?))
}

/// POST /v1/wizard/back
async fn go_back(State(state): State<AppState>) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(state.wizard.back().await?))
}

/// POST /v1/wizard/pay
async fn pay(
    State(state): State<AppState>,
    Json(details): Json<PaymentDetails>,
) -> Result<Json<BookingConfirmation>, AppError> {
    Ok(Json(state.wizard.pay(details).await?))
}

/// POST /v1/wizard/close
async fn close_wizard(State(state): State<AppState>) -> Json<WizardSnapshot> {
    Json(state.wizard.close())
}

/// GET /v1/wizard/ticket[?format=json]
async fn download_ticket(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Response, AppError> {
    let ticket = state.wizard.ticket()?;

    if query.format.as_deref() == Some("json") {
        return Ok(Json(ticket).into_response());
    }

    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", ticket.file_name()),
        ),
    ];
    Ok((headers, ticket.render_text()).into_response())
}
