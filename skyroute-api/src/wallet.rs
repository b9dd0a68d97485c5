use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use skyroute_core::payment::PaymentDetails;
use skyroute_core::repository::LedgerAudit;
use skyroute_shared::TransactionRecord;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub amount: Decimal,
    pub payment: PaymentDetails,
}

#[derive(Debug, Serialize)]
pub struct TopUpResponse {
    pub transaction: TransactionRecord,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/wallet", get(get_balance))
        .route("/v1/wallet/top-up", post(top_up))
        .route("/v1/wallet/transactions", get(list_transactions))
        .route("/v1/wallet/audit", get(audit))
}

/// GET /v1/wallet
async fn get_balance(State(state): State<AppState>) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.wallet.balance().await?;
    Ok(Json(BalanceResponse { balance }))
}

/// POST /v1/wallet/top-up
async fn top_up(
    State(state): State<AppState>,
    Json(req): Json<TopUpRequest>,
) -> Result<Json<TopUpResponse>, AppError> {
    let transaction = state.wallet.top_up(req.amount, &req.payment).await?;
    let balance = state.wallet.balance().await?;
    Ok(Json(TopUpResponse { transaction, balance }))
}

/// GET /v1/wallet/transactions
async fn list_transactions(State(state): State<AppState>) -> Result<Json<Vec<TransactionRecord>>, AppError> {
    Ok(Json(state.wallet.transactions().await?))
}

/// GET /v1/wallet/audit
async fn audit(State(state): State<AppState>) -> Result<Json<LedgerAudit>, AppError> {
    Ok(Json(state.wallet.audit().await?))
}
