use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use skyroute_shared::FlightOffer;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FlightSearchQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights", get(search_flights))
        .route("/v1/flights/{id}", get(get_flight))
}

/// GET /v1/flights?from=&to=
async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightSearchQuery>,
) -> Json<Vec<FlightOffer>> {
    let results: Vec<FlightOffer> = state
        .catalog
        .search(query.from.as_deref(), query.to.as_deref())
        .into_iter()
        .cloned()
        .collect();
    tracing::debug!("Flight search {:?} -> {} results", query, results.len());
    Json(results)
}

/// GET /v1/flights/{id}
async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlightOffer>, AppError> {
    state
        .catalog
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Flight not found: {}", id)))
}
