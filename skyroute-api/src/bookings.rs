use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use skyroute_shared::BookingRecord;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
}

/// GET /v1/bookings
async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<BookingRecord>>, AppError> {
    Ok(Json(state.bookings.list().await?))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingRecord>, AppError> {
    state
        .bookings
        .find(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", id)))
}
