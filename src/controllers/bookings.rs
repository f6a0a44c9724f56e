use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::booking::BookingService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings", get(get_user_bookings))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(range(min = 1, message = "show_id must be > 0"))]
    pub show_id: i64,
    #[validate(length(min = 1, message = "at least one seat must be selected"))]
    pub seat_ids: Vec<i64>,
}

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<BookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    info!(
        user_id = user.user_id,
        show_id = req.show_id,
        seats = req.seat_ids.len(),
        "incoming booking request"
    );

    let summary = BookingService::new(state)
        .book_tickets(user.user_id, req.show_id, &req.seat_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

// GET /api/bookings
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = BookingService::new(state)
        .bookings_for_user(user.user_id)
        .await?;
    Ok(Json(summaries))
}
