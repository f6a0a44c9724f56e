use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::browsing::BrowsingService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows/browse", get(browse_shows))
        .route("/shows/{show_id}/seats", get(show_seats))
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub movie_id: i64,
    pub city: String,
    /// yyyy-mm-dd
    pub date: String,
}

// GET /api/shows/browse?movie_id=..&city=..&date=..
async fn browse_shows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BrowseQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if params.movie_id <= 0 {
        return Err(ApiError::validation("movie_id must be > 0"));
    }
    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
        .map_err(|_| ApiError::validation("date must be yyyy-mm-dd"))?;

    // Key under the movie's current browse version so bookings can orphan
    // stale listings without tracking individual query keys.
    let version = state.cache.browse_version(params.movie_id).await;
    let cache_key =
        crate::cache::CacheService::browse_key(params.movie_id, version, &params.city, &params.date);
    if let Some(cached) = state.cache.get_cached(&cache_key).await {
        return Ok(json_response(cached, "HIT"));
    }

    let shows = BrowsingService::new(state.clone())
        .browse_shows(params.movie_id, &params.city, date)
        .await?;

    let json = serde_json::to_string(&shows)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("show serialization")))?;
    state.cache.put_cached(&cache_key, &json).await;

    Ok(json_response(json, "MISS"))
}

fn json_response(json: String, cache_state: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("X-Cache", cache_state)
        .body(Body::from(json))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// GET /api/shows/{show_id}/seats
async fn show_seats(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<i64>,
) -> Result<Response, ApiError> {
    if show_id <= 0 {
        return Err(ApiError::validation("show_id must be > 0"));
    }

    // Seat maps are hot on the read side; serve from cache when possible.
    if let Some(cached) = state.cache.get_seats(show_id).await {
        return Ok(json_response(cached, "HIT"));
    }

    let seats = BrowsingService::new(state.clone())
        .seats_for_show(show_id)
        .await?;

    let json = serde_json::to_string(&seats)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("seat serialization")))?;
    state.cache.put_seats(show_id, &json).await;

    Ok(json_response(json, "MISS"))
}
