use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::models::{Movie, SeatClass, SeatStatus, TimeSlot};
use crate::AppState;

/// One row of the browse listing: a show with its movie and theatre
/// descriptors flattened in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowSummary {
    pub show_id: i64,
    pub movie_id: i64,
    pub movie_title: String,
    pub theatre_id: i64,
    pub theatre_name: String,
    pub theatre_city: String,
    pub theatre_address: String,
    pub starts_at: NaiveDateTime,
    pub slot: TimeSlot,
    pub base_price: f64,
    pub available_seats: i32,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeatView {
    pub id: i64,
    pub label: String,
    pub class: SeatClass,
    pub price: f64,
    pub status: SeatStatus,
}

/// Read-side catalog queries. No orchestration logic lives here; this only
/// needs the Show/Seat data shape.
pub struct BrowsingService {
    state: Arc<AppState>,
}

impl BrowsingService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Theatres showing a movie in a city on a date, with show timings.
    pub async fn browse_shows(
        &self,
        movie_id: i64,
        city: &str,
        date: NaiveDate,
    ) -> Result<Vec<ShowSummary>, ApiError> {
        Movie::find_by_id(movie_id, &self.state.db)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Movie {}", movie_id)))?;

        // midnight is always representable
        let day_start = date.and_hms_opt(0, 0, 0).unwrap();
        let day_end = day_start + chrono::Duration::days(1);

        let shows = sqlx::query_as::<_, ShowSummary>(
            r#"
            SELECT s.id AS show_id, m.id AS movie_id, m.title AS movie_title,
                   t.id AS theatre_id, t.name AS theatre_name,
                   t.city AS theatre_city, t.address AS theatre_address,
                   s.starts_at, s.slot, s.base_price, s.available_seats
            FROM shows s
            JOIN movies m ON m.id = s.movie_id
            JOIN theatres t ON t.id = s.theatre_id
            WHERE m.id = $1
              AND LOWER(t.city) = LOWER($2)
              AND s.starts_at >= $3 AND s.starts_at < $4
            ORDER BY s.starts_at, t.name
            "#,
        )
        .bind(movie_id)
        .bind(city)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.state.db.pool)
        .await?;

        info!(movie_id, city, %date, found = shows.len(), "browsed shows");
        Ok(shows)
    }

    /// All seats of one show with their live status.
    pub async fn seats_for_show(&self, show_id: i64) -> Result<Vec<SeatView>, ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM shows WHERE id = $1)",
        )
        .bind(show_id)
        .fetch_one(&self.state.db.pool)
        .await?;

        if !exists {
            return Err(ApiError::not_found(format!("Show {}", show_id)));
        }

        let seats = sqlx::query_as::<_, SeatView>(
            "SELECT id, label, class, price, status
             FROM seats WHERE show_id = $1 ORDER BY id",
        )
        .bind(show_id)
        .fetch_all(&self.state.db.pool)
        .await?;

        Ok(seats)
    }
}
