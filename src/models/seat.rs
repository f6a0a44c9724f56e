use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seat_class", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatClass {
    Regular,
    Premium,
    Vip,
}

/// Seat lifecycle for one show: Available -> Locked (reservation hold) ->
/// Booked (finalized sale). Transitions are always conditional on the
/// current status; there is no unconditional write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seat_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub show_id: i64,
    pub label: String,
    pub class: SeatClass,
    pub price: f64,
    pub status: SeatStatus,
    pub booking_id: Option<i64>,
}
