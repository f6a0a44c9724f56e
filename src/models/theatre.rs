use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Theatre {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub total_seats: i32,
}
