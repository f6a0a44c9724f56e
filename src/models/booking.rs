use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// One completed purchase. Created only by a successful orchestration run,
/// never partially persisted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    /// Human-readable reference code, unique and immutable once assigned.
    pub reference: String,
    pub user_id: i64,
    pub show_id: i64,
    pub gross_amount: f64,
    pub discount_amount: f64,
    pub net_amount: f64,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

/// Generate a fresh booking reference: "BMS-" plus the first 8 hex chars of
/// a v4 uuid, uppercased.
pub fn generate_reference() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("BMS-{}", raw[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_expected_shape() {
        let r = generate_reference();
        assert_eq!(r.len(), 12);
        assert!(r.starts_with("BMS-"));
        assert!(r[4..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn references_are_practically_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_reference()));
        }
    }
}
