use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Coarse bucket of a show's start time. Only the afternoon bucket carries
/// pricing significance (the afternoon discount rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "time_slot", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    /// Classify a start hour (0..24) into its slot.
    pub fn from_hour(hour: u32) -> TimeSlot {
        match hour {
            0..=11 => TimeSlot::Morning,
            12..=16 => TimeSlot::Afternoon,
            17..=20 => TimeSlot::Evening,
            _ => TimeSlot::Night,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub movie_id: i64,
    pub theatre_id: i64,
    pub starts_at: NaiveDateTime,
    pub slot: TimeSlot,
    pub base_price: f64,
    pub total_seats: i32,
    /// Derived counter: number of seats currently Available. Mutated only
    /// inside the same transaction as the seat finalize step.
    pub available_seats: i32,
}

impl Show {
    pub async fn find_by_id(
        id: i64,
        db: &crate::database::Database,
    ) -> Result<Option<Show>, sqlx::Error> {
        sqlx::query_as::<_, Show>("SELECT * FROM shows WHERE id = $1")
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_classify_into_slots() {
        assert_eq!(TimeSlot::from_hour(10), TimeSlot::Morning);
        assert_eq!(TimeSlot::from_hour(12), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_hour(14), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_hour(16), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_hour(18), TimeSlot::Evening);
        assert_eq!(TimeSlot::from_hour(21), TimeSlot::Night);
        assert_eq!(TimeSlot::from_hour(23), TimeSlot::Night);
    }
}
