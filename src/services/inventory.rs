use sqlx::{Postgres, Transaction};
use tracing::{debug, error, warn};

use crate::database::Database;
use crate::error::ApiError;
use crate::models::Seat;

/// Owns seat status for all shows and enforces at-most-once allocation per
/// seat. Every transition is a conditional UPDATE on the current status
/// (a compare-and-set on the row), so two racing reservations for the same
/// seat can never both win. Contention granularity is the single seat row;
/// no lock is ever held across pricing or booking persistence.
#[derive(Clone)]
pub struct SeatInventory {
    db: Database,
}

impl SeatInventory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Atomically reserve a set of seats for one show: every seat moves
    /// Available -> Locked, or none do.
    ///
    /// Any requested id that does not belong to the show fails the whole
    /// request with NotFound before a single row mutates. A seat that lost
    /// the race (no longer Available) fails the request with Conflict
    /// naming the blocking labels; seats locked earlier in the same attempt
    /// are released again. Returns the locked seats with their locked-in
    /// unit prices.
    pub async fn reserve(&self, show_id: i64, seat_ids: &[i64]) -> Result<Vec<Seat>, ApiError> {
        let found = sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE id = ANY($1) AND show_id = $2",
        )
        .bind(seat_ids)
        .bind(show_id)
        .fetch_all(&self.db.pool)
        .await?;

        let missing = missing_ids(seat_ids, &found);
        if !missing.is_empty() {
            return Err(ApiError::not_found(format!(
                "Seats {} for show {}",
                join_ids(&missing),
                show_id
            )));
        }

        // Attempt every seat even after a miss so the caller learns the
        // complete set of blockers, not just the first one.
        let mut locked: Vec<Seat> = Vec::with_capacity(seat_ids.len());
        let mut blocked: Vec<i64> = Vec::new();

        for &seat_id in seat_ids {
            let row = sqlx::query_as::<_, Seat>(
                "UPDATE seats SET status = 'locked'
                 WHERE id = $1 AND status = 'available'
                 RETURNING *",
            )
            .bind(seat_id)
            .fetch_optional(&self.db.pool)
            .await;

            match row {
                Ok(Some(seat)) => locked.push(seat),
                Ok(None) => blocked.push(seat_id),
                Err(e) => {
                    // Infrastructure failure mid-attempt: unwind and bail.
                    error!("seat {} lock failed: {:?}", seat_id, e);
                    let held: Vec<i64> = locked.iter().map(|s| s.id).collect();
                    self.release(&held).await;
                    return Err(e.into());
                }
            }
        }

        if !blocked.is_empty() {
            let held: Vec<i64> = locked.iter().map(|s| s.id).collect();
            self.release(&held).await;
            debug!(
                show_id,
                blocked = blocked.len(),
                "reservation lost the race, attempt unwound"
            );
            return Err(ApiError::Conflict {
                seats: blocked_labels(&found, &blocked),
            });
        }

        Ok(locked)
    }

    /// Convert Locked -> Booked inside the caller's transaction. Only called
    /// once the booking row exists in the same transaction.
    pub async fn finalize(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seat_ids: &[i64],
        booking_id: i64,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE seats SET status = 'booked', booking_id = $1
             WHERE id = ANY($2) AND status = 'locked'",
        )
        .bind(booking_id)
        .bind(seat_ids)
        .execute(&mut **tx)
        .await?;

        // All seats were Locked by this orchestration run; anything else
        // means the hold was tampered with.
        if result.rows_affected() != seat_ids.len() as u64 {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "finalize expected {} locked seats, updated {}",
                seat_ids.len(),
                result.rows_affected()
            )));
        }

        Ok(())
    }

    /// Compensating release: Locked -> Available. Used when a later
    /// orchestration step fails; restores the pre-attempt state exactly.
    /// Booked seats are never touched. Best-effort per seat so one bad row
    /// cannot strand the rest in Locked state.
    pub async fn release(&self, seat_ids: &[i64]) {
        for &seat_id in seat_ids {
            let released = sqlx::query(
                "UPDATE seats SET status = 'available', booking_id = NULL
                 WHERE id = $1 AND status = 'locked'",
            )
            .bind(seat_id)
            .execute(&self.db.pool)
            .await;

            match released {
                Ok(r) if r.rows_affected() == 0 => {
                    warn!("release skipped seat {}: not locked", seat_id);
                }
                Ok(_) => {}
                Err(e) => error!("failed to release seat {}: {:?}", seat_id, e),
            }
        }
    }
}

/// Requested ids with no matching row for this show, in request order.
fn missing_ids(requested: &[i64], found: &[Seat]) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !found.iter().any(|s| s.id == *id))
        .collect()
}

/// Labels of the blocking seats, in request order.
fn blocked_labels(found: &[Seat], blocked: &[i64]) -> Vec<String> {
    blocked
        .iter()
        .filter_map(|id| found.iter().find(|s| s.id == *id))
        .map(|s| s.label.clone())
        .collect()
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeatClass, SeatStatus};

    fn seat(id: i64, label: &str, status: SeatStatus) -> Seat {
        Seat {
            id,
            show_id: 1,
            label: label.to_string(),
            class: SeatClass::Regular,
            price: 200.0,
            status,
            booking_id: None,
        }
    }

    #[test]
    fn missing_ids_flags_seats_absent_from_the_show() {
        let found = vec![seat(1, "R1", SeatStatus::Available)];
        assert_eq!(missing_ids(&[1, 9, 4], &found), vec![9, 4]);
    }

    #[test]
    fn missing_ids_is_empty_when_all_rows_found() {
        let found = vec![
            seat(1, "R1", SeatStatus::Available),
            seat(2, "R2", SeatStatus::Available),
        ];
        assert!(missing_ids(&[1, 2], &found).is_empty());
    }

    #[test]
    fn blocked_labels_name_the_contested_seats_in_request_order() {
        let found = vec![
            seat(1, "R1", SeatStatus::Available),
            seat(2, "R2", SeatStatus::Booked),
            seat(3, "P3", SeatStatus::Locked),
        ];
        assert_eq!(blocked_labels(&found, &[3, 2]), vec!["P3", "R2"]);
    }

    #[test]
    fn join_ids_renders_a_readable_list() {
        assert_eq!(join_ids(&[4, 9]), "4, 9");
    }
}
