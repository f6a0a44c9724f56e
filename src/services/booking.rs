use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::models::{booking::generate_reference, Booking, BookingStatus, Seat, Show, User};
use crate::services::discount::DiscountEngine;
use crate::services::inventory::SeatInventory;
use crate::AppState;

/// Booking summary returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSummary {
    pub booking_id: i64,
    pub reference: String,
    pub show_id: i64,
    pub movie_title: String,
    pub theatre_name: String,
    pub starts_at: NaiveDateTime,
    pub seat_labels: Vec<String>,
    pub gross_amount: f64,
    pub discount_amount: f64,
    pub net_amount: f64,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

/// Composes identity/show lookups, the seat inventory and the discount
/// engine into the single user-facing booking operation.
pub struct BookingService {
    state: Arc<AppState>,
    inventory: SeatInventory,
    discounts: DiscountEngine,
}

impl BookingService {
    pub fn new(state: Arc<AppState>) -> Self {
        let inventory = SeatInventory::new(state.db.clone());
        Self {
            state,
            inventory,
            discounts: DiscountEngine::standard(),
        }
    }

    /// Book a set of seats for a show on behalf of a user.
    ///
    /// Reservation happens before pricing and persistence; any failure after
    /// the seats were locked releases them again, so no error path leaves a
    /// seat stranded in Locked state.
    pub async fn book_tickets(
        &self,
        user_id: i64,
        show_id: i64,
        seat_ids: &[i64],
    ) -> Result<BookingSummary, ApiError> {
        validate_seat_selection(seat_ids)?;

        let user = User::find_by_id(user_id, &self.state.db)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User {}", user_id)))?;

        let show = Show::find_by_id(show_id, &self.state.db)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Show {}", show_id)))?;

        info!(
            user = %user.username,
            show_id,
            seats = seat_ids.len(),
            "starting booking"
        );

        // Fetch the summary descriptors up front; a committed booking must
        // never fail afterwards over a read-only lookup.
        let (movie_title, theatre_name) = self.show_descriptors(show.id).await?;

        // Step 3: all-or-nothing reservation hold.
        let seats = self.inventory.reserve(show.id, seat_ids).await?;

        // Steps 4-5: price against the locked-in unit prices.
        let gross_amount: f64 = seats.iter().map(|s| s.price).sum();
        let discount_amount = self
            .discounts
            .discount(gross_amount, seats.len(), show.slot);
        let net_amount = gross_amount - discount_amount;
        debug!(gross_amount, discount_amount, net_amount, "booking priced");

        // Steps 6-7: booking row, seat finalize and counter decrement commit
        // or roll back as one unit.
        let booking = match self
            .persist_booking(&user, &show, &seats, gross_amount, discount_amount, net_amount)
            .await
        {
            Ok(booking) => booking,
            Err(e) => {
                error!("booking persistence failed, releasing held seats: {}", e);
                self.inventory.release(seat_ids).await;
                return Err(e);
            }
        };

        // Seat map and browse listings for this show now carry stale counts.
        self.state.cache.invalidate_show(show.id, show.movie_id).await;

        info!(
            reference = %booking.reference,
            net_amount = booking.net_amount,
            "booking confirmed"
        );

        Ok(build_summary(
            &booking,
            &show,
            &seats,
            movie_title,
            theatre_name,
        ))
    }

    async fn persist_booking(
        &self,
        user: &User,
        show: &Show,
        seats: &[Seat],
        gross_amount: f64,
        discount_amount: f64,
        net_amount: f64,
    ) -> Result<Booking, ApiError> {
        let seat_ids: Vec<i64> = seats.iter().map(|s| s.id).collect();
        let mut tx = self.state.db.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings
                 (reference, user_id, show_id, gross_amount, discount_amount, net_amount, status)
             VALUES ($1, $2, $3, $4, $5, $6, 'confirmed')
             RETURNING *",
        )
        .bind(generate_reference())
        .bind(user.id)
        .bind(show.id)
        .bind(gross_amount)
        .bind(discount_amount)
        .bind(net_amount)
        .fetch_one(&mut *tx)
        .await?;

        self.inventory.finalize(&mut tx, &seat_ids, booking.id).await?;

        // The available counter only ever moves together with the seat rows.
        let updated = sqlx::query(
            "UPDATE shows SET available_seats = available_seats - $1 WHERE id = $2",
        )
        .bind(seat_ids.len() as i32)
        .bind(show.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != 1 {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "show {} vanished while decrementing available seats",
                show.id
            )));
        }

        tx.commit().await?;
        Ok(booking)
    }

    async fn show_descriptors(&self, show_id: i64) -> Result<(String, String), ApiError> {
        Ok(sqlx::query_as::<_, (String, String)>(
            "SELECT m.title, t.name
             FROM shows s
             JOIN movies m ON m.id = s.movie_id
             JOIN theatres t ON t.id = s.theatre_id
             WHERE s.id = $1",
        )
        .bind(show_id)
        .fetch_one(&self.state.db.pool)
        .await?)
    }

    /// All bookings made by one user, newest first.
    pub async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<BookingSummary>, ApiError> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.reference, b.show_id, b.gross_amount, b.discount_amount,
                   b.net_amount, b.status, b.created_at,
                   s.starts_at, m.title AS movie_title, t.name AS theatre_name,
                   st.label AS seat_label
            FROM bookings b
            JOIN shows s ON s.id = b.show_id
            JOIN movies m ON m.id = s.movie_id
            JOIN theatres t ON t.id = s.theatre_id
            LEFT JOIN seats st ON st.booking_id = b.id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC, b.id DESC, st.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.state.db.pool)
        .await?;

        let mut summaries: Vec<BookingSummary> = Vec::new();
        for row in rows {
            let booking_id: i64 = row.get("id");
            let seat_label: Option<String> = row.try_get("seat_label").ok();

            match summaries.last_mut() {
                Some(last) if last.booking_id == booking_id => {
                    if let Some(label) = seat_label {
                        last.seat_labels.push(label);
                    }
                }
                _ => summaries.push(BookingSummary {
                    booking_id,
                    reference: row.get("reference"),
                    show_id: row.get("show_id"),
                    movie_title: row.get("movie_title"),
                    theatre_name: row.get("theatre_name"),
                    starts_at: row.get("starts_at"),
                    seat_labels: seat_label.into_iter().collect(),
                    gross_amount: row.get("gross_amount"),
                    discount_amount: row.get("discount_amount"),
                    net_amount: row.get("net_amount"),
                    status: row.get("status"),
                    created_at: row.get("created_at"),
                }),
            }
        }

        Ok(summaries)
    }
}

/// Assemble the caller-facing summary from state already in hand; no I/O
/// happens after the booking transaction commits.
fn build_summary(
    booking: &Booking,
    show: &Show,
    seats: &[Seat],
    movie_title: String,
    theatre_name: String,
) -> BookingSummary {
    BookingSummary {
        booking_id: booking.id,
        reference: booking.reference.clone(),
        show_id: show.id,
        movie_title,
        theatre_name,
        starts_at: show.starts_at,
        seat_labels: seats.iter().map(|s| s.label.clone()).collect(),
        gross_amount: booking.gross_amount,
        discount_amount: booking.discount_amount,
        net_amount: booking.net_amount,
        status: booking.status,
        created_at: booking.created_at,
    }
}

/// Reject malformed selections before anything is looked up or locked.
fn validate_seat_selection(seat_ids: &[i64]) -> Result<(), ApiError> {
    if seat_ids.is_empty() {
        return Err(ApiError::validation("at least one seat must be selected"));
    }

    let mut seen = std::collections::HashSet::with_capacity(seat_ids.len());
    for &id in seat_ids {
        if id <= 0 {
            return Err(ApiError::validation("seat ids must be positive"));
        }
        if !seen.insert(id) {
            return Err(ApiError::validation(format!(
                "seat {} requested more than once",
                id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeatClass, SeatStatus, TimeSlot};
    use chrono::NaiveDate;

    fn fixture_datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 29)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    #[test]
    fn summary_is_built_without_further_lookups() {
        let show = Show {
            id: 5,
            movie_id: 2,
            theatre_id: 3,
            starts_at: fixture_datetime(),
            slot: TimeSlot::Afternoon,
            base_price: 150.0,
            total_seats: 100,
            available_seats: 97,
        };
        let booking = Booking {
            id: 11,
            reference: "BMS-1A2B3C4D".to_string(),
            user_id: 7,
            show_id: show.id,
            gross_amount: 450.0,
            discount_amount: 165.0,
            net_amount: 285.0,
            status: BookingStatus::Confirmed,
            created_at: fixture_datetime(),
        };
        let seats: Vec<Seat> = [(1, "R1"), (2, "R2"), (3, "P61")]
            .into_iter()
            .map(|(id, label)| Seat {
                id,
                show_id: show.id,
                label: label.to_string(),
                class: SeatClass::Regular,
                price: 150.0,
                status: SeatStatus::Booked,
                booking_id: Some(booking.id),
            })
            .collect();

        let summary = build_summary(
            &booking,
            &show,
            &seats,
            "Inception".to_string(),
            "PVR Cinemas".to_string(),
        );

        assert_eq!(summary.reference, "BMS-1A2B3C4D");
        assert_eq!(summary.movie_title, "Inception");
        assert_eq!(summary.theatre_name, "PVR Cinemas");
        assert_eq!(summary.seat_labels, vec!["R1", "R2", "P61"]);
        assert_eq!(summary.net_amount, 285.0);
        assert_eq!(summary.status, BookingStatus::Confirmed);
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert!(matches!(
            validate_seat_selection(&[]),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn duplicate_seat_is_rejected() {
        assert!(matches!(
            validate_seat_selection(&[1, 2, 1]),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn non_positive_id_is_rejected() {
        assert!(matches!(
            validate_seat_selection(&[3, 0]),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn distinct_positive_ids_pass() {
        assert!(validate_seat_selection(&[5, 2, 9]).is_ok());
    }
}
