pub mod auth;
pub mod bookings;
pub mod shows;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(shows::routes())
        .merge(bookings::routes())
}
