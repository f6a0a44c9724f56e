pub mod booking;
pub mod movie;
pub mod seat;
pub mod show;
pub mod theatre;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use movie::Movie;
pub use seat::{Seat, SeatClass, SeatStatus};
pub use show::{Show, TimeSlot};
pub use theatre::Theatre;
pub use user::User;
