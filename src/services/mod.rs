pub mod booking;
pub mod browsing;
pub mod discount;
pub mod inventory;
pub mod seed;
