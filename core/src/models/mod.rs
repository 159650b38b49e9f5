pub mod booking;
pub mod catalog;

pub use booking::{Booking, BookingStatus, User};
pub use catalog::{Movie, Screen, Seat, SeatCategory, Showtime, Theater};

/// Seat identifiers are `"{screen_id}-{row}{number}"`, e.g. `s1-A7`.
pub type SeatId = String;
