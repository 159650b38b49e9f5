pub mod models;

pub use models::{
    Booking, BookingStatus, Movie, Screen, Seat, SeatCategory, SeatId, Showtime, Theater, User,
};
