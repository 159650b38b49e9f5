use chrono::{DateTime, Utc};
use corelib::{Booking, BookingStatus, SeatId, User};
use serde::Serialize;

/// Numbers shown on the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub total_bookings: usize,
    pub total_spent: u64,
    pub confirmed: usize,
}

pub fn profile_summary(user: &User) -> ProfileSummary {
    ProfileSummary {
        total_bookings: user.bookings.len(),
        total_spent: user.bookings.iter().map(|b| b.total_amount).sum(),
        confirmed: user
            .bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count(),
    }
}

/// Bookings newest first. Ties keep their stored order reversed.
pub fn booking_history(user: &User) -> Vec<Booking> {
    let mut out: Vec<Booking> = user.bookings.iter().rev().cloned().collect();
    out.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
    out
}

/// Downloadable ticket for one booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub booking_id: String,
    pub movie_id: String,
    pub seats: Vec<SeatId>,
    pub amount: u64,
    pub date: DateTime<Utc>,
}

impl From<&Booking> for Ticket {
    fn from(b: &Booking) -> Self {
        Self {
            booking_id: b.id.clone(),
            movie_id: b.movie_id.clone(),
            seats: b.seats.clone(),
            amount: b.total_amount,
            date: b.booking_date,
        }
    }
}

pub fn ticket(user: &User, booking_id: &str) -> Option<Ticket> {
    user.bookings
        .iter()
        .find(|b| b.id == booking_id)
        .map(Ticket::from)
}
