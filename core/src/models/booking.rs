use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SeatId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Pending,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// A paid booking. Only `status` may change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub theater_id: String,
    pub screen_id: String,
    pub showtime_id: String,
    pub seats: Vec<SeatId>,
    /// Subtotal plus convenience fee.
    pub total_amount: u64,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl Default for User {
    /// The demo account every fresh store starts with.
    fn default() -> Self {
        Self {
            id: "user1".into(),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: "+1234567890".into(),
            bookings: Vec::new(),
        }
    }
}
