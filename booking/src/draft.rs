use catalog::Showing;
use chrono::{DateTime, Utc};
use corelib::SeatId;
use selection::SelectionSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// In-progress booking stored under `currentBooking` between seat selection
/// and payment. The token makes confirmation one-shot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub token: String,
    pub movie_id: String,
    pub theater_id: String,
    pub screen_id: String,
    pub showtime_id: String,
    pub selected_seats: Vec<SeatId>,
    /// Sum of seat prices, before the convenience fee.
    pub total_amount: u64,

    // Display fields for the payment page.
    pub movie: String,
    pub theater: String,
    pub showtime: String,
    pub date: String,

    pub created_at: DateTime<Utc>,
}

impl BookingDraft {
    /// `None` when nothing is selected.
    pub fn from_selection(showing: &Showing, snapshot: &SelectionSnapshot) -> Option<Self> {
        if snapshot.is_empty() {
            return None;
        }

        Some(Self {
            token: Uuid::new_v4().to_string(),
            movie_id: showing.movie.id.clone(),
            theater_id: showing.theater.id.clone(),
            screen_id: showing.screen.id.clone(),
            showtime_id: showing.showtime.id.clone(),
            selected_seats: snapshot.seat_ids(),
            total_amount: snapshot.subtotal,
            movie: showing.movie.title.clone(),
            theater: showing.theater.name.clone(),
            showtime: showing.showtime.time.clone(),
            date: showing.showtime.date.clone(),
            created_at: Utc::now(),
        })
    }

    pub fn subtotal(&self) -> u64 {
        self.total_amount
    }
}
