use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SeatId;

/// Pricing tier of a seat. Serialised lowercase (`"vip"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeatCategory {
    #[default]
    Regular,
    Premium,
    Vip,
}

impl SeatCategory {
    /// Default unit price for freshly generated layouts.
    pub fn base_price(self) -> u64 {
        match self {
            SeatCategory::Vip => 400,
            SeatCategory::Premium => 300,
            SeatCategory::Regular => 200,
        }
    }
}

impl fmt::Display for SeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeatCategory::Regular => "regular",
            SeatCategory::Premium => "premium",
            SeatCategory::Vip => "vip",
        };
        f.write_str(s)
    }
}

impl FromStr for SeatCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(SeatCategory::Regular),
            "premium" => Ok(SeatCategory::Premium),
            "vip" => Ok(SeatCategory::Vip),
            other => Err(format!("invalid seat category: {other}")),
        }
    }
}

/// One seat of a screen layout.
///
/// `is_booked` is permanent and comes from the catalog. `is_selected` and
/// `is_locked` are client-local and only meaningful inside a selection
/// snapshot; the catalog always stores them as `false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: SeatId,
    pub row: String,
    pub number: u32,
    #[serde(rename = "type")]
    pub category: SeatCategory,
    pub price: u64,
    pub is_booked: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default)]
    pub is_locked: bool,
}

impl Seat {
    /// Human label such as `A7`.
    pub fn label(&self) -> String {
        format!("{}{}", self.row, self.number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub seat_layout: Vec<Vec<Seat>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Theater {
    pub id: String,
    pub name: String,
    pub location: String,
    pub screens: Vec<Screen>,
}

impl Theater {
    pub fn screen(&self, screen_id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == screen_id)
    }

    pub fn screen_mut(&mut self, screen_id: &str) -> Option<&mut Screen> {
        self.screens.iter_mut().find(|s| s.id == screen_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    pub id: String,
    pub movie_id: String,
    pub theater_id: String,
    pub screen_id: String,
    /// Display time, e.g. `6:00 PM`.
    pub time: String,
    /// Calendar date `YYYY-MM-DD`; filters compare it by exact string equality.
    pub date: String,
    pub price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub poster: String,
    pub genre: Vec<String>,
    /// Minutes.
    pub duration: u32,
    pub rating: f32,
    pub description: String,
    pub language: String,
    pub release_date: String,
    #[serde(default)]
    pub showtimes: Vec<Showtime>,
}

impl Movie {
    pub fn showtime(&self, showtime_id: &str) -> Option<&Showtime> {
        self.showtimes.iter().find(|st| st.id == showtime_id)
    }
}
