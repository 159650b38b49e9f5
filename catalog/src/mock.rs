//! Demo catalog written into a fresh store.
//!
//! Seat layouts are generated, not hand written: the first three rows are
//! VIP, the next three premium, the rest regular, and a share of seats starts
//! out booked so the seat map is never empty. The RNG is injected so tests
//! can pin the layout with a seed.

use corelib::{Movie, Screen, Seat, SeatCategory, Showtime, Theater};
use rand::Rng;

const ROW_LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Share of generated seats that start out booked.
pub const PREBOOKED_RATIO: f64 = 0.3;

/// Category of a seat by zero-based row index.
pub fn category_for_row(row_index: usize) -> SeatCategory {
    match row_index {
        0..=2 => SeatCategory::Vip,
        3..=5 => SeatCategory::Premium,
        _ => SeatCategory::Regular,
    }
}

/// Row-major seat grid for one screen. `rows` is capped at 26 (A..Z).
pub fn generate_seat_layout<R: Rng + ?Sized>(
    screen_id: &str,
    rows: usize,
    seats_per_row: u32,
    rng: &mut R,
) -> Vec<Vec<Seat>> {
    ROW_LABELS
        .iter()
        .take(rows)
        .enumerate()
        .map(|(i, label)| {
            let row = char::from(*label).to_string();
            let category = category_for_row(i);

            (1..=seats_per_row)
                .map(|number| Seat {
                    id: format!("{screen_id}-{row}{number}"),
                    row: row.clone(),
                    number,
                    category,
                    price: category.base_price(),
                    is_booked: rng.gen_bool(PREBOOKED_RATIO),
                    is_selected: false,
                    is_locked: false,
                })
                .collect()
        })
        .collect()
}

fn screen<R: Rng + ?Sized>(id: &str, name: &str, rows: usize, per_row: u32, rng: &mut R) -> Screen {
    Screen {
        id: id.into(),
        name: name.into(),
        capacity: rows as u32 * per_row,
        seat_layout: generate_seat_layout(id, rows, per_row, rng),
    }
}

pub fn default_theaters<R: Rng + ?Sized>(rng: &mut R) -> Vec<Theater> {
    vec![
        Theater {
            id: "t1".into(),
            name: "PVR Cinemas".into(),
            location: "Downtown Mall".into(),
            screens: vec![
                screen("s1", "Screen 1 - IMAX", 10, 10, rng),
                screen("s2", "Screen 2 - Premium", 8, 10, rng),
            ],
        },
        Theater {
            id: "t2".into(),
            name: "INOX Multiplex".into(),
            location: "City Center".into(),
            screens: vec![screen("s3", "Screen 1 - Dolby Atmos", 12, 10, rng)],
        },
    ]
}

fn showtime(id: &str, movie: &str, theater: &str, screen: &str, time: &str, price: u64) -> Showtime {
    Showtime {
        id: id.into(),
        movie_id: movie.into(),
        theater_id: theater.into(),
        screen_id: screen.into(),
        time: time.into(),
        date: "2025-01-15".into(),
        price,
    }
}

fn genres(list: &[&str]) -> Vec<String> {
    list.iter().map(|g| g.to_string()).collect()
}

pub fn default_movies() -> Vec<Movie> {
    vec![
        Movie {
            id: "1".into(),
            title: "Avatar: The Way of Water".into(),
            poster: "/images/Avatar.jpg".into(),
            genre: genres(&["Action", "Adventure", "Sci-Fi"]),
            duration: 192,
            rating: 8.5,
            description: "Set more than a decade after the events of the first film, \
                          Avatar: The Way of Water begins to tell the story of the Sully family."
                .into(),
            language: "English".into(),
            release_date: "2022-12-16".into(),
            showtimes: vec![
                showtime("st1", "1", "t1", "s1", "10:00 AM", 200),
                showtime("st2", "1", "t1", "s1", "2:00 PM", 250),
                showtime("st3", "1", "t1", "s1", "6:00 PM", 300),
            ],
        },
        Movie {
            id: "2".into(),
            title: "Top Gun: Maverick".into(),
            poster: "https://images.unsplash.com/photo-1440404653325-ab127d49abc1?w=300&h=450&fit=crop"
                .into(),
            genre: genres(&["Action", "Drama"]),
            duration: 131,
            rating: 9.0,
            description: "After thirty years, Maverick is still pushing the envelope as a top naval aviator."
                .into(),
            language: "English".into(),
            release_date: "2022-05-27".into(),
            showtimes: vec![
                showtime("st4", "2", "t1", "s2", "11:00 AM", 200),
                showtime("st5", "2", "t1", "s2", "3:00 PM", 250),
            ],
        },
        Movie {
            id: "3".into(),
            title: "Black Panther: Wakanda Forever".into(),
            poster: "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=300&h=450&fit=crop"
                .into(),
            genre: genres(&["Action", "Adventure", "Drama"]),
            duration: 161,
            rating: 8.2,
            description: "The people of Wakanda fight to protect their home from intervening world powers."
                .into(),
            language: "English".into(),
            release_date: "2022-11-11".into(),
            showtimes: vec![
                showtime("st6", "3", "t2", "s3", "1:00 PM", 220),
                showtime("st7", "3", "t2", "s3", "7:00 PM", 280),
            ],
        },
    ]
}
