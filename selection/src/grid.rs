use std::collections::HashMap;

use corelib::{Seat, SeatId};

/// Row-major copy of a screen layout with an id index.
///
/// The shape never changes after construction; only the per-seat
/// `is_selected` / `is_locked` flags move.
#[derive(Debug, Clone)]
pub struct SeatGrid {
    rows: Vec<Vec<Seat>>,
    index: HashMap<SeatId, (usize, usize)>,
}

impl SeatGrid {
    /// Build from a catalog layout. Selection flags are cleared because a
    /// fresh view starts with nothing selected; an incoming `is_locked` is
    /// kept and treated as a hold owned by someone else.
    pub fn new(mut rows: Vec<Vec<Seat>>) -> Self {
        let mut index = HashMap::new();

        for (r, row) in rows.iter_mut().enumerate() {
            for (c, seat) in row.iter_mut().enumerate() {
                seat.is_selected = false;
                index.insert(seat.id.clone(), (r, c));
            }
        }

        Self { rows, index }
    }

    pub fn get(&self, seat_id: &str) -> Option<&Seat> {
        let (r, c) = *self.index.get(seat_id)?;
        self.rows.get(r)?.get(c)
    }

    pub(crate) fn get_mut(&mut self, seat_id: &str) -> Option<&mut Seat> {
        let (r, c) = *self.index.get(seat_id)?;
        self.rows.get_mut(r)?.get_mut(c)
    }

    /// Look a seat up by its printed label, e.g. `B7` (case-insensitive row).
    pub fn find_by_label(&self, label: &str) -> Option<&Seat> {
        let label = label.trim();
        self.seats()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }

    pub fn rows(&self) -> &[Vec<Seat>] {
        &self.rows
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.rows.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::SeatCategory;

    fn seat(id: &str, row: &str, number: u32) -> Seat {
        Seat {
            id: id.into(),
            row: row.into(),
            number,
            category: SeatCategory::Regular,
            price: 200,
            is_booked: false,
            is_selected: true,
            is_locked: false,
        }
    }

    #[test]
    fn indexes_and_clears_selection_flags() {
        let grid = SeatGrid::new(vec![
            vec![seat("s1-A1", "A", 1), seat("s1-A2", "A", 2)],
            vec![seat("s1-B1", "B", 1)],
        ]);

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.get("s1-B1").map(|s| s.number), Some(1));
        assert!(grid.get("s1-C1").is_none());
        assert!(grid.seats().all(|s| !s.is_selected));
    }

    #[test]
    fn label_lookup_ignores_case_and_whitespace() {
        let grid = SeatGrid::new(vec![vec![seat("s1-A1", "A", 1), seat("s1-A10", "A", 10)]]);

        assert_eq!(grid.find_by_label(" a10 ").map(|s| s.id.as_str()), Some("s1-A10"));
        assert_eq!(grid.find_by_label("A1").map(|s| s.id.as_str()), Some("s1-A1"));
        assert!(grid.find_by_label("A2").is_none());
    }
}
