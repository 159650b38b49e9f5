//! SeatSelector
//!
//! Owns the selection set and the hold countdown for one screen view.
//! Responsibilities:
//!   • Toggle seats in and out of the selection, enforcing the seat cap
//!   • Keep booked and foreign-held seats out of the selection
//!   • Count the hold down and release everything when it runs out
//!   • Price the selection and classify seats for drawing
//!
//! A seat moves `Available → Selected → Available` (deselect or expiry).
//! `Booked` comes from the catalog and is terminal here.

use std::fmt;

use catalog::Showing;
use corelib::{Seat, SeatCategory, SeatId};
use serde::Serialize;
use tracing::{debug, info};

use crate::countdown::Countdown;
use crate::grid::SeatGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Maximum seats one client may hold at once.
    pub max_seats: usize,
    /// Length of a hold in seconds (one tick per second).
    pub hold_seconds: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_seats: 10,
            hold_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownSeat,
    Booked,
    LockedByOther,
    SelectionCapExceeded,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IgnoreReason::UnknownSeat => "no such seat on this screen",
            IgnoreReason::Booked => "already booked",
            IgnoreReason::LockedByOther => "held by someone else",
            IgnoreReason::SelectionCapExceeded => "seat limit reached",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Nothing changed.
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing held; the countdown did not move.
    Idle,
    Counting { remaining: u32 },
    /// The hold ran out and these seats were released.
    Expired { released: Vec<SeatId> },
}

/// How a seat is drawn, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatColor {
    Booked,
    Selected,
    LockedByOther,
    Vip,
    Premium,
    Regular,
}

impl SeatColor {
    /// One-character cell for the terminal seat map.
    pub fn symbol(self) -> char {
        match self {
            SeatColor::Booked => 'X',
            SeatColor::Selected => '*',
            SeatColor::LockedByOther => '!',
            SeatColor::Vip => 'V',
            SeatColor::Premium => 'P',
            SeatColor::Regular => 'o',
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            SeatColor::Booked => "booked",
            SeatColor::Selected => "selected",
            SeatColor::LockedByOther => "locked",
            SeatColor::Vip => "vip",
            SeatColor::Premium => "premium",
            SeatColor::Regular => "available",
        }
    }
}

/// Read-only view handed to rendering and to the booking step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub seat_layout: Vec<Vec<Seat>>,
    /// Selected seats in the order they were picked.
    pub selected: Vec<Seat>,
    pub seconds_remaining: u32,
    pub subtotal: u64,
}

impl SelectionSnapshot {
    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.selected.iter().map(|s| s.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SeatSelector {
    grid: SeatGrid,
    selected: Vec<SeatId>,
    countdown: Countdown,
    config: SelectionConfig,
}

impl SeatSelector {
    pub fn new(layout: Vec<Vec<Seat>>, config: SelectionConfig) -> Self {
        Self {
            grid: SeatGrid::new(layout),
            selected: Vec::new(),
            countdown: Countdown::new(config.hold_seconds),
            config,
        }
    }

    pub fn for_showing(showing: &Showing, config: SelectionConfig) -> Self {
        Self::new(showing.screen.seat_layout.clone(), config)
    }

    pub fn config(&self) -> SelectionConfig {
        self.config
    }

    pub fn grid(&self) -> &SeatGrid {
        &self.grid
    }

    pub fn selected_ids(&self) -> &[SeatId] {
        &self.selected
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    fn is_mine(&self, seat_id: &str) -> bool {
        self.selected.iter().any(|id| id == seat_id)
    }

    pub fn toggle_seat(&mut self, seat_id: &str) -> ToggleOutcome {
        let Some((booked, locked)) = self.grid.get(seat_id).map(|s| (s.is_booked, s.is_locked))
        else {
            return ToggleOutcome::Ignored(IgnoreReason::UnknownSeat);
        };

        if booked {
            return ToggleOutcome::Ignored(IgnoreReason::Booked);
        }

        if self.is_mine(seat_id) {
            self.selected.retain(|id| id != seat_id);
            self.set_held(seat_id, false);
            debug!(seat_id, held = self.selected.len(), "seat deselected");
            return ToggleOutcome::Deselected;
        }

        if locked {
            return ToggleOutcome::Ignored(IgnoreReason::LockedByOther);
        }

        if self.selected.len() >= self.config.max_seats {
            debug!(seat_id, cap = self.config.max_seats, "selection cap reached");
            return ToggleOutcome::Ignored(IgnoreReason::SelectionCapExceeded);
        }

        if self.selected.is_empty() {
            self.countdown.restart();
        }

        self.selected.push(seat_id.to_string());
        self.set_held(seat_id, true);
        debug!(seat_id, held = self.selected.len(), "seat selected");

        ToggleOutcome::Selected
    }

    /// Advance the hold by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.selected.is_empty() {
            return TickOutcome::Idle;
        }

        if self.countdown.tick() {
            let released = self.release_all();
            info!(released = released.len(), "seat hold expired");
            return TickOutcome::Expired { released };
        }

        TickOutcome::Counting {
            remaining: self.countdown.remaining(),
        }
    }

    /// Drop the selection and every lock it holds. Returns the released ids.
    pub fn release_all(&mut self) -> Vec<SeatId> {
        let released = std::mem::take(&mut self.selected);
        for id in &released {
            self.set_held(id, false);
        }
        self.countdown.restart();
        released
    }

    pub fn compute_subtotal(&self) -> u64 {
        self.selected
            .iter()
            .filter_map(|id| self.grid.get(id))
            .map(|s| s.price)
            .sum()
    }

    /// Classification for drawing. The grid's copy of the seat wins over the
    /// flags on `seat` when the seat belongs to this view.
    pub fn color_class_for(&self, seat: &Seat) -> SeatColor {
        let current = self.grid.get(&seat.id).unwrap_or(seat);

        if current.is_booked {
            return SeatColor::Booked;
        }
        if self.is_mine(&current.id) {
            return SeatColor::Selected;
        }
        if current.is_locked {
            return SeatColor::LockedByOther;
        }

        match current.category {
            SeatCategory::Vip => SeatColor::Vip,
            SeatCategory::Premium => SeatColor::Premium,
            SeatCategory::Regular => SeatColor::Regular,
        }
    }

    pub fn seat_id_for_label(&self, label: &str) -> Option<SeatId> {
        self.grid.find_by_label(label).map(|s| s.id.clone())
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            seat_layout: self.grid.rows().to_vec(),
            selected: self
                .selected
                .iter()
                .filter_map(|id| self.grid.get(id).cloned())
                .collect(),
            seconds_remaining: self.countdown.remaining(),
            subtotal: self.compute_subtotal(),
        }
    }

    fn set_held(&mut self, seat_id: &str, held: bool) {
        if let Some(seat) = self.grid.get_mut(seat_id) {
            seat.is_selected = held;
            seat.is_locked = held;
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// 6x6 grid where `booked` picks which seats start booked.
    fn grid(booked: &[bool]) -> Vec<Vec<Seat>> {
        (0..6)
            .map(|r| {
                let row = char::from(b'A' + r as u8).to_string();
                (1..=6u32)
                    .map(|n| {
                        let i = r * 6 + (n as usize - 1);
                        let category = if r < 3 { SeatCategory::Vip } else { SeatCategory::Regular };
                        Seat {
                            id: format!("s1-{row}{n}"),
                            row: row.clone(),
                            number: n,
                            category,
                            price: category.base_price(),
                            is_booked: booked.get(i).copied().unwrap_or(false),
                            is_selected: false,
                            is_locked: false,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn seat_id(i: usize) -> String {
        let row = char::from(b'A' + (i / 6) as u8);
        format!("s1-{}{}", row, i % 6 + 1)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]
        #[test]
        fn selection_invariants_hold_for_any_toggle_sequence(
            booked in prop::collection::vec(any::<bool>(), 36),
            toggles in prop::collection::vec(0..40usize, 0..80),
        ) {
            let mut sel = SeatSelector::new(grid(&booked), SelectionConfig::default());

            for t in toggles {
                sel.toggle_seat(&seat_id(t));

                prop_assert!(sel.selected_ids().len() <= 10);

                for id in sel.selected_ids() {
                    prop_assert!(!sel.grid().get(id).unwrap().is_booked);
                }

                let expected: u64 = sel
                    .selected_ids()
                    .iter()
                    .map(|id| sel.grid().get(id).unwrap().price)
                    .sum();
                prop_assert_eq!(sel.compute_subtotal(), expected);
            }
        }

        #[test]
        fn toggling_twice_restores_selection(
            prefix in prop::collection::vec(0..36usize, 0..9),
            target in 0..36usize,
        ) {
            let mut sel = SeatSelector::new(grid(&[]), SelectionConfig::default());
            for p in prefix {
                sel.toggle_seat(&seat_id(p));
            }

            let mut before: Vec<SeatId> = sel.selected_ids().to_vec();
            sel.toggle_seat(&seat_id(target));
            sel.toggle_seat(&seat_id(target));
            let mut after: Vec<SeatId> = sel.selected_ids().to_vec();

            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn full_hold_of_ticks_always_expires(
            picks in prop::collection::vec(0..36usize, 1..10),
            hold in 1..400u32,
        ) {
            let config = SelectionConfig { hold_seconds: hold, ..SelectionConfig::default() };
            let mut sel = SeatSelector::new(grid(&[]), config);
            for p in &picks {
                sel.toggle_seat(&seat_id(*p));
            }
            prop_assume!(!sel.selected_ids().is_empty());

            for _ in 0..hold {
                sel.tick();
            }

            prop_assert!(sel.selected_ids().is_empty());
            prop_assert_eq!(sel.seconds_remaining(), hold);
        }
    }
}
