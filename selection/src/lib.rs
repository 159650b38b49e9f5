//! Seat Selection Engine
//! ---------------------
//! Client-side seat selection for one screen view: which seats are held,
//! how long the hold lasts, what the held seats cost and how each seat
//! should be drawn.
//!
//! The engine itself is synchronous and owns no timer. `driver` runs the
//! one-second countdown on a tokio interval against a shared selector.

pub mod countdown;
pub mod driver;
pub mod grid;
pub mod selector;

pub use countdown::Countdown;
pub use driver::{CountdownEvent, CountdownHandle, SharedSelector, spawn_countdown};
pub use grid::SeatGrid;
pub use selector::{
    IgnoreReason, SeatColor, SeatSelector, SelectionConfig, SelectionSnapshot, TickOutcome,
    ToggleOutcome,
};
