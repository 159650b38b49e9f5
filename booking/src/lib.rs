//! Booking Finalizer
//! -----------------
//! Turns a seat selection into a paid booking in two steps:
//!
//!  1. `proceed_to_payment` writes a one-shot draft to the store.
//!  2. `confirm_payment` consumes that draft, charges the total and records
//!     the booking against the current user.
//!
//! Also exposes the profile numbers derived from the user's booking history
//! and the downloadable ticket of a single booking.

pub mod draft;
pub mod error;
pub mod finalizer;
pub mod gateway;
pub mod pricing;
pub mod profile;

pub use draft::BookingDraft;
pub use error::BookingError;
pub use finalizer::{BookingFinalizer, FinalizerConfig};
pub use gateway::{PaymentGateway, PaymentOutcome, PaymentRequest, SimulatedGateway};
pub use pricing::{DEFAULT_FEE_BPS, PriceBreakdown, convenience_fee, total_with_fee};
pub use profile::{ProfileSummary, Ticket, booking_history, profile_summary, ticket};
