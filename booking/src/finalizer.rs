//! BookingFinalizer
//!
//! Responsibilities:
//!   • Write the booking draft when the user proceeds to payment
//!   • Consume the draft exactly once on confirmation
//!   • Charge the total through the payment gateway
//!   • Append the booking to the current user and mark the seats booked
//!
//! The draft is taken out of the store under `lock` before the payment
//! await, so two confirmations racing on the same draft can produce at most
//! one charge and one booking. In the same critical section the draft's
//! seats are checked against the catalog and against seats whose payment is
//! still in flight; a seat booked since the selection was made fails the
//! confirmation before any charge. A declined payment leaves no draft
//! behind; the user selects seats again.

use std::collections::HashSet;
use std::sync::Arc;

use catalog::{CatalogProvider, Showing};
use chrono::Utc;
use common::{annotate_span, child_span};
use corelib::{Booking, BookingStatus, SeatId, User};
use selection::SelectionSnapshot;
use store::{KvStore, StoreKey, load, save};
use tokio::sync::Mutex;
use tracing::{Instrument, info, instrument, warn};
use uuid::Uuid;

use crate::draft::BookingDraft;
use crate::error::BookingError;
use crate::gateway::{PaymentGateway, PaymentOutcome, PaymentRequest};
use crate::pricing::{DEFAULT_FEE_BPS, PriceBreakdown};
use crate::profile::{ProfileSummary, Ticket, booking_history, profile_summary, ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizerConfig {
    /// Convenience fee in basis points of the subtotal.
    pub fee_bps: u32,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}

pub struct BookingFinalizer<S: ?Sized, G: ?Sized> {
    store: Arc<S>,
    catalog: Arc<CatalogProvider<S>>,
    gateway: Arc<G>,
    config: FinalizerConfig,
    /// Serialises store writes; holds the seats whose payment is in flight.
    lock: Mutex<HashSet<SeatId>>,
}

impl<S, G> BookingFinalizer<S, G>
where
    S: KvStore + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        catalog: Arc<CatalogProvider<S>>,
        gateway: Arc<G>,
        config: FinalizerConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            gateway,
            config,
            lock: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> FinalizerConfig {
        self.config
    }

    /// Persist the current selection as the booking draft, replacing any
    /// earlier draft. Nothing is written for an empty selection.
    #[instrument(skip_all, target = "booking", fields(showtime_id = %showing.showtime.id))]
    pub async fn proceed_to_payment(
        &self,
        showing: &Showing,
        snapshot: &SelectionSnapshot,
    ) -> Result<BookingDraft, BookingError> {
        let draft =
            BookingDraft::from_selection(showing, snapshot).ok_or(BookingError::EmptySelection)?;

        let _guard = self.lock.lock().await;
        save(&*self.store, StoreKey::CurrentBooking, &draft).await?;

        info!(
            seats = draft.selected_seats.len(),
            subtotal = draft.total_amount,
            "booking draft saved"
        );
        Ok(draft)
    }

    pub async fn current_draft(&self) -> Result<Option<BookingDraft>, BookingError> {
        Ok(load(&*self.store, StoreKey::CurrentBooking).await?)
    }

    pub fn price(&self, draft: &BookingDraft) -> PriceBreakdown {
        PriceBreakdown::new(draft.subtotal(), self.config.fee_bps)
    }

    /// Pay for the draft identified by `token` and record the booking.
    pub async fn confirm_payment(&self, token: &str) -> Result<Booking, BookingError> {
        let span = child_span("confirm_payment");
        self.confirm_inner(token).instrument(span).await
    }

    async fn confirm_inner(&self, token: &str) -> Result<Booking, BookingError> {
        let draft = self.claim_draft(token).await?;
        annotate_span(&draft.showtime_id, Some(draft.selected_seats.len()));

        let seats = draft.selected_seats.clone();
        let result = self.pay_and_record(draft).await;

        let mut in_flight = self.lock.lock().await;
        for id in &seats {
            in_flight.remove(id);
        }

        result
    }

    async fn pay_and_record(&self, draft: BookingDraft) -> Result<Booking, BookingError> {
        let user = self.current_user().await?;
        let price = self.price(&draft);

        let request = PaymentRequest {
            token: draft.token.clone(),
            user_id: user.id.clone(),
            amount: price.total,
        };

        match self.gateway.charge(&request).await {
            Ok(PaymentOutcome::Approved { reference }) => {
                info!(%reference, total = price.total, "payment approved");
            }
            Ok(PaymentOutcome::Declined { reason }) => {
                warn!(%reason, "payment declined");
                return Err(BookingError::PaymentDeclined(reason));
            }
            Err(e) => {
                warn!(error = ?e, "payment gateway failed");
                return Err(BookingError::PaymentDeclined(e.to_string()));
            }
        }

        let booking = Booking {
            id: format!("BMS{}", Uuid::new_v4().simple()),
            user_id: user.id,
            movie_id: draft.movie_id,
            theater_id: draft.theater_id,
            screen_id: draft.screen_id,
            showtime_id: draft.showtime_id,
            seats: draft.selected_seats,
            total_amount: price.total,
            booking_date: Utc::now(),
            status: BookingStatus::Confirmed,
        };

        self.record(&booking).await?;

        info!(booking_id = %booking.id, "booking confirmed");
        Ok(booking)
    }

    /// Remove and return the draft if `token` matches it, and mark its seats
    /// as in flight. A draft whose seats are booked, or being paid for by
    /// another confirmation, is consumed and rejected.
    async fn claim_draft(&self, token: &str) -> Result<BookingDraft, BookingError> {
        let mut in_flight = self.lock.lock().await;

        let draft: BookingDraft = load(&*self.store, StoreKey::CurrentBooking)
            .await?
            .ok_or(BookingError::DraftNotFound)?;

        if draft.token != token {
            return Err(BookingError::DraftTokenMismatch(token.to_string()));
        }

        self.store.delete(StoreKey::CurrentBooking).await?;

        let mut taken = self
            .catalog
            .unavailable_seats(&draft.theater_id, &draft.screen_id, &draft.selected_seats)
            .await?;
        for id in &draft.selected_seats {
            if in_flight.contains(id) && !taken.contains(id) {
                taken.push(id.clone());
            }
        }

        if !taken.is_empty() {
            warn!(seats = ?taken, "selected seats were booked meanwhile");
            return Err(BookingError::SeatsUnavailable(taken));
        }

        in_flight.extend(draft.selected_seats.iter().cloned());
        Ok(draft)
    }

    async fn record(&self, booking: &Booking) -> Result<(), BookingError> {
        {
            let _guard = self.lock.lock().await;
            let mut user = self.current_user().await?;
            user.bookings.push(booking.clone());
            save(&*self.store, StoreKey::CurrentUser, &user).await?;
        }

        self.catalog
            .mark_seats_booked(&booking.theater_id, &booking.screen_id, &booking.seats)
            .await?;

        Ok(())
    }

    /// The stored user, or the demo user with no history.
    pub async fn current_user(&self) -> Result<User, BookingError> {
        Ok(load(&*self.store, StoreKey::CurrentUser)
            .await?
            .unwrap_or_default())
    }

    pub async fn booking_history(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(booking_history(&self.current_user().await?))
    }

    pub async fn profile_summary(&self) -> Result<ProfileSummary, BookingError> {
        Ok(profile_summary(&self.current_user().await?))
    }

    /// Ticket of one of the current user's bookings.
    pub async fn ticket(&self, booking_id: &str) -> Result<Option<Ticket>, BookingError> {
        Ok(ticket(&self.current_user().await?, booking_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::SimulatedGateway;
    use selection::{SeatSelector, SelectionConfig};
    use std::time::Duration;
    use store::MemoryStore;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn draft_write_is_logged_with_seat_count() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let catalog = Arc::new(CatalogProvider::open(store.clone(), Some(3)).await?);
        let finalizer = BookingFinalizer::new(
            store,
            catalog.clone(),
            Arc::new(SimulatedGateway::new(Duration::ZERO)),
            FinalizerConfig::default(),
        );

        let showing = catalog.resolve_showing("3", "st6").await?;
        let mut selector = SeatSelector::for_showing(&showing, SelectionConfig::default());
        let free = selector
            .grid()
            .seats()
            .find(|s| !s.is_booked)
            .map(|s| s.id.clone())
            .ok_or_else(|| anyhow::anyhow!("no free seat"))?;
        selector.toggle_seat(&free);

        finalizer.proceed_to_payment(&showing, &selector.snapshot()).await?;

        assert!(logs_contain("booking draft saved"));
        assert!(logs_contain("seats=1"));
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn confirmation_events_carry_showtime_and_seat_count() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let catalog = Arc::new(CatalogProvider::open(store.clone(), Some(3)).await?);
        let finalizer = BookingFinalizer::new(
            store,
            catalog.clone(),
            Arc::new(SimulatedGateway::new(Duration::ZERO)),
            FinalizerConfig::default(),
        );

        let showing = catalog.resolve_showing("3", "st6").await?;
        let mut selector = SeatSelector::for_showing(&showing, SelectionConfig::default());
        let free: Vec<_> = selector
            .grid()
            .seats()
            .filter(|s| !s.is_booked)
            .take(2)
            .map(|s| s.id.clone())
            .collect();
        for id in &free {
            selector.toggle_seat(id);
        }

        let draft = finalizer.proceed_to_payment(&showing, &selector.snapshot()).await?;
        finalizer.confirm_payment(&draft.token).await?;

        assert!(logs_contain("booking confirmed"));
        assert!(logs_contain("showtime_id=st6"));
        assert!(logs_contain("seat_count=2"));
        Ok(())
    }
}
