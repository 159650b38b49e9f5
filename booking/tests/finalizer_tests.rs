use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use booking::{
    BookingError, BookingFinalizer, FinalizerConfig, PaymentGateway, PaymentOutcome,
    PaymentRequest, SimulatedGateway,
};
use catalog::{CatalogProvider, Showing};
use corelib::{BookingStatus, SeatCategory, User};
use selection::{SeatSelector, SelectionConfig};
use store::{KvStore, MemoryStore, StoreKey, load};

///
/// Test suite for BookingFinalizer.
///
/// Every test runs against a seeded in-memory store. Payment uses the
/// simulated gateway unless a test needs a decline.
///
struct Fixture<G: PaymentGateway> {
    store: Arc<MemoryStore>,
    catalog: Arc<CatalogProvider<MemoryStore>>,
    finalizer: BookingFinalizer<MemoryStore, G>,
    showing: Showing,
}

async fn fixture_with<G: PaymentGateway>(gateway: G) -> anyhow::Result<Fixture<G>> {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(CatalogProvider::open(store.clone(), Some(42)).await?);
    let showing = catalog.resolve_showing("1", "st1").await?;

    let finalizer = BookingFinalizer::new(
        store.clone(),
        catalog.clone(),
        Arc::new(gateway),
        FinalizerConfig::default(),
    );

    Ok(Fixture {
        store,
        catalog,
        finalizer,
        showing,
    })
}

async fn fixture() -> anyhow::Result<Fixture<SimulatedGateway>> {
    fixture_with(SimulatedGateway::new(Duration::ZERO)).await
}

/// First `n` free seats of `category` on the showing's screen.
fn free_seats(showing: &Showing, category: SeatCategory, n: usize) -> Vec<String> {
    showing
        .screen
        .seat_layout
        .iter()
        .flatten()
        .filter(|s| !s.is_booked && s.category == category)
        .take(n)
        .map(|s| s.id.clone())
        .collect()
}

/// Selector holding two VIP seats and one regular seat: subtotal 1000.
fn thousand_selection(showing: &Showing) -> SeatSelector {
    let mut sel = SeatSelector::for_showing(showing, SelectionConfig::default());
    let mut seats = free_seats(showing, SeatCategory::Vip, 2);
    seats.extend(free_seats(showing, SeatCategory::Regular, 1));
    for id in &seats {
        sel.toggle_seat(id);
    }
    sel
}

struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn charge(&self, _: &PaymentRequest) -> anyhow::Result<PaymentOutcome> {
        Ok(PaymentOutcome::Declined {
            reason: "insufficient funds".into(),
        })
    }
}

#[tokio::test]
async fn empty_selection_writes_no_draft() -> anyhow::Result<()> {
    let fx = fixture().await?;
    let sel = SeatSelector::for_showing(&fx.showing, SelectionConfig::default());

    let res = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await;

    assert!(matches!(res, Err(BookingError::EmptySelection)));
    assert!(fx.store.get(StoreKey::CurrentBooking).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn draft_carries_ids_subtotal_and_display_fields() -> anyhow::Result<()> {
    let fx = fixture().await?;
    let sel = thousand_selection(&fx.showing);

    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;

    assert_eq!(draft.subtotal(), 1_000);
    assert_eq!(draft.selected_seats, sel.snapshot().seat_ids());
    assert_eq!(draft.movie, "Avatar: The Way of Water");
    assert_eq!(draft.theater, "PVR Cinemas");
    assert_eq!(draft.showtime, "10:00 AM");
    assert_eq!(draft.date, "2025-01-15");
    assert_eq!((draft.theater_id.as_str(), draft.screen_id.as_str()), ("t1", "s1"));

    assert_eq!(fx.finalizer.current_draft().await?, Some(draft.clone()));

    let price = fx.finalizer.price(&draft);
    assert_eq!((price.convenience_fee, price.total), (100, 1_100));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn confirmed_booking_charges_fee_and_updates_user_and_seats() -> anyhow::Result<()> {
    let fx = fixture_with(SimulatedGateway::default()).await?;
    let sel = thousand_selection(&fx.showing);
    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;

    let started = tokio::time::Instant::now();
    let booking = fx.finalizer.confirm_payment(&draft.token).await?;
    assert!(started.elapsed() >= Duration::from_secs(3));

    assert!(booking.id.starts_with("BMS"));
    assert_eq!(booking.total_amount, 1_100);
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.user_id, "user1");
    assert_eq!(booking.seats, draft.selected_seats);
    assert_eq!(booking.theater_id, "t1");
    assert_eq!(booking.screen_id, "s1");

    let user: User = load(&*fx.store, StoreKey::CurrentUser).await?.unwrap();
    assert_eq!(user.bookings, vec![booking.clone()]);
    assert!(fx.finalizer.current_draft().await?.is_none());

    let screen = fx.catalog.resolve_showing("1", "st1").await?.screen;
    for id in &booking.seats {
        let seat = screen.seat_layout.iter().flatten().find(|s| &s.id == id).unwrap();
        assert!(seat.is_booked, "{id} should be booked");
    }

    Ok(())
}

#[tokio::test]
async fn confirming_twice_books_once() -> anyhow::Result<()> {
    let fx = fixture().await?;
    let sel = thousand_selection(&fx.showing);
    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;

    fx.finalizer.confirm_payment(&draft.token).await?;
    let again = fx.finalizer.confirm_payment(&draft.token).await;

    assert!(matches!(again, Err(BookingError::DraftNotFound)));
    assert_eq!(fx.finalizer.booking_history().await?.len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn racing_confirmations_book_once() -> anyhow::Result<()> {
    let fx = fixture_with(SimulatedGateway::default()).await?;
    let sel = thousand_selection(&fx.showing);
    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;

    let (a, b) = tokio::join!(
        fx.finalizer.confirm_payment(&draft.token),
        fx.finalizer.confirm_payment(&draft.token),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    assert_eq!(fx.finalizer.profile_summary().await?.total_bookings, 1);
    Ok(())
}

#[tokio::test]
async fn stale_token_leaves_current_draft_alone() -> anyhow::Result<()> {
    let fx = fixture().await?;
    let sel = thousand_selection(&fx.showing);

    let first = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;
    let second = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;
    assert_ne!(first.token, second.token);

    let res = fx.finalizer.confirm_payment(&first.token).await;
    assert!(matches!(res, Err(BookingError::DraftTokenMismatch(_))));

    assert_eq!(fx.finalizer.current_draft().await?, Some(second.clone()));
    fx.finalizer.confirm_payment(&second.token).await?;
    Ok(())
}

#[tokio::test]
async fn declined_payment_records_nothing() -> anyhow::Result<()> {
    let fx = fixture_with(DecliningGateway).await?;
    let sel = thousand_selection(&fx.showing);
    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;

    let res = fx.finalizer.confirm_payment(&draft.token).await;

    assert!(matches!(res, Err(BookingError::PaymentDeclined(r)) if r == "insufficient funds"));
    assert!(fx.finalizer.booking_history().await?.is_empty());

    let screen = fx.catalog.resolve_showing("1", "st1").await?.screen;
    assert!(
        screen
            .seat_layout
            .iter()
            .flatten()
            .filter(|s| draft.selected_seats.contains(&s.id))
            .all(|s| !s.is_booked)
    );
    Ok(())
}

#[tokio::test]
async fn missing_user_falls_back_to_default_account() -> anyhow::Result<()> {
    let fx = fixture().await?;
    fx.store.delete(StoreKey::CurrentUser).await?;

    let sel = thousand_selection(&fx.showing);
    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;
    fx.finalizer.confirm_payment(&draft.token).await?;

    let user: User = load(&*fx.store, StoreKey::CurrentUser).await?.unwrap();
    assert_eq!(user.id, "user1");
    assert_eq!(user.bookings.len(), 1);
    Ok(())
}

#[tokio::test]
async fn profile_summary_tracks_bookings() -> anyhow::Result<()> {
    let fx = fixture().await?;

    for _ in 0..2 {
        let sel = {
            // Fresh view each time so seats booked by the previous round are skipped.
            let showing = fx.catalog.resolve_showing("1", "st1").await?;
            let mut sel = SeatSelector::for_showing(&showing, SelectionConfig::default());
            let id = free_seats(&showing, SeatCategory::Regular, 1).remove(0);
            sel.toggle_seat(&id);
            (showing, sel)
        };
        let draft = fx.finalizer.proceed_to_payment(&sel.0, &sel.1.snapshot()).await?;
        fx.finalizer.confirm_payment(&draft.token).await?;
    }

    let summary = fx.finalizer.profile_summary().await?;
    assert_eq!(summary.total_bookings, 2);
    assert_eq!(summary.total_spent, 440);
    assert_eq!(summary.confirmed, 2);
    Ok(())
}

#[tokio::test]
async fn second_selector_on_the_same_seat_cannot_book_it() -> anyhow::Result<()> {
    let fx = fixture().await?;
    let seat = free_seats(&fx.showing, SeatCategory::Vip, 1).remove(0);

    // Both selectors were opened on the same view of the showing.
    let mut first = SeatSelector::for_showing(&fx.showing, SelectionConfig::default());
    let mut second = SeatSelector::for_showing(&fx.showing, SelectionConfig::default());
    first.toggle_seat(&seat);
    second.toggle_seat(&seat);

    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &first.snapshot()).await?;
    fx.finalizer.confirm_payment(&draft.token).await?;

    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &second.snapshot()).await?;
    let res = fx.finalizer.confirm_payment(&draft.token).await;

    assert!(matches!(res, Err(BookingError::SeatsUnavailable(ids)) if ids == vec![seat.clone()]));
    assert_eq!(fx.finalizer.booking_history().await?.len(), 1);
    assert!(fx.finalizer.current_draft().await?.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn seat_with_payment_in_flight_cannot_be_claimed_again() -> anyhow::Result<()> {
    let fx = fixture_with(SimulatedGateway::default()).await?;
    let seat = free_seats(&fx.showing, SeatCategory::Premium, 1).remove(0);

    let mut first = SeatSelector::for_showing(&fx.showing, SelectionConfig::default());
    first.toggle_seat(&seat);
    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &first.snapshot()).await?;

    let late = async {
        // Starts while the first payment is still being processed.
        tokio::time::sleep(Duration::from_secs(1)).await;
        let mut second = SeatSelector::for_showing(&fx.showing, SelectionConfig::default());
        second.toggle_seat(&seat);
        let draft = fx.finalizer.proceed_to_payment(&fx.showing, &second.snapshot()).await?;
        Ok::<_, BookingError>(fx.finalizer.confirm_payment(&draft.token).await)
    };

    let (a, b) = tokio::join!(fx.finalizer.confirm_payment(&draft.token), late);

    assert_eq!(a?.seats, vec![seat.clone()]);
    assert!(matches!(b?, Err(BookingError::SeatsUnavailable(ids)) if ids == vec![seat.clone()]));
    assert_eq!(fx.finalizer.profile_summary().await?.total_bookings, 1);
    Ok(())
}

#[tokio::test]
async fn seat_released_by_a_declined_payment_stays_bookable() -> anyhow::Result<()> {
    let declined = fixture_with(DecliningGateway).await?;
    let sel = thousand_selection(&declined.showing);
    let draft = declined.finalizer.proceed_to_payment(&declined.showing, &sel.snapshot()).await?;
    assert!(declined.finalizer.confirm_payment(&draft.token).await.is_err());

    // Same store, working gateway: the seats were never left in flight.
    let finalizer = BookingFinalizer::new(
        declined.store.clone(),
        declined.catalog.clone(),
        Arc::new(SimulatedGateway::new(Duration::ZERO)),
        FinalizerConfig::default(),
    );
    let draft = finalizer.proceed_to_payment(&declined.showing, &sel.snapshot()).await?;
    let booking = finalizer.confirm_payment(&draft.token).await?;

    assert_eq!(booking.total_amount, 1_100);
    Ok(())
}

#[tokio::test]
async fn ticket_is_available_for_a_confirmed_booking_only() -> anyhow::Result<()> {
    let fx = fixture().await?;
    let sel = thousand_selection(&fx.showing);
    let draft = fx.finalizer.proceed_to_payment(&fx.showing, &sel.snapshot()).await?;
    let booking = fx.finalizer.confirm_payment(&draft.token).await?;

    let ticket = fx.finalizer.ticket(&booking.id).await?.unwrap();
    assert_eq!(ticket.booking_id, booking.id);
    assert_eq!(ticket.movie_id, "1");
    assert_eq!(ticket.seats, booking.seats);
    assert_eq!(ticket.amount, 1_100);
    assert_eq!(ticket.date, booking.booking_date);

    assert!(fx.finalizer.ticket("BMSmissing").await?.is_none());
    Ok(())
}
