use std::sync::Arc;
use std::time::Duration;

use corelib::{Seat, SeatCategory};
use selection::{
    CountdownEvent, SeatSelector, SelectionConfig, SharedSelector, spawn_countdown,
};
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, timeout};

fn shared(hold_seconds: u32) -> SharedSelector {
    let row = (1..=4)
        .map(|n| Seat {
            id: format!("s1-A{n}"),
            row: "A".into(),
            number: n,
            category: SeatCategory::Vip,
            price: 400,
            is_booked: false,
            is_selected: false,
            is_locked: false,
        })
        .collect();

    let config = SelectionConfig {
        hold_seconds,
        ..SelectionConfig::default()
    };
    Arc::new(Mutex::new(SeatSelector::new(vec![row], config)))
}

#[tokio::test(start_paused = true)]
async fn hold_expires_after_full_period() -> anyhow::Result<()> {
    let sel = shared(300);
    sel.lock().await.toggle_seat("s1-A1");

    let (tx, mut rx) = mpsc::channel(16);
    let start = Instant::now();
    let _handle = spawn_countdown(sel.clone(), Duration::from_secs(1), tx);

    let mut ticks = 0;
    let released = loop {
        match rx.recv().await {
            Some(CountdownEvent::Tick { remaining }) => {
                ticks += 1;
                assert_eq!(remaining, 300 - ticks);
            }
            Some(CountdownEvent::Expired { released }) => break released,
            None => anyhow::bail!("driver stopped early"),
        }
    };

    assert_eq!(ticks, 299);
    assert_eq!(released, vec!["s1-A1"]);
    assert_eq!(start.elapsed(), Duration::from_secs(300));

    let guard = sel.lock().await;
    assert!(guard.selected_ids().is_empty());
    assert_eq!(guard.seconds_remaining(), 300);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn idle_selector_emits_nothing() {
    let sel = shared(5);
    let (tx, mut rx) = mpsc::channel(4);
    let _handle = spawn_countdown(sel, Duration::from_secs(1), tx);

    let waited = timeout(Duration::from_secs(30), rx.recv()).await;
    assert!(waited.is_err(), "no event expected while nothing is held");
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_the_timer() -> anyhow::Result<()> {
    let sel = shared(5);
    sel.lock().await.toggle_seat("s1-A2");

    let (tx, mut rx) = mpsc::channel(4);
    let handle = spawn_countdown(sel.clone(), Duration::from_secs(1), tx);

    assert_eq!(rx.recv().await, Some(CountdownEvent::Tick { remaining: 4 }));

    handle.cancel();

    // The aborted task drops its sender, closing the channel.
    assert_eq!(rx.recv().await, None);

    tokio::time::advance(Duration::from_secs(10)).await;
    let guard = sel.lock().await;
    assert_eq!(guard.selected_ids(), ["s1-A2"]);
    assert_eq!(guard.seconds_remaining(), 4);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn selecting_later_starts_the_hold_fresh() -> anyhow::Result<()> {
    let sel = shared(3);
    let (tx, mut rx) = mpsc::channel(4);
    let _handle = spawn_countdown(sel.clone(), Duration::from_secs(1), tx);

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    sel.lock().await.toggle_seat("s1-A3");

    assert_eq!(rx.recv().await, Some(CountdownEvent::Tick { remaining: 2 }));
    assert_eq!(rx.recv().await, Some(CountdownEvent::Tick { remaining: 1 }));
    assert_eq!(
        rx.recv().await,
        Some(CountdownEvent::Expired {
            released: vec!["s1-A3".into()]
        })
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn driver_stops_when_listener_is_dropped() {
    let sel = shared(100);
    sel.lock().await.toggle_seat("s1-A4");

    let (tx, rx) = mpsc::channel(1);
    let handle = spawn_countdown(sel, Duration::from_secs(1), tx);
    drop(rx);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(handle.is_finished());
}
