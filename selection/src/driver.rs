//! Countdown driver
//!
//! Runs the hold countdown on a tokio interval against a shared selector and
//! reports what happened on an mpsc channel. The first tick fires one period
//! after the driver starts; a late tick is delayed rather than replayed, so a
//! stalled runtime never expires a hold in a burst.
//!
//! The task lives as long as its [`CountdownHandle`]. Leaving the seat page
//! means dropping the handle, which aborts the timer.

use std::sync::Arc;
use std::time::Duration;

use corelib::SeatId;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::selector::{SeatSelector, TickOutcome};

pub type SharedSelector = Arc<Mutex<SeatSelector>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { remaining: u32 },
    Expired { released: Vec<SeatId> },
}

pub struct CountdownHandle {
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub fn cancel(self) {
        // Drop does the abort.
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start ticking `selector` every `period`. Idle ticks (nothing selected)
/// emit nothing. The task stops on its own once `events` has no receiver.
pub fn spawn_countdown(
    selector: SharedSelector,
    period: Duration,
    events: mpsc::Sender<CountdownEvent>,
) -> CountdownHandle {
    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(period_ms = period.as_millis() as u64, "countdown driver started");

        loop {
            ticker.tick().await;

            // Lock only for the tick itself; never hold it across a send.
            let outcome = selector.lock().await.tick();

            let event = match outcome {
                TickOutcome::Idle => continue,
                TickOutcome::Counting { remaining } => CountdownEvent::Tick { remaining },
                TickOutcome::Expired { released } => {
                    info!(released = released.len(), "hold expired, seats released");
                    CountdownEvent::Expired { released }
                }
            };

            if events.send(event).await.is_err() {
                debug!("countdown listener gone, stopping driver");
                break;
            }
        }
    });

    CountdownHandle { task }
}
