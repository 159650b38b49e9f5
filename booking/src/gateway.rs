//! Payment seam. The booking flow only needs "charge this amount and tell me
//! whether it went through"; the simulated gateway waits and approves.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Draft token; doubles as the idempotency key for real gateways.
    pub token: String,
    pub user_id: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved { reference: String },
    Declined { reason: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> anyhow::Result<PaymentOutcome>;
}

/// Stand-in processor: sleeps for `delay`, then approves every charge.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    #[instrument(skip(self, request), target = "payment", fields(amount = request.amount))]
    async fn charge(&self, request: &PaymentRequest) -> anyhow::Result<PaymentOutcome> {
        tokio::time::sleep(self.delay).await;

        let reference = format!("SIM-{}", Uuid::new_v4().simple());
        debug!(%reference, "simulated charge approved");

        Ok(PaymentOutcome::Approved { reference })
    }
}
