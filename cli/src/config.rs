use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Store location. `memory` keeps everything in-process for one run;
    /// anything else is handed to SQLite (e.g. `sqlite://boxoffice.db?mode=rwc`).
    pub database_url: String,

    // =========================
    // Seat selection
    // =========================
    /// Most seats one booking may hold.
    pub max_seats: usize,

    /// How long selected seats stay held before they are released.
    pub hold_seconds: u32,

    // =========================
    // Payment
    // =========================
    /// Convenience fee in basis points (1000 = 10%).
    pub fee_bps: u32,

    /// Latency of the simulated payment processor.
    pub payment_delay: Duration,

    /// Pins the randomly pre-booked seats of a freshly seeded store.
    pub seed: Option<u64>,

    /// `APP_ENV=production` switches logs to JSON.
    pub json_logs: bool,
}

pub const MEMORY_URL: &str = "memory";

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| -> anyhow::Result<Option<u64>> {
            get(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|e| anyhow::anyhow!("Invalid {} value '{}': {}", key, raw, e))
                })
                .transpose()
        };

        let cfg = Self {
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://boxoffice.db?mode=rwc".to_string()),
            max_seats: narrow("BOXOFFICE_MAX_SEATS", parsed("BOXOFFICE_MAX_SEATS")?, 10)?,
            hold_seconds: narrow("BOXOFFICE_HOLD_SECONDS", parsed("BOXOFFICE_HOLD_SECONDS")?, 300)?,
            fee_bps: narrow("BOXOFFICE_FEE_BPS", parsed("BOXOFFICE_FEE_BPS")?, 1_000)?,
            payment_delay: Duration::from_millis(
                parsed("BOXOFFICE_PAYMENT_DELAY_MS")?.unwrap_or(3_000),
            ),
            seed: parsed("BOXOFFICE_SEED")?,
            json_logs: get("APP_ENV").as_deref() == Some("production"),
        };

        if cfg.max_seats == 0 {
            anyhow::bail!("BOXOFFICE_MAX_SEATS must be at least 1");
        }

        Ok(cfg)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_URL
    }
}

fn narrow<T>(key: &str, value: Option<u64>, default: T) -> anyhow::Result<T>
where
    T: TryFrom<u64>,
{
    match value {
        Some(v) => T::try_from(v).map_err(|_| anyhow::anyhow!("{} value {} is out of range", key, v)),
        None => Ok(default),
    }
}
