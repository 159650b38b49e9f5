pub mod cli;
pub mod commands;
pub mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use common::{TraceId, init_logger, root_span};
use store::{KvStore, MemoryStore, SqliteStore};
use tracing::Instrument;

use cli::{Cli, Command};
use commands::App;
use config::AppConfig;

async fn run_with<S: KvStore + ?Sized>(
    store: Arc<S>,
    cfg: &AppConfig,
    command: Command,
) -> anyhow::Result<()> {
    let app = App::open(store, cfg).await?;
    let mut stdout = std::io::stdout().lock();
    app.run(command, &mut stdout).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;

    init_logger("boxoffice", cfg.json_logs);

    let trace_id = TraceId::default();
    let span = root_span("command", &trace_id);

    async {
        tracing::debug!(store = %cfg.database_url, "starting");

        if cfg.uses_memory_store() {
            run_with(Arc::new(MemoryStore::new()), &cfg, cli.command).await
        } else {
            let store = SqliteStore::open(&cfg.database_url)
                .await
                .with_context(|| format!("failed to open store {}", cfg.database_url))?;
            run_with(Arc::new(store), &cfg, cli.command).await
        }
    }
    .instrument(span)
    .await
}
