use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber once per process.
///
/// `RUST_LOG` drives the filter (default `info`). With `json` set, events are
/// emitted as one JSON object per line; otherwise the human-readable format is
/// used. Output goes to stderr so command output on stdout stays clean.
/// Later calls are ignored, so tests and binaries can both call this.
pub fn init_logger(service_name: &'static str, json: bool) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let base = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .with_writer(std::io::stderr);

        // try_init: a test harness may already own the global subscriber.
        let installed = if json {
            tracing_subscriber::registry()
                .with(filter)
                .with(base.json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(base)
                .try_init()
        };

        if installed.is_ok() {
            tracing::info!(service = service_name, json, "logger initialized");
        }
    });
}
