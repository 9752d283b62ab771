//! Logging setup: console plus an append-only log file under `logs/`.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_FILE_NAME: &str = "chart_tooltip_scraper.log";

/// Installs the global subscriber. Level comes from `RUST_LOG`, default `info`.
///
/// If the log file cannot be opened, logging continues on the console only.
pub fn init_logging() {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(false)
        .with_filter(filter());

    let log_path = crate::paths::get_logs_dir().join(LOG_FILE_NAME);
    let file_layer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter())
        });

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init();
}
