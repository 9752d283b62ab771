use std::path::PathBuf;

use thiserror::Error;

/// Failures that end the run for one target. Other targets are unaffected.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser session failed: {0}")]
    Session(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("invalid parse rules for {series}: {reason}")]
    Rules { series: String, reason: String },
    #[error("no data points were collected for {0}")]
    NoDataCollected(String),
    #[error("failed to write {}: {reason}", path.display())]
    Output { path: PathBuf, reason: String },
}
