//! Chart tooltip scraper.
//!
//! Sweeps a simulated pointer across a JavaScript chart in headless Chrome,
//! OCRs the hover tooltip at each step and saves the recognized
//! (date, value) readings as one CSV file per chart.

mod browser;
mod capture;
mod cli;
mod config;
mod error;
mod logging;
mod ocr;
mod output;
mod paths;
mod pipeline;
mod sample;
mod sweep;

use anyhow::{Context, Result};
use std::time::Duration;

use crate::browser::BrowserSession;
use crate::ocr::TesseractRecognizer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = cli::parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", cli::HELP);
        return Ok(());
    }
    if let Some(path) = &args.write_default_config {
        config::write_default_config(path)?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    if let Err(e) = paths::ensure_directories() {
        eprintln!("Failed to create log directory: {}", e);
    }
    logging::init_logging();

    let mut config = config::load_config(args.config.as_deref())?;
    args.apply(&mut config)?;
    config.validate().context("Invalid configuration")?;

    let mut recognizer = TesseractRecognizer::from_config(&config.ocr)?;

    tracing::info!(
        "Starting chart tooltip scraper: {} target(s), {} steps each",
        config.targets.len(),
        config.sweep.steps
    );

    let between = Duration::from_millis(config.browser.between_targets_wait_ms);
    let summary = pipeline::run_targets(&config.targets, between, async |target: &config::Target| {
        let connect = async || BrowserSession::connect(&config.browser).await;
        pipeline::run_target(&config, target, connect, &mut recognizer).await
    })
    .await;

    tracing::info!(
        "Script completed: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    for (name, reason) in &summary.failed {
        tracing::info!("  {} failed: {}", name, reason);
    }

    Ok(())
}
