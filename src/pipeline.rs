//! Per-target pipeline and the outer loop over targets.
//!
//! One target = one browser session, one sweep, one aggregator, one CSV file.
//! A target's failure is logged and the loop moves on to the next target.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use crate::browser::ChartSession;
use crate::capture::FrameCapture;
use crate::config::{ScraperConfig, Target};
use crate::error::ScrapeError;
use crate::ocr::TextRecognizer;
use crate::output::write_series;
use crate::sample::{SampleAggregator, SampleParser, Series};
use crate::sweep::PointerSweepController;

/// Rows shown in the log after a target completes.
const PREVIEW_ROWS: usize = 5;

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Target name and the file written for it
    pub succeeded: Vec<(String, PathBuf)>,
    /// Target name and the error that stopped it
    pub failed: Vec<(String, String)>,
}

/// Opens a session with `connect`, sweeps `target`'s chart and returns the
/// finished series. The session is closed on every path out of this function.
pub async fn scrape_target<S, C, R>(
    config: &ScraperConfig,
    target: &Target,
    connect: C,
    recognizer: &mut R,
) -> Result<Series, ScrapeError>
where
    S: ChartSession,
    C: AsyncFnOnce() -> Result<S, ScrapeError>,
    R: TextRecognizer,
{
    let parser = SampleParser::new(&target.name, &config.parse).map_err(|e| ScrapeError::Rules {
        series: target.name.clone(),
        reason: e.to_string(),
    })?;
    let capture = FrameCapture::new(config.capture.clone());

    tracing::info!("Starting {} scraping...", target.name);
    let mut session = connect().await?;
    let result = sweep_session(&mut session, config, target, &capture, &parser, recognizer).await;
    session.close().await;

    result.map(SampleAggregator::finalize)
}

async fn sweep_session<S: ChartSession, R: TextRecognizer>(
    session: &mut S,
    config: &ScraperConfig,
    target: &Target,
    capture: &FrameCapture,
    parser: &SampleParser,
    recognizer: &mut R,
) -> Result<SampleAggregator, ScrapeError> {
    session
        .open_chart(&target.url, &config.browser, config.sweep.start_offset)
        .await?;

    let mut controller = PointerSweepController::new(
        &target.name,
        config.parse.value_label.trim().trim_end_matches(':'),
        session,
        recognizer,
        capture,
        parser,
        &config.sweep,
    );
    if config.capture.debug_capture {
        controller = controller.with_debug_capture(debug_prefix(config, target));
    }

    controller.run(SampleAggregator::new()).await
}

/// `<output_dir>/<output file stem>`, the prefix for debug images.
fn debug_prefix(config: &ScraperConfig, target: &Target) -> PathBuf {
    let output = config.output_dir().join(&target.output);
    output.with_extension("")
}

/// Scrapes `target` and writes its CSV. Returns the path written.
///
/// Nothing is written when the scrape fails.
pub async fn run_target<S, C, R>(
    config: &ScraperConfig,
    target: &Target,
    connect: C,
    recognizer: &mut R,
) -> Result<PathBuf>
where
    S: ChartSession,
    C: AsyncFnOnce() -> Result<S, ScrapeError>,
    R: TextRecognizer,
{
    let series = scrape_target(config, target, connect, recognizer).await?;

    let path = config.output_dir().join(&target.output);
    write_series(&path, &config.parse.metric_column, &series).map_err(|e| ScrapeError::Output {
        path: path.clone(),
        reason: format!("{:#}", e),
    })?;

    tracing::info!("Data saved to {}", path.display());
    log_preview(&target.name, &series);
    Ok(path)
}

fn log_preview(name: &str, series: &Series) {
    tracing::info!(
        "Sample of collected data for {} ({} rows):",
        name,
        series.len()
    );
    for sample in series.samples().iter().take(PREVIEW_ROWS) {
        if let Some(date) = sample.date() {
            tracing::info!("  {}  {}", date, sample.value);
        }
    }
}

/// Runs `run` for every target in order, isolating failures, and waits
/// `between` after each target except the last.
pub async fn run_targets<F>(targets: &[Target], between: Duration, mut run: F) -> RunSummary
where
    F: AsyncFnMut(&Target) -> Result<PathBuf>,
{
    let mut summary = RunSummary::default();

    for (idx, target) in targets.iter().enumerate() {
        tracing::info!("{}", "=".repeat(50));
        tracing::info!("Processing {}", target.name);
        tracing::info!("{}", "=".repeat(50));

        match run(target).await {
            Ok(path) => {
                tracing::info!("Completed {} processing", target.name);
                summary.succeeded.push((target.name.clone(), path));
            }
            Err(e) => {
                tracing::error!("Failed to process {}: {:#}", target.name, e);
                summary.failed.push((target.name.clone(), format!("{:#}", e)));
            }
        }

        if idx + 1 < targets.len() {
            tokio::time::sleep(between).await;
        }
    }

    summary
}
