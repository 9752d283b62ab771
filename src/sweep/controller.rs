//! Pointer sweep across the chart.
//!
//! Each step moves the pointer, waits for the tooltip, captures it, runs OCR
//! and parses the text. Steps run strictly one after another against the
//! single browser session; a failed step is logged and skipped, never retried.

use std::path::PathBuf;
use std::time::Duration;

use super::outcome::{SkipReason, StepOutcome};
use crate::browser::ChartSurface;
use crate::capture::{FrameCapture, debug::save_debug_capture, wait_for_stable_frame};
use crate::config::SweepConfig;
use crate::error::ScrapeError;
use crate::ocr::TextRecognizer;
use crate::sample::{ParseRejection, ParsedSample, SampleAggregator, SampleParser};

/// Drives one sweep over a chart surface.
pub struct PointerSweepController<'a, S, R> {
    series: &'a str,
    /// Name of the value in logs, e.g. "Transactions"
    metric: &'a str,
    surface: &'a mut S,
    recognizer: &'a mut R,
    capture: &'a FrameCapture,
    parser: &'a SampleParser,
    config: &'a SweepConfig,
    /// Where to write the annotated first capture, if enabled
    debug_prefix: Option<PathBuf>,
}

impl<'a, S: ChartSurface, R: TextRecognizer> PointerSweepController<'a, S, R> {
    pub fn new(
        series: &'a str,
        metric: &'a str,
        surface: &'a mut S,
        recognizer: &'a mut R,
        capture: &'a FrameCapture,
        parser: &'a SampleParser,
        config: &'a SweepConfig,
    ) -> Self {
        Self {
            series,
            metric,
            surface,
            recognizer,
            capture,
            parser,
            config,
            debug_prefix: None,
        }
    }

    /// Saves the first capture of the sweep under `prefix` for inspection.
    pub fn with_debug_capture(mut self, prefix: PathBuf) -> Self {
        self.debug_prefix = Some(prefix);
        self
    }

    /// Runs every step, pushing accepted samples into `aggregator`.
    ///
    /// Fails with `NoDataCollected` if the whole sweep accepted nothing.
    pub async fn run(
        mut self,
        mut aggregator: SampleAggregator,
    ) -> Result<SampleAggregator, ScrapeError> {
        let steps = self.config.steps;
        tracing::debug!("Sweeping {} steps looking for '{}'", steps, self.parser.marker());

        for i in 1..=steps {
            tracing::info!("Movement {}/{}", i, steps);
            match self.step().await {
                StepOutcome::Accepted(sample) => {
                    tracing::info!("{}", accepted_message(self.metric, &sample));
                    aggregator.push(sample);
                }
                StepOutcome::Skipped(reason) => reason.log(i),
            }
        }

        if aggregator.is_empty() {
            return Err(ScrapeError::NoDataCollected(self.series.to_string()));
        }

        tracing::info!(
            "Collected {} data points for {}",
            aggregator.len(),
            self.series
        );
        Ok(aggregator)
    }

    /// One sweep step: move, settle, capture, recognize, parse.
    pub async fn step(&mut self) -> StepOutcome {
        match self.attempt().await {
            Ok(sample) => StepOutcome::Accepted(sample),
            Err(reason) => StepOutcome::Skipped(reason),
        }
    }

    async fn attempt(&mut self) -> Result<ParsedSample, SkipReason> {
        let delta = self.config.step_delta;
        self.surface
            .move_pointer_by(delta.x, delta.y)
            .await
            .map_err(SkipReason::Pointer)?;

        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        let snapshot = wait_for_stable_frame(
            self.capture,
            &mut *self.surface,
            Duration::from_millis(self.config.stability_poll_ms),
            Duration::from_millis(self.config.stability_timeout_ms),
        )
        .await
        .map_err(SkipReason::Capture)?;

        let raster = self.capture.preprocess(&snapshot.frame);

        if let Some(prefix) = self.debug_prefix.take() {
            if let Err(e) = save_debug_capture(&prefix, &snapshot, &raster) {
                tracing::warn!("Failed to save debug capture: {:#}", e);
            }
        }
        drop(snapshot);

        let text = self
            .recognizer
            .recognize(&raster)
            .map_err(|e| SkipReason::Recognition(format!("{:#}", e)))?;

        if text.trim().is_empty() {
            return Err(SkipReason::NoText);
        }
        tracing::debug!("Raw OCR text: {}", text);

        self.parser.parse(&text).map_err(|reason| match reason {
            ParseRejection::MarkerAbsent => SkipReason::MarkerAbsent,
            reason => SkipReason::Rejected {
                reason,
                text: text.clone(),
            },
        })
    }
}

/// Log line for an accepted sample, e.g.
/// `Successfully parsed: Date=2024-03-15, Transactions=450200`.
fn accepted_message(metric: &str, sample: &ParsedSample) -> String {
    let date = sample
        .date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| sample.timestamp.to_string());
    format!("Successfully parsed: Date={}, {}={}", date, metric, sample.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SurfaceError;
    use crate::capture::test_support::solid_png;
    use crate::config::{CaptureConfig, CropRect, Offset, ParseConfig, Size};
    use crate::sample::date_to_epoch_millis;
    use anyhow::{Result, anyhow};
    use chrono::NaiveDate;
    use image::GrayImage;
    use std::collections::VecDeque;

    /// A still chart. Records pointer moves; individual screenshots can be
    /// made to fail.
    struct FakeSurface {
        png: Vec<u8>,
        moves: Vec<(i64, i64)>,
        failing_shots: VecDeque<bool>,
        pointer_fails: bool,
    }

    impl FakeSurface {
        fn new() -> Self {
            Self {
                png: solid_png(64, 32, [255, 255, 255, 255]),
                moves: Vec::new(),
                failing_shots: VecDeque::new(),
                pointer_fails: false,
            }
        }
    }

    impl ChartSurface for FakeSurface {
        async fn move_pointer_by(&mut self, dx: i64, dy: i64) -> Result<(), SurfaceError> {
            if self.pointer_fails {
                return Err(SurfaceError::Pointer("session gone".to_string()));
            }
            self.moves.push((dx, dy));
            Ok(())
        }

        async fn screenshot_png(&mut self) -> Result<Vec<u8>, SurfaceError> {
            if self.failing_shots.pop_front().unwrap_or(false) {
                return Err(SurfaceError::Screenshot("tab crashed".to_string()));
            }
            Ok(self.png.clone())
        }
    }

    /// Returns one scripted result per call, then empty text.
    struct ScriptedRecognizer {
        script: VecDeque<Result<String>>,
        calls: usize,
    }

    impl ScriptedRecognizer {
        fn new(texts: &[&str]) -> Self {
            Self {
                script: texts.iter().map(|t| Ok(t.to_string())).collect(),
                calls: 0,
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(&mut self, _raster: &GrayImage) -> Result<String> {
            self.calls += 1;
            self.script.pop_front().unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn capture() -> FrameCapture {
        FrameCapture::new(CaptureConfig {
            crop: CropRect {
                left: 4,
                top: 4,
                right: 36,
                bottom: 20,
            },
            ocr_size: Size {
                width: 64,
                height: 32,
            },
            binarize_threshold: 180,
            debug_capture: false,
        })
    }

    fn sweep_config(steps: u32) -> SweepConfig {
        SweepConfig {
            start_offset: Offset { x: -800, y: 0 },
            steps,
            step_delta: Offset { x: 15, y: 0 },
            settle_delay_ms: 0,
            stability_poll_ms: 0,
            stability_timeout_ms: 0,
        }
    }

    fn parser() -> SampleParser {
        SampleParser::new("Bitcoin", &ParseConfig::default()).unwrap()
    }

    fn millis(y: i32, m: u32, d: u32) -> i64 {
        date_to_epoch_millis(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    async fn sweep(
        surface: &mut FakeSurface,
        recognizer: &mut ScriptedRecognizer,
        steps: u32,
    ) -> Result<SampleAggregator, ScrapeError> {
        let capture = capture();
        let parser = parser();
        let config = sweep_config(steps);
        PointerSweepController::new(
            "Bitcoin",
            "Transactions",
            surface,
            recognizer,
            &capture,
            &parser,
            &config,
        )
        .run(SampleAggregator::new())
        .await
    }

    #[tokio::test]
    async fn test_sweep_collects_accepted_samples() {
        let mut surface = FakeSurface::new();
        let mut recognizer = ScriptedRecognizer::new(&[
            "Bitcoin - Transactions: 9024/03/15 450.2k",
            "Bitcoin - Transactions: 2024/03/16 12k",
            "some unrelated UI text",
            "Bitcoin - Transactions: 2024/03/17 abc",
        ]);

        let agg = sweep(&mut surface, &mut recognizer, 5).await.unwrap();
        let series = agg.finalize();

        assert_eq!(series.len(), 2);
        assert_eq!(series.samples()[0].timestamp, millis(2024, 3, 15));
        assert_eq!(series.samples()[0].value, 450200.0);
        assert_eq!(series.samples()[1].timestamp, millis(2024, 3, 16));
        assert_eq!(series.samples()[1].value, 12000.0);
        assert_eq!(surface.moves, vec![(15, 0); 5]);
        assert_eq!(recognizer.calls, 5);
    }

    #[tokio::test]
    async fn test_sweep_without_samples_is_no_data() {
        let mut surface = FakeSurface::new();
        let mut recognizer = ScriptedRecognizer::new(&["", "some unrelated UI text"]);

        let err = sweep(&mut surface, &mut recognizer, 3).await.unwrap_err();

        assert!(matches!(err, ScrapeError::NoDataCollected(ref name) if name == "Bitcoin"));
        assert_eq!(recognizer.calls, 3);
    }

    #[tokio::test]
    async fn test_repeated_reads_deduplicated() {
        let mut surface = FakeSurface::new();
        let mut recognizer = ScriptedRecognizer::new(&[
            "Bitcoin - Transactions: 2024/03/15 450.2k",
            "Bitcoin - Transactions: 2024/03/15 450.2k",
        ]);

        let agg = sweep(&mut surface, &mut recognizer, 2).await.unwrap();
        assert_eq!(agg.len(), 2);

        let series = agg.finalize();
        assert_eq!(series.len(), 1);
        assert_eq!(series.samples()[0].value, 450200.0);
    }

    #[tokio::test]
    async fn test_capture_failure_skips_only_that_step() {
        let mut surface = FakeSurface::new();
        surface.failing_shots = VecDeque::from([true, false]);
        let mut recognizer = ScriptedRecognizer::new(&["Bitcoin - Transactions: 2024/03/15 1k"]);

        let agg = sweep(&mut surface, &mut recognizer, 2).await.unwrap();

        // First step never reached OCR, second step consumed the script
        assert_eq!(recognizer.calls, 1);
        assert_eq!(agg.len(), 1);
    }

    #[tokio::test]
    async fn test_recognition_error_skips_step() {
        let mut surface = FakeSurface::new();
        let mut recognizer = ScriptedRecognizer {
            script: VecDeque::from([
                Err(anyhow!("tesseract crashed")),
                Ok("Bitcoin - Transactions: 2024/03/15 2k".to_string()),
            ]),
            calls: 0,
        };

        let agg = sweep(&mut surface, &mut recognizer, 2).await.unwrap();
        assert_eq!(agg.finalize().samples()[0].value, 2000.0);
    }

    #[tokio::test]
    async fn test_pointer_failure_skips_every_step() {
        let mut surface = FakeSurface::new();
        surface.pointer_fails = true;
        let mut recognizer = ScriptedRecognizer::new(&["Bitcoin - Transactions: 2024/03/15 2k"]);

        let err = sweep(&mut surface, &mut recognizer, 3).await.unwrap_err();

        assert!(matches!(err, ScrapeError::NoDataCollected(_)));
        assert_eq!(recognizer.calls, 0);
    }

    #[tokio::test]
    async fn test_step_outcome_variants() {
        let mut surface = FakeSurface::new();
        let mut recognizer = ScriptedRecognizer::new(&[
            "Bitcoin - Transactions: 2024/03/15 2k",
            "",
            "some unrelated UI text",
            "Bitcoin - Transactions: 2024/03/17 abc",
        ]);
        let capture = capture();
        let parser = parser();
        let config = sweep_config(4);
        let mut controller = PointerSweepController::new(
            "Bitcoin",
            "Transactions",
            &mut surface,
            &mut recognizer,
            &capture,
            &parser,
            &config,
        );

        assert!(matches!(controller.step().await, StepOutcome::Accepted(_)));
        assert!(matches!(
            controller.step().await,
            StepOutcome::Skipped(SkipReason::NoText)
        ));
        assert!(matches!(
            controller.step().await,
            StepOutcome::Skipped(SkipReason::MarkerAbsent)
        ));
        match controller.step().await {
            StepOutcome::Skipped(SkipReason::Rejected { reason, text }) => {
                assert_eq!(reason, ParseRejection::NonNumericValue("abc".to_string()));
                assert_eq!(text, "Bitcoin - Transactions: 2024/03/17 abc");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_debug_capture_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("bitcoin");
        let mut surface = FakeSurface::new();
        let mut recognizer = ScriptedRecognizer::new(&["Bitcoin - Transactions: 2024/03/15 2k"]);
        let capture = capture();
        let parser = parser();
        let config = sweep_config(3);

        PointerSweepController::new(
            "Bitcoin",
            "Transactions",
            &mut surface,
            &mut recognizer,
            &capture,
            &parser,
            &config,
        )
        .with_debug_capture(prefix)
        .run(SampleAggregator::new())
        .await
        .unwrap();

        assert!(dir.path().join("bitcoin_debug.png").exists());
        assert!(dir.path().join("bitcoin_debug_ocr.png").exists());
    }

    #[test]
    fn test_accepted_message_names_metric() {
        let sample = ParsedSample {
            timestamp: millis(2024, 3, 15),
            value: 450200.0,
        };
        assert_eq!(
            accepted_message("Transactions", &sample),
            "Successfully parsed: Date=2024-03-15, Transactions=450200"
        );
    }
}
