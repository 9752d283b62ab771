//! Configuration types for the scraper.
//!
//! Loads settings from config.json at startup. Provides browser settings,
//! capture geometry, sweep timing, OCR settings, parse rules and the list of
//! scrape targets. Geometry assumptions are declared here once and checked by
//! [`ScraperConfig::validate`] before any browser is started.

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A rectangle in absolute viewport pixels, stored as edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// True if the rectangle has area and lies fully inside a `width` x `height` raster.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width() > 0 && self.height() > 0 && self.right <= width && self.bottom <= height
    }
}

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Pointer offset in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

/// WebDriver session settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver listens on 9515 by default)
    pub webdriver_url: String,
    pub headless: bool,
    /// Crop coordinates assume this exact viewport
    pub viewport: Size,
    pub user_agent: String,
    /// DOM id of the chart container the sweep starts from
    pub chart_element_id: String,
    pub page_load_wait_ms: u64,
    /// Wait after moving the pointer to the sweep start
    pub start_position_wait_ms: u64,
    pub between_targets_wait_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            viewport: Size {
                width: 1920,
                height: 1080,
            },
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            chart_element_id: "container".to_string(),
            page_load_wait_ms: 5000,
            start_position_wait_ms: 1000,
            between_targets_wait_ms: 5000,
        }
    }
}

/// Tooltip capture and preprocessing geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Tooltip region within the viewport screenshot
    pub crop: CropRect,
    /// Canonical size the crop is rescaled to before OCR
    pub ocr_size: Size,
    /// Grayscale pixels above this become white, the rest black
    pub binarize_threshold: u8,
    /// Save an annotated screenshot of the first capture of each target
    #[serde(default)]
    pub debug_capture: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            crop: CropRect {
                left: 130,
                top: 500,
                right: 800,
                bottom: 600,
            },
            ocr_size: Size {
                width: 1340,
                height: 200,
            },
            binarize_threshold: 180,
            debug_capture: false,
        }
    }
}

/// Pointer sweep geometry and timing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Start position relative to the center of the chart container
    pub start_offset: Offset,
    pub steps: u32,
    pub step_delta: Offset,
    /// Minimum wait after each pointer move
    pub settle_delay_ms: u64,
    /// Interval between stability probes of the crop region
    #[serde(default = "default_stability_poll_ms")]
    pub stability_poll_ms: u64,
    /// Upper bound on the stability wait; 0 disables probing
    #[serde(default = "default_stability_timeout_ms")]
    pub stability_timeout_ms: u64,
}

fn default_stability_poll_ms() -> u64 {
    100
}

fn default_stability_timeout_ms() -> u64 {
    1000
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_offset: Offset { x: -800, y: 0 },
            steps: 120,
            step_delta: Offset { x: 15, y: 0 },
            settle_delay_ms: 400,
            stability_poll_ms: default_stability_poll_ms(),
            stability_timeout_ms: default_stability_timeout_ms(),
        }
    }
}

/// Tesseract invocation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Explicit tesseract binary; searched for when unset
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory; tesseract's own default when unset
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Page segmentation mode (6 = single uniform block of text)
    #[serde(default = "default_psm")]
    pub page_segmentation_mode: u8,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_psm() -> u8 {
    6
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: default_language(),
            page_segmentation_mode: default_psm(),
        }
    }
}

/// Tooltip text rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Literal label preceding the value; the marker is "<name> - <label>"
    pub value_label: String,
    /// Unit suffix following the value ("k" = thousands)
    pub unit_suffix: String,
    /// Power of ten the unit stands for (3 = thousands)
    pub unit_exponent: u32,
    /// Header of the value column in the output file
    pub metric_column: String,
    /// OCR misreads of the year's leading digit, mapped to the intended digit
    pub year_digit_corrections: BTreeMap<char, char>,
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            value_label: "Transactions:".to_string(),
            unit_suffix: "k".to_string(),
            unit_exponent: 3,
            metric_column: "transactions".to_string(),
            year_digit_corrections: BTreeMap::from([('9', '2')]),
            min_year: 2009,
            max_year: 2100,
        }
    }
}

/// One chart to scrape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Series name as it appears in the tooltip, e.g. "Bitcoin"
    pub name: String,
    pub url: String,
    /// Output file name, relative to the output directory
    pub output: String,
}

impl Target {
    fn new(name: &str, url: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            output: output.to_string(),
        }
    }
}

fn default_targets() -> Vec<Target> {
    vec![
        Target::new(
            "Bitcoin",
            "https://bitinfocharts.com/comparison/bitcoin-transactions.html#3m",
            "bitcoin_transactions.csv",
        ),
        Target::new(
            "Litecoin",
            "https://bitinfocharts.com/comparison/litecoin-transactions.html#3m",
            "litecoin_transactions.csv",
        ),
        Target::new(
            "Ethereum Classic",
            "https://bitinfocharts.com/comparison/transactions-etc.html#3m",
            "ethereum_classic_transactions.csv",
        ),
        Target::new(
            "Bitcoin Cash",
            "https://bitinfocharts.com/comparison/transactions-bch.html#3m",
            "bitcoin_cash_transactions.csv",
        ),
        Target::new(
            "Dogecoin",
            "https://bitinfocharts.com/comparison/dogecoin-transactions.html#3m",
            "dogecoin_transactions.csv",
        ),
    ]
}

/// Complete scraper configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,
    /// Where CSV files go; `<exe_dir>/output` when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            capture: CaptureConfig::default(),
            sweep: SweepConfig::default(),
            ocr: OcrConfig::default(),
            parse: ParseConfig::default(),
            targets: default_targets(),
            output_dir: None,
        }
    }
}

impl ScraperConfig {
    /// Checks the geometry and parse rules once, before any session starts.
    pub fn validate(&self) -> Result<()> {
        let viewport = self.browser.viewport;
        if viewport.width == 0 || viewport.height == 0 {
            bail!("viewport must be non-empty");
        }
        let crop = &self.capture.crop;
        if !crop.fits_within(viewport.width, viewport.height) {
            bail!(
                "crop rectangle {:?} does not fit inside the {}x{} viewport",
                crop,
                viewport.width,
                viewport.height
            );
        }
        if self.capture.ocr_size.width == 0 || self.capture.ocr_size.height == 0 {
            bail!("ocr_size must be non-empty");
        }
        if self.sweep.steps == 0 {
            bail!("sweep.steps must be at least 1");
        }
        if self.parse.min_year > self.parse.max_year {
            bail!(
                "parse.min_year ({}) is after parse.max_year ({})",
                self.parse.min_year,
                self.parse.max_year
            );
        }
        if self.parse.value_label.trim().is_empty() {
            bail!("parse.value_label must not be empty");
        }
        if self.parse.unit_suffix.trim().is_empty() {
            bail!("parse.unit_suffix must not be empty");
        }
        if self.parse.unit_exponent > 18 {
            bail!("parse.unit_exponent {} is too large", self.parse.unit_exponent);
        }
        for (from, to) in &self.parse.year_digit_corrections {
            if !from.is_ascii_digit() || !to.is_ascii_digit() {
                return Err(anyhow!(
                    "year_digit_corrections must map digits to digits, got '{}' -> '{}'",
                    from,
                    to
                ));
            }
        }
        if self.targets.is_empty() {
            bail!("no targets configured");
        }
        for target in &self.targets {
            if target.name.trim().is_empty() || target.output.trim().is_empty() {
                bail!("target {:?} needs a name and an output file", target);
            }
        }
        Ok(())
    }

    /// Output directory, falling back to `<exe_dir>/output`.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(crate::paths::get_output_dir)
    }
}

/// Loads configuration from `path`, or from config.json next to the
/// executable when no path is given. A missing or unparsable default file
/// falls back to defaults; an explicitly requested file must load.
pub fn load_config(path: Option<&Path>) -> Result<ScraperConfig> {
    if let Some(path) = path {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!("Config loaded from {}", path.display());
        return Ok(config);
    }

    let config_path = crate::paths::get_exe_dir().join("config.json");
    tracing::info!("Looking for config at: {}", config_path.display());

    if !config_path.exists() {
        tracing::info!("config.json not found. Using default config.");
        return Ok(ScraperConfig::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Config loaded from config.json");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config.json: {}. Using defaults.", e);
                Ok(ScraperConfig::default())
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config.json: {}. Using defaults.", e);
            Ok(ScraperConfig::default())
        }
    }
}

/// Writes the default configuration as pretty JSON, for editing.
pub fn write_default_config(path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&ScraperConfig::default())?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    Ok(())
}
