//! Text recognition for preprocessed tooltip rasters.

pub mod engine;
pub mod setup;

pub use engine::TesseractRecognizer;

use anyhow::Result;
use image::GrayImage;

/// Turns a preprocessed raster into text.
///
/// Finding nothing is not an error: implementations return an empty string
/// and leave the judgement to the parser.
pub trait TextRecognizer {
    fn recognize(&mut self, raster: &GrayImage) -> Result<String>;
}
