//! Annotated captures for checking the crop geometry against a live page.

use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, Rgba};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::Snapshot;

const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Saves the screenshot with the crop region outlined in red (2px) as
/// `<prefix>_debug.png`, and the OCR input as `<prefix>_debug_ocr.png`.
pub fn save_debug_capture(prefix: &Path, snapshot: &Snapshot, ocr_input: &GrayImage) -> Result<()> {
    let crop = snapshot.frame.crop;
    let mut annotated = snapshot.screenshot.clone();

    for inset in 0..2u32 {
        let width = crop.width().saturating_sub(2 * inset);
        let height = crop.height().saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((crop.left + inset) as i32, (crop.top + inset) as i32)
            .of_size(width, height);
        draw_hollow_rect_mut(&mut annotated, rect, OUTLINE);
    }

    let annotated_path = with_suffix(prefix, "_debug.png");
    annotated
        .save(&annotated_path)
        .with_context(|| format!("Failed to save {}", annotated_path.display()))?;

    let ocr_path = with_suffix(prefix, "_debug_ocr.png");
    ocr_input
        .save(&ocr_path)
        .with_context(|| format!("Failed to save {}", ocr_path.display()))?;

    tracing::info!("Debug capture saved to {}", annotated_path.display());
    Ok(())
}

fn with_suffix(prefix: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(suffix);
    name.into()
}
