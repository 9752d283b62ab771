use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

use super::{CaptureError, RawFrame};
use crate::config::{CropRect, Size};

/// Cuts `rect` out of a screenshot.
///
/// Unlike a clamping crop, a rectangle that does not fit is an error: the
/// tooltip geometry assumes a fixed viewport and a partial crop would feed
/// OCR a shifted region.
pub fn crop_frame(img: &RgbaImage, rect: &CropRect) -> Result<RawFrame, CaptureError> {
    let (width, height) = img.dimensions();
    if !rect.fits_within(width, height) {
        return Err(CaptureError::OutOfBounds {
            crop: *rect,
            width,
            height,
        });
    }

    let image =
        imageops::crop_imm(img, rect.left, rect.top, rect.width(), rect.height()).to_image();
    Ok(RawFrame { image, crop: *rect })
}

/// Rescales to the canonical OCR size (Lanczos), converts to grayscale and
/// binarizes.
pub fn prepare_for_ocr(img: &RgbaImage, size: Size, threshold: u8) -> GrayImage {
    let resized = imageops::resize(img, size.width, size.height, FilterType::Lanczos3);
    let gray = imageops::grayscale(&resized);
    binarize(&gray, threshold)
}

/// Pixels brighter than `threshold` become white (255), the rest black (0).
///
/// The tooltip has dark text on a light box, so the box turns white and the
/// glyphs stay black, which is what tesseract expects.
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] > threshold { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}
