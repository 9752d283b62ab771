//! Tooltip capture from the rendered chart.
//!
//! This module provides:
//! - Screenshot decoding and cropping to the tooltip region (`FrameCapture`)
//! - OCR preprocessing: rescale, grayscale, binarize (`preprocess`)
//! - Waiting for the tooltip region to stop changing (`stability`)
//! - Annotated debug captures (`debug`)

pub mod debug;
pub mod preprocess;
pub mod stability;

pub use stability::wait_for_stable_frame;

use image::{GrayImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::browser::{ChartSurface, SurfaceError};
use crate::config::{CaptureConfig, CropRect};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("screenshot is not a valid PNG: {0}")]
    Decode(#[from] image::ImageError),
    #[error("crop {crop:?} is outside the {width}x{height} screenshot")]
    OutOfBounds {
        crop: CropRect,
        width: u32,
        height: u32,
    },
}

/// The tooltip region cut out of one screenshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub image: RgbaImage,
    pub crop: CropRect,
}

/// A full screenshot together with its cropped tooltip region.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub screenshot: RgbaImage,
    pub frame: RawFrame,
}

/// Captures and preprocesses the tooltip region with fixed geometry.
#[derive(Debug, Clone)]
pub struct FrameCapture {
    config: CaptureConfig,
}

impl FrameCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Takes a screenshot of the surface and crops the tooltip region out of it.
    pub async fn grab<S: ChartSurface>(&self, surface: &mut S) -> Result<Snapshot, CaptureError> {
        let png = surface.screenshot_png().await?;
        let screenshot = image::load_from_memory_with_format(&png, ImageFormat::Png)?.to_rgba8();
        let frame = preprocess::crop_frame(&screenshot, &self.config.crop)?;
        Ok(Snapshot { screenshot, frame })
    }

    /// Rescales, grayscales and binarizes a frame for OCR.
    pub fn preprocess(&self, frame: &RawFrame) -> GrayImage {
        preprocess::prepare_for_ocr(
            &frame.image,
            self.config.ocr_size,
            self.config.binarize_threshold,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    /// PNG bytes of a `width` x `height` image filled with `color`.
    pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SurfaceError;
    use crate::config::Size;

    struct StillSurface {
        png: Vec<u8>,
    }

    impl ChartSurface for StillSurface {
        async fn move_pointer_by(&mut self, _dx: i64, _dy: i64) -> Result<(), SurfaceError> {
            Ok(())
        }

        async fn screenshot_png(&mut self) -> Result<Vec<u8>, SurfaceError> {
            Ok(self.png.clone())
        }
    }

    fn small_config() -> CaptureConfig {
        CaptureConfig {
            crop: CropRect {
                left: 2,
                top: 2,
                right: 12,
                bottom: 6,
            },
            ocr_size: Size {
                width: 20,
                height: 8,
            },
            binarize_threshold: 180,
            debug_capture: false,
        }
    }

    #[tokio::test]
    async fn test_grab_crops_configured_region() {
        let mut surface = StillSurface {
            png: test_support::solid_png(40, 20, [255, 255, 255, 255]),
        };
        let capture = FrameCapture::new(small_config());

        let snapshot = capture.grab(&mut surface).await.unwrap();

        assert_eq!(snapshot.screenshot.dimensions(), (40, 20));
        assert_eq!(snapshot.frame.image.dimensions(), (10, 4));
        assert_eq!(snapshot.frame.crop, small_config().crop);
    }

    #[tokio::test]
    async fn test_grab_rejects_small_screenshot() {
        let mut surface = StillSurface {
            png: test_support::solid_png(8, 8, [0, 0, 0, 255]),
        };
        let capture = FrameCapture::new(small_config());

        let err = capture.grab(&mut surface).await.unwrap_err();
        assert!(matches!(err, CaptureError::OutOfBounds { .. }));
    }

    #[tokio::test]
    async fn test_grab_rejects_garbage_bytes() {
        let mut surface = StillSurface {
            png: b"not a png".to_vec(),
        };
        let capture = FrameCapture::new(small_config());

        let err = capture.grab(&mut surface).await.unwrap_err();
        assert!(matches!(err, CaptureError::Decode(_)));
    }

    #[tokio::test]
    async fn test_preprocess_is_deterministic() {
        let mut surface = StillSurface {
            png: test_support::solid_png(40, 20, [200, 200, 200, 255]),
        };
        let capture = FrameCapture::new(small_config());
        let snapshot = capture.grab(&mut surface).await.unwrap();

        let first = capture.preprocess(&snapshot.frame);
        let second = capture.preprocess(&snapshot.frame);

        assert_eq!(first.dimensions(), (20, 8));
        assert_eq!(first, second);
    }
}
