use thiserror::Error;

use crate::config::{BrowserConfig, Offset};
use crate::error::ScrapeError;

#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    #[error("pointer move failed: {0}")]
    Pointer(String),
    #[error("screenshot failed: {0}")]
    Screenshot(String),
}

/// A rendered chart the sweep can hover over and photograph.
///
/// Implementations hold the pointer position between calls: each
/// `move_pointer_by` is relative to where the previous one left it.
#[allow(async_fn_in_trait)]
pub trait ChartSurface {
    async fn move_pointer_by(&mut self, dx: i64, dy: i64) -> Result<(), SurfaceError>;

    /// Full-viewport screenshot, PNG encoded.
    async fn screenshot_png(&mut self) -> Result<Vec<u8>, SurfaceError>;
}

/// A chart surface backed by a page that has to be loaded first and released
/// afterwards.
#[allow(async_fn_in_trait)]
pub trait ChartSession: ChartSurface + Sized {
    /// Loads `url` and parks the pointer at `start` from the chart's center.
    async fn open_chart(
        &mut self,
        url: &str,
        config: &BrowserConfig,
        start: Offset,
    ) -> Result<(), ScrapeError>;

    /// Releases the session. Never fails; problems are only logged.
    async fn close(self);
}
