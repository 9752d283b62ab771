//! Headless browser access over WebDriver.
//!
//! This module provides:
//! - The `ChartSurface` seam the sweep drives (pointer moves, screenshots)
//! - The `ChartSession` seam the pipeline opens and closes
//! - `BrowserSession`, a fantoccini-backed surface for a live chart page

pub mod session;
pub mod surface;

pub use session::BrowserSession;
pub use surface::{ChartSession, ChartSurface, SurfaceError};
