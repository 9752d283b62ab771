//! Waiting for the tooltip to finish rendering.
//!
//! Instead of trusting a fixed delay, the crop region is captured repeatedly
//! until two consecutive captures match, bounded by a timeout.

use std::time::Duration;

use tokio::time::Instant;

use super::{CaptureError, FrameCapture, Snapshot};
use crate::browser::ChartSurface;

/// Captures until the tooltip region is unchanged between two consecutive
/// captures, or `timeout` elapses.
///
/// On timeout the most recent capture is returned; an unsettled frame is
/// still worth a recognition attempt. A zero `timeout` returns the first
/// capture immediately. Only a failure of the first capture is an error;
/// a later failed capture ends the wait with the last good one.
pub async fn wait_for_stable_frame<S: ChartSurface>(
    capture: &FrameCapture,
    surface: &mut S,
    poll: Duration,
    timeout: Duration,
) -> Result<Snapshot, CaptureError> {
    let mut last = capture.grab(surface).await?;
    if timeout.is_zero() {
        return Ok(last);
    }

    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() >= deadline {
            tracing::debug!(
                "Tooltip region did not settle within {}ms",
                timeout.as_millis()
            );
            return Ok(last);
        }

        tokio::time::sleep(poll).await;
        let next = match capture.grab(surface).await {
            Ok(next) => next,
            Err(e) => {
                tracing::debug!("Stability capture failed, keeping last frame: {}", e);
                return Ok(last);
            }
        };
        if next.frame == last.frame {
            return Ok(next);
        }
        last = next;
    }
}
