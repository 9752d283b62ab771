use std::fmt;

use crate::browser::SurfaceError;
use crate::capture::CaptureError;
use crate::sample::{ParseRejection, ParsedSample};

/// Result of one sweep step.
#[derive(Debug)]
pub enum StepOutcome {
    Accepted(ParsedSample),
    Skipped(SkipReason),
}

/// Why a sweep step produced no sample. Every variant is recoverable: the
/// sweep moves on to the next position.
#[derive(Debug)]
pub enum SkipReason {
    Pointer(SurfaceError),
    Capture(CaptureError),
    Recognition(String),
    /// OCR found nothing, usually because no tooltip was showing yet
    NoText,
    /// Text was recognized but is not this series' tooltip
    MarkerAbsent,
    Rejected { reason: ParseRejection, text: String },
}

impl SkipReason {
    /// Logs the skip at a level matching how surprising it is.
    pub fn log(&self, step: u32) {
        match self {
            SkipReason::NoText | SkipReason::MarkerAbsent => {
                tracing::debug!("Movement {}: {}", step, self);
            }
            SkipReason::Rejected { reason, text } => {
                tracing::warn!("Movement {}: {} in: {}", step, reason, text);
            }
            _ => tracing::warn!("Error during movement {}: {}", step, self),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Pointer(e) => write!(f, "{}", e),
            SkipReason::Capture(e) => write!(f, "capture failed: {}", e),
            SkipReason::Recognition(msg) => write!(f, "recognition failed: {}", msg),
            SkipReason::NoText => write!(f, "no text recognized"),
            SkipReason::MarkerAbsent => write!(f, "no tooltip for this series"),
            SkipReason::Rejected { reason, .. } => write!(f, "{}", reason),
        }
    }
}
