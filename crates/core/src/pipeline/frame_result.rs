use crate::shared::frame::Frame;
use crate::validation::domain::validation_result::{RejectDetail, RejectReason, Rejection};

use super::frame_selector::SelectedCrop;

/// Why no frame was produced for a requested timestamp or range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    InvalidFrame,
    NoFaceDetected,
    FaceTooSmall,
    FaceBlurry,
    TimestampOutOfBounds,
    FrameReadFailed,
    /// The exact-timestamp attempt never ran (out of bounds or undecodable).
    Unknown,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidFrame => "INVALID_FRAME",
            SkipReason::NoFaceDetected => "NO_FACE_DETECTED",
            SkipReason::FaceTooSmall => "FACE_TOO_SMALL",
            SkipReason::FaceBlurry => "FACE_BLURRY",
            SkipReason::TimestampOutOfBounds => "TIMESTAMP_OUT_OF_BOUNDS",
            SkipReason::FrameReadFailed => "FRAME_READ_FAILED",
            SkipReason::Unknown => "UNKNOWN",
        }
    }
}

impl From<RejectReason> for SkipReason {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::InvalidFrame => SkipReason::InvalidFrame,
            RejectReason::NoFaceDetected => SkipReason::NoFaceDetected,
            RejectReason::FaceTooSmall => SkipReason::FaceTooSmall,
            RejectReason::FaceBlurry => SkipReason::FaceBlurry,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkipReport {
    pub reason: SkipReason,
    pub detail: Option<RejectDetail>,
}

impl SkipReport {
    pub fn new(reason: SkipReason) -> Self {
        Self {
            reason,
            detail: None,
        }
    }
}

impl From<Rejection> for SkipReport {
    fn from(rejection: Rejection) -> Self {
        Self {
            reason: rejection.reason.into(),
            detail: rejection.detail,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Valid,
    SkipFrame,
}

impl FrameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameStatus::Valid => "VALID",
            FrameStatus::SkipFrame => "SKIP_FRAME",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// `offset` is the policy offset that produced the accepted frame.
    Valid { crop: SelectedCrop, offset: f64 },
    Skipped(SkipReport),
}

/// Final answer for one requested timestamp. Built once, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    pub requested_timestamp: f64,
    /// Set only for valid results.
    pub resolved_timestamp: Option<f64>,
    pub outcome: FrameOutcome,
}

impl FrameResult {
    pub fn valid(requested: f64, offset: f64, crop: SelectedCrop) -> Self {
        Self {
            requested_timestamp: requested,
            resolved_timestamp: Some(requested + offset),
            outcome: FrameOutcome::Valid { crop, offset },
        }
    }

    pub fn skipped(requested: f64, report: SkipReport) -> Self {
        Self {
            requested_timestamp: requested,
            resolved_timestamp: None,
            outcome: FrameOutcome::Skipped(report),
        }
    }

    pub fn status(&self) -> FrameStatus {
        match self.outcome {
            FrameOutcome::Valid { .. } => FrameStatus::Valid,
            FrameOutcome::Skipped(_) => FrameStatus::SkipFrame,
        }
    }

    /// Enhanced crop; present only when valid.
    pub fn image(&self) -> Option<&Frame> {
        match &self.outcome {
            FrameOutcome::Valid { crop, .. } => Some(&crop.image),
            FrameOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_report(&self) -> Option<&SkipReport> {
        match &self.outcome {
            FrameOutcome::Valid { .. } => None,
            FrameOutcome::Skipped(report) => Some(report),
        }
    }
}

/// A slide interval; the frame is searched at its midpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRange {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl FrameRange {
    pub fn median(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RangeFrameResult {
    pub range: FrameRange,
    pub result: FrameResult,
}

impl RangeFrameResult {
    pub fn median(&self) -> f64 {
        self.range.median()
    }
}
