use crate::shared::face_box::FaceBox;

/// How the accepted subject is framed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositionMode {
    /// One face; crop is built around that face.
    Single,
    /// Several faces; crop is built around their union.
    Group,
}

impl CompositionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionMode::Single => "single",
            CompositionMode::Group => "group",
        }
    }
}

/// Why the validator turned a frame down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    InvalidFrame,
    NoFaceDetected,
    FaceTooSmall,
    FaceBlurry,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidFrame => "INVALID_FRAME",
            RejectReason::NoFaceDetected => "NO_FACE_DETECTED",
            RejectReason::FaceTooSmall => "FACE_TOO_SMALL",
            RejectReason::FaceBlurry => "FACE_BLURRY",
        }
    }
}

/// Measurement that triggered a rejection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RejectDetail {
    /// Laplacian variance of the largest face.
    Sharpness(f64),
    /// Area ratio of the largest raw detection.
    AreaRatio(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Acceptance {
    pub mode: CompositionMode,
    /// Subject region before padding: the face, or the union of all faces.
    pub crop_region: FaceBox,
    pub sharpness: f64,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub face_count: usize,
    /// Area ratio of the largest face.
    pub area_ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    pub reason: RejectReason,
    pub detail: Option<RejectDetail>,
}

impl Rejection {
    pub fn new(reason: RejectReason, detail: Option<RejectDetail>) -> Self {
        Self { reason, detail }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValidationResult {
    Accepted(Acceptance),
    Rejected(Rejection),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted(_))
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            ValidationResult::Accepted(_) => None,
            ValidationResult::Rejected(r) => Some(r.reason),
        }
    }
}
