use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for frontal face detection.
///
/// Returns raw boxes in detector order; callers rely on that order to
/// break ties between equally sized faces. Implementations may keep
/// per-call scratch state, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;
}
