use crate::shared::frame::Frame;

/// Domain interface for the post-crop correction pass.
///
/// Must be deterministic and keep the input dimensions and channel count.
/// Only photometric corrections are allowed; no geometric change.
pub trait FrameEnhancer: Send {
    fn enhance(&self, frame: &Frame) -> Frame;
}
