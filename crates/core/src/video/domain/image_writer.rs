use std::path::Path;

use crate::shared::frame::Frame;

/// Writes a single frame to an image file.
pub trait ImageWriter: Send {
    /// Writes a frame to the given path; `quality` (1–100) applies to lossy formats.
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        quality: Option<u8>,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
