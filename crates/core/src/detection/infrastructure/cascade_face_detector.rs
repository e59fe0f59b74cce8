//! Frontal face detector backed by the `rustface` crate (SeetaFace
//! funnel-structured cascade).
//!
//! Runs on the grayscale frame over an image pyramid, so faces from
//! `min_size` pixels up to the full frame are found in one pass.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Horizontal/vertical step of the sliding window, in pixels.
const SLIDE_WINDOW_STEP: u32 = 4;

pub struct CascadeFaceDetector {
    model: rustface::Model,
    params: DetectionParams,
}

impl CascadeFaceDetector {
    /// Load a SeetaFace model file (e.g. `seeta_fd_frontal_v1.0.bin`).
    pub fn new(model_path: &Path, params: DetectionParams) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(model_path)
            .map_err(|e| format!("cannot open cascade model {}: {e}", model_path.display()))?;
        let model = rustface::read_model(BufReader::new(file))?;
        Ok(Self { model, params })
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let gray = frame.to_grayscale();
        let pixels = gray.as_slice().ok_or("grayscale buffer is not contiguous")?;

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.params.min_size);
        detector.set_score_thresh(self.params.min_window_score);
        detector.set_pyramid_scale_factor(pyramid_scale_factor(self.params.scale_step));
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let faces = detector.detect(&rustface::ImageData::new(
            pixels,
            frame.width(),
            frame.height(),
        ));

        let raw = faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox::new(
                    bbox.x(),
                    bbox.y(),
                    bbox.width() as i32,
                    bbox.height() as i32,
                )
            })
            .collect();

        Ok(self.params.sanitize(raw, frame.width(), frame.height()))
    }
}

/// Converts a pyramid step (> 1, "grow the window by this much") into the
/// downscale factor rustface expects (< 1, "shrink the image by this much").
fn pyramid_scale_factor(scale_step: f64) -> f32 {
    if scale_step <= 1.0 {
        return 0.8;
    }
    (1.0 / scale_step) as f32
}
