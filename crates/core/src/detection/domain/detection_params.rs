use crate::shared::constants::{DEFAULT_MIN_FACE_SIZE, DEFAULT_MIN_WINDOW_SCORE, DEFAULT_SCALE_STEP};
use crate::shared::face_box::FaceBox;

/// Multi-scale search grid shared by every detector backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    /// Ratio between consecutive pyramid levels (> 1.0).
    pub scale_step: f64,
    /// Minimum cascade score a merged window needs to count as a face.
    ///
    /// Plays the part of the neighbour vote in window-grouping detectors:
    /// higher values demand more agreement before a face is reported.
    pub min_window_score: f64,
    /// Smallest raw detection kept, in pixels per side.
    pub min_size: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_step: DEFAULT_SCALE_STEP,
            min_window_score: DEFAULT_MIN_WINDOW_SCORE,
            min_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}

impl DetectionParams {
    /// Clips raw boxes to the frame and drops the ones below `min_size`.
    ///
    /// Order is preserved.
    pub fn sanitize(&self, boxes: Vec<FaceBox>, frame_width: u32, frame_height: u32) -> Vec<FaceBox> {
        let min = self.min_size as i32;
        boxes
            .into_iter()
            .map(|b| b.clamp_to(frame_width, frame_height))
            .filter(|b| !b.is_empty() && b.width >= min && b.height >= min)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = DetectionParams::default();
        assert_eq!(p.scale_step, 1.1);
        assert_eq!(p.min_window_score, 2.0);
        assert_eq!(p.min_size, 30);
    }

    #[test]
    fn test_sanitize_drops_small_and_keeps_order() {
        let p = DetectionParams::default();
        let boxes = vec![
            FaceBox::new(10, 10, 40, 40),
            FaceBox::new(100, 100, 20, 20),
            FaceBox::new(200, 10, 35, 35),
        ];
        let kept = p.sanitize(boxes, 640, 480);
        assert_eq!(
            kept,
            vec![FaceBox::new(10, 10, 40, 40), FaceBox::new(200, 10, 35, 35)]
        );
    }

    #[test]
    fn test_sanitize_clips_before_size_check() {
        let p = DetectionParams::default();
        // Only 20 px of this box remain inside a 640-wide frame
        let kept = p.sanitize(vec![FaceBox::new(620, 10, 50, 50)], 640, 480);
        assert!(kept.is_empty());

        let kept = p.sanitize(vec![FaceBox::new(-10, 0, 60, 60)], 640, 480);
        assert_eq!(kept, vec![FaceBox::new(0, 0, 50, 60)]);
    }
}
