use std::cmp::Ordering;

use ndarray::s;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{DEFAULT_MIN_BLUR_SCORE, DEFAULT_MIN_FACE_RATIO};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::sharpness::laplacian_variance;
use super::validation_result::{
    Acceptance, CompositionMode, RejectDetail, RejectReason, Rejection, ValidationResult,
};

/// Acceptance thresholds for candidate frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatorConfig {
    /// Smallest face area as a fraction of the frame area.
    pub min_face_ratio: f64,
    /// Smallest Laplacian variance of the largest face.
    pub min_blur_score: f64,
    /// Sharpness that counts as a full blur term in single-shot confidence.
    pub confidence_blur_norm: f64,
    /// Area ratio that counts as a full size term in single-shot confidence.
    pub confidence_area_norm: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_face_ratio: DEFAULT_MIN_FACE_RATIO,
            min_blur_score: DEFAULT_MIN_BLUR_SCORE,
            confidence_blur_norm: 200.0,
            confidence_area_norm: 0.1,
        }
    }
}

/// A raw face box with its share of the frame area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub face_box: FaceBox,
    pub area_ratio: f64,
}

/// Decides whether a frame shows a usable speaker and how to frame it.
///
/// Rejection order: empty frame, no detection, every face too small,
/// largest face blurry. Blur is fatal before the single/group decision.
pub struct FaceValidator {
    detector: Box<dyn FaceDetector>,
    config: ValidatorConfig,
}

impl FaceValidator {
    pub fn new(detector: Box<dyn FaceDetector>, config: ValidatorConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Errors only when the detector backend fails; every content problem
    /// is a `Rejected` value.
    pub fn validate(&mut self, frame: &Frame) -> Result<ValidationResult, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(rejected(RejectReason::InvalidFrame, None));
        }

        let (fw, fh) = (frame.width(), frame.height());
        let detections: Vec<Detection> = self
            .detector
            .detect(frame)?
            .into_iter()
            .map(|face_box| Detection {
                face_box,
                area_ratio: face_box.area_ratio(fw, fh),
            })
            .collect();

        if detections.is_empty() {
            return Ok(rejected(RejectReason::NoFaceDetected, None));
        }

        let mut surviving: Vec<Detection> = detections
            .iter()
            .copied()
            .filter(|d| d.area_ratio >= self.config.min_face_ratio)
            .collect();

        if surviving.is_empty() {
            let largest = largest_first(detections)[0].area_ratio;
            return Ok(rejected(
                RejectReason::FaceTooSmall,
                Some(RejectDetail::AreaRatio(largest)),
            ));
        }

        surviving = largest_first(surviving);
        let largest = surviving[0];

        let region = largest.face_box.clamp_to(fw, fh);
        let gray = frame.to_grayscale();
        let sharpness = laplacian_variance(gray.slice(s![
            region.y as usize..region.bottom() as usize,
            region.x as usize..region.right() as usize
        ]));

        if sharpness < self.config.min_blur_score {
            return Ok(rejected(
                RejectReason::FaceBlurry,
                Some(RejectDetail::Sharpness(sharpness)),
            ));
        }

        let acceptance = if surviving.len() == 1 {
            Acceptance {
                mode: CompositionMode::Single,
                crop_region: largest.face_box,
                sharpness,
                confidence: single_shot_confidence(&self.config, sharpness, largest.area_ratio),
                face_count: 1,
                area_ratio: largest.area_ratio,
            }
        } else {
            let union = FaceBox::union(surviving.iter().map(|d| &d.face_box))
                .unwrap_or(largest.face_box);
            Acceptance {
                mode: CompositionMode::Group,
                crop_region: union,
                sharpness,
                confidence: 1.0,
                face_count: surviving.len(),
                area_ratio: largest.area_ratio,
            }
        };

        Ok(ValidationResult::Accepted(acceptance))
    }
}

/// `clamp01(0.5 * sharpness / blur_norm + 0.5 * area_ratio / area_norm)`.
pub fn single_shot_confidence(config: &ValidatorConfig, sharpness: f64, area_ratio: f64) -> f64 {
    let blur_term = sharpness / config.confidence_blur_norm;
    let area_term = area_ratio / config.confidence_area_norm;
    (0.5 * blur_term + 0.5 * area_term).clamp(0.0, 1.0)
}

/// Stable sort by area ratio, largest first; equal ratios keep detector order.
fn largest_first(mut detections: Vec<Detection>) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.area_ratio
            .partial_cmp(&a.area_ratio)
            .unwrap_or(Ordering::Equal)
    });
    detections
}

fn rejected(reason: RejectReason, detail: Option<RejectDetail>) -> ValidationResult {
    ValidationResult::Rejected(Rejection::new(reason, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // --- Stubs ---

    struct StubDetector {
        boxes: Vec<FaceBox>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            Ok(self.boxes.clone())
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            Err("detector error".into())
        }
    }

    // --- Helpers ---

    fn validator(boxes: Vec<FaceBox>) -> FaceValidator {
        FaceValidator::new(Box::new(StubDetector { boxes }), ValidatorConfig::default())
    }

    /// Flat grey frame with a 1-px checkerboard painted inside each box.
    fn frame_with_sharp(w: u32, h: u32, sharp: &[FaceBox]) -> Frame {
        let mut frame = Frame::new(vec![128; (w * h * 3) as usize], w, h, 3, 0);
        let mut arr = frame.as_ndarray_mut();
        for b in sharp {
            for y in b.y..b.bottom() {
                for x in b.x..b.right() {
                    let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                    for c in 0..3 {
                        arr[[y as usize, x as usize, c]] = v;
                    }
                }
            }
        }
        frame
    }

    fn expect_rejection(result: ValidationResult) -> Rejection {
        match result {
            ValidationResult::Rejected(r) => r,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    fn expect_acceptance(result: ValidationResult) -> Acceptance {
        match result {
            ValidationResult::Accepted(a) => a,
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    // --- Rejections ---

    #[test]
    fn test_empty_frame_is_invalid() {
        let mut v = validator(vec![FaceBox::new(0, 0, 10, 10)]);
        let r = expect_rejection(v.validate(&Frame::new(Vec::new(), 0, 0, 3, 0)).unwrap());
        assert_eq!(r.reason, RejectReason::InvalidFrame);
        assert_eq!(r.detail, None);
    }

    #[test]
    fn test_no_detection() {
        let mut v = validator(vec![]);
        let r = expect_rejection(v.validate(&frame_with_sharp(64, 64, &[])).unwrap());
        assert_eq!(r.reason, RejectReason::NoFaceDetected);
    }

    #[test]
    fn test_tiny_face_on_full_hd_is_too_small() {
        let face = FaceBox::new(800, 300, 10, 10);
        let mut v = validator(vec![face]);
        let r = expect_rejection(v.validate(&frame_with_sharp(1920, 1080, &[face])).unwrap());
        assert_eq!(r.reason, RejectReason::FaceTooSmall);
        match r.detail {
            Some(RejectDetail::AreaRatio(ratio)) => {
                assert_relative_eq!(ratio, 100.0 / 2_073_600.0);
                assert!(ratio < 0.002);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_too_small_reports_largest_raw_detection() {
        let small = FaceBox::new(0, 0, 4, 4);
        let less_small = FaceBox::new(50, 50, 6, 6);
        let mut v = validator(vec![small, less_small]);
        let r = expect_rejection(v.validate(&frame_with_sharp(1000, 1000, &[])).unwrap());
        assert_eq!(r.detail, Some(RejectDetail::AreaRatio(36.0 / 1_000_000.0)));
    }

    #[test]
    fn test_blurry_face_rejected_with_score() {
        let face = FaceBox::new(800, 300, 200, 250);
        let mut v = validator(vec![face]);
        let r = expect_rejection(v.validate(&frame_with_sharp(1920, 1080, &[])).unwrap());
        assert_eq!(r.reason, RejectReason::FaceBlurry);
        assert_eq!(r.detail, Some(RejectDetail::Sharpness(0.0)));
    }

    #[test]
    fn test_blur_checked_on_largest_face_even_in_group() {
        // Small face is sharp, large face is flat: the frame is blurry.
        let large = FaceBox::new(10, 10, 60, 60);
        let small = FaceBox::new(100, 10, 40, 40);
        let mut v = validator(vec![small, large]);
        let r = expect_rejection(v.validate(&frame_with_sharp(200, 100, &[small])).unwrap());
        assert_eq!(r.reason, RejectReason::FaceBlurry);
    }

    #[test]
    fn test_detector_error_propagates() {
        let mut v = FaceValidator::new(Box::new(FailingDetector), ValidatorConfig::default());
        assert!(v.validate(&frame_with_sharp(32, 32, &[])).is_err());
    }

    // --- Acceptance ---

    #[test]
    fn test_single_face_accepted_box_unchanged() {
        let face = FaceBox::new(800, 300, 200, 250);
        let mut v = validator(vec![face]);
        let a = expect_acceptance(v.validate(&frame_with_sharp(1920, 1080, &[face])).unwrap());
        assert_eq!(a.mode, CompositionMode::Single);
        assert_eq!(a.crop_region, face);
        assert_eq!(a.face_count, 1);
        assert!(a.sharpness >= 40.0);
        // Checkerboard is far sharper than the blur norm
        assert_relative_eq!(a.confidence, 1.0);
        assert_relative_eq!(a.area_ratio, 50_000.0 / 2_073_600.0);
    }

    #[test]
    fn test_single_shot_confidence_formula() {
        let config = ValidatorConfig::default();
        let ratio = 50_000.0 / 2_073_600.0;
        let c = single_shot_confidence(&config, 120.0, ratio);
        assert_relative_eq!(c, 0.5 * 0.6 + 0.5 * ratio / 0.1, epsilon = 1e-12);
        assert_relative_eq!(c, 0.4206, epsilon = 1e-4);
    }

    #[test]
    fn test_single_shot_confidence_is_clamped() {
        let config = ValidatorConfig::default();
        assert_relative_eq!(single_shot_confidence(&config, 10_000.0, 0.9), 1.0);
        assert_relative_eq!(single_shot_confidence(&config, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_two_faces_make_group_with_union_region() {
        let a = FaceBox::new(100, 100, 120, 150);
        let b = FaceBox::new(600, 120, 100, 130);
        let mut v = validator(vec![a, b]);
        let result = expect_acceptance(v.validate(&frame_with_sharp(1280, 720, &[a, b])).unwrap());
        assert_eq!(result.mode, CompositionMode::Group);
        assert_eq!(result.face_count, 2);
        assert_eq!(result.crop_region, FaceBox::union(&[a, b]).unwrap());
        assert_eq!(result.crop_region, FaceBox::from_corners(100, 100, 700, 250));
        assert_relative_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_small_faces_do_not_count_towards_group() {
        let face = FaceBox::new(100, 100, 120, 150);
        let speck = FaceBox::new(900, 600, 5, 5);
        let mut v = validator(vec![speck, face]);
        let a = expect_acceptance(v.validate(&frame_with_sharp(1280, 720, &[face])).unwrap());
        assert_eq!(a.mode, CompositionMode::Single);
        assert_eq!(a.crop_region, face);
    }

    #[test]
    fn test_equal_areas_keep_detector_order() {
        let first = FaceBox::new(0, 0, 50, 50);
        let second = FaceBox::new(100, 0, 50, 50);
        let sorted = largest_first(vec![
            Detection { face_box: first, area_ratio: 0.1 },
            Detection { face_box: second, area_ratio: 0.1 },
        ]);
        assert_eq!(sorted[0].face_box, first);
        assert_eq!(sorted[1].face_box, second);
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let face = FaceBox::new(0, 0, 20, 20);
        let config = ValidatorConfig {
            min_face_ratio: 0.5,
            ..ValidatorConfig::default()
        };
        let mut v = FaceValidator::new(Box::new(StubDetector { boxes: vec![face] }), config);
        let r = expect_rejection(v.validate(&frame_with_sharp(40, 40, &[face])).unwrap());
        assert_eq!(r.reason, RejectReason::FaceTooSmall);

        let config = ValidatorConfig {
            min_face_ratio: 0.1,
            ..ValidatorConfig::default()
        };
        let mut v = FaceValidator::new(Box::new(StubDetector { boxes: vec![face] }), config);
        assert!(v.validate(&frame_with_sharp(40, 40, &[face])).unwrap().is_accepted());
    }
}
