use std::path::Path;

use crate::validation::domain::frame_quality::{assess_frame_quality, FrameQuality};
use crate::video::domain::image_reader::ImageReader;

use super::frame_selector::{FrameSelector, Selection};

/// Verdict for a single still image.
#[derive(Debug)]
pub struct InspectionReport {
    pub quality: FrameQuality,
    pub selection: Selection,
}

/// Runs validation, cropping and enhancement on one still image.
pub struct InspectImageUseCase {
    reader: Box<dyn ImageReader>,
    selector: FrameSelector,
}

impl InspectImageUseCase {
    pub fn new(reader: Box<dyn ImageReader>, selector: FrameSelector) -> Self {
        Self { reader, selector }
    }

    /// Fails when the image cannot be read or the detector errors.
    pub fn execute(&mut self, image_path: &Path) -> Result<InspectionReport, Box<dyn std::error::Error>> {
        let frame = self.reader.read(image_path)?;
        log::info!(
            "Loaded {}: {}x{}",
            image_path.display(),
            frame.width(),
            frame.height()
        );

        let quality = assess_frame_quality(&frame);
        if !quality.is_quality_ok {
            log::debug!("Quality issues: {:?}", quality.issues);
        }

        let selection = self.selector.select(&frame)?;
        Ok(InspectionReport { quality, selection })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::frame_selector::tests::frame_with_face;
    use crate::pipeline::temporal_search::tests::{selector, FACE};
    use crate::shared::frame::Frame;
    use crate::validation::domain::validation_result::RejectReason;

    struct StubReader {
        frame: Option<Frame>,
    }

    impl ImageReader for StubReader {
        fn read(&self, _path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            self.frame.clone().ok_or_else(|| "unreadable".into())
        }
    }

    fn use_case(frame: Option<Frame>) -> InspectImageUseCase {
        InspectImageUseCase::new(Box::new(StubReader { frame }), selector())
    }

    #[test]
    fn test_sharp_face_is_accepted() {
        let report = use_case(Some(frame_with_face(320, 240, Some(FACE), 0)))
            .execute(Path::new("portrait.jpg"))
            .unwrap();

        let Selection::Accepted(crop) = report.selection else {
            panic!("expected acceptance");
        };
        assert_eq!(crop.acceptance.face_count, 1);
        assert!(crop.image.width() > 0);
    }

    #[test]
    fn test_flat_image_is_rejected_with_quality_issues() {
        let report = use_case(Some(frame_with_face(320, 240, None, 0)))
            .execute(Path::new("flat.jpg"))
            .unwrap();

        assert_eq!(
            report.selection.validation().reject_reason(),
            Some(RejectReason::FaceBlurry)
        );
        assert!(report.quality.issues.low_contrast);
        assert!(report.quality.issues.blurry);
        assert!(!report.quality.is_quality_ok);
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        assert!(use_case(None).execute(Path::new("broken.jpg")).is_err());
    }
}
