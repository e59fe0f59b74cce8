use crate::composition::domain::crop_composer::CropComposer;
use crate::enhancement::domain::frame_enhancer::FrameEnhancer;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;
use crate::validation::domain::face_validator::FaceValidator;
use crate::validation::domain::validation_result::{Acceptance, Rejection, ValidationResult};

/// An accepted frame after cropping and enhancement.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedCrop {
    pub image: Frame,
    /// Padded region of the source frame the image was cut from.
    pub crop_region: FaceBox,
    pub acceptance: Acceptance,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Accepted(SelectedCrop),
    Rejected(Rejection),
}

impl Selection {
    pub fn validation(&self) -> ValidationResult {
        match self {
            Selection::Accepted(crop) => ValidationResult::Accepted(crop.acceptance.clone()),
            Selection::Rejected(r) => ValidationResult::Rejected(r.clone()),
        }
    }
}

/// Validate → compose → enhance for a single decoded frame.
pub struct FrameSelector {
    validator: FaceValidator,
    composer: CropComposer,
    enhancer: Box<dyn FrameEnhancer>,
}

impl FrameSelector {
    pub fn new(validator: FaceValidator, composer: CropComposer, enhancer: Box<dyn FrameEnhancer>) -> Self {
        Self {
            validator,
            composer,
            enhancer,
        }
    }

    /// Fails only on detector errors.
    pub fn select(&mut self, frame: &Frame) -> Result<Selection, Box<dyn std::error::Error>> {
        let acceptance = match self.validator.validate(frame)? {
            ValidationResult::Accepted(a) => a,
            ValidationResult::Rejected(r) => return Ok(Selection::Rejected(r)),
        };

        let (crop_region, crop) = self
            .composer
            .extract(frame, acceptance.crop_region, acceptance.mode);
        let image = self.enhancer.enhance(&crop);

        Ok(Selection::Accepted(SelectedCrop {
            image,
            crop_region,
            acceptance,
        }))
    }
}
