use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;
use crate::validation::domain::validation_result::CompositionMode;

/// Share of the squaring height added above the subject; the rest goes below.
const SQUARE_TOP_SHARE: f64 = 0.2;

/// Padding around the subject box, as multiples of its size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaddingProfile {
    /// Headroom, × box height.
    pub top: f64,
    /// Shoulders and torso, × box height.
    pub bottom: f64,
    /// Per side, × box width.
    pub side: f64,
}

impl PaddingProfile {
    pub const fn single() -> Self {
        Self {
            top: 0.8,
            bottom: 2.0,
            side: 1.0,
        }
    }

    /// The union box already spans several faces, so it needs less context.
    pub const fn group() -> Self {
        Self {
            top: 0.2,
            bottom: 2.0,
            side: 0.2,
        }
    }
}

/// Turns a subject box into a padded, roughly square bust-shot region.
#[derive(Clone, Debug, PartialEq)]
pub struct CropComposer {
    single: PaddingProfile,
    group: PaddingProfile,
}

impl Default for CropComposer {
    fn default() -> Self {
        Self::new(PaddingProfile::single(), PaddingProfile::group())
    }
}

impl CropComposer {
    pub fn new(single: PaddingProfile, group: PaddingProfile) -> Self {
        Self { single, group }
    }

    pub fn profile(&self, mode: CompositionMode) -> PaddingProfile {
        match mode {
            CompositionMode::Single => self.single,
            CompositionMode::Group => self.group,
        }
    }

    /// Padded crop region, always inside `frame_width × frame_height`.
    ///
    /// Padding is clipped to the frame, then the shorter side is grown
    /// towards a square (extra height mostly below, extra width evenly)
    /// and clipped again. A clipped result may stay rectangular.
    pub fn compose(
        &self,
        frame_width: u32,
        frame_height: u32,
        face_box: FaceBox,
        mode: CompositionMode,
    ) -> FaceBox {
        let fw = frame_width as i32;
        let fh = frame_height as i32;
        let b = face_box.clamp_to(frame_width, frame_height);
        let profile = self.profile(mode);

        let pad_top = (b.height as f64 * profile.top) as i32;
        let pad_bottom = (b.height as f64 * profile.bottom) as i32;
        let pad_side = (b.width as f64 * profile.side) as i32;

        let mut x1 = (b.x - pad_side).max(0);
        let mut y1 = (b.y - pad_top).max(0);
        let mut x2 = (b.right() + pad_side).min(fw);
        let mut y2 = (b.bottom() + pad_bottom).min(fh);

        let crop_w = x2 - x1;
        let crop_h = y2 - y1;
        if crop_w > crop_h {
            let diff = crop_w - crop_h;
            let add_top = (diff as f64 * SQUARE_TOP_SHARE) as i32;
            y1 = (y1 - add_top).max(0);
            y2 = (y2 + diff - add_top).min(fh);
        } else if crop_h > crop_w {
            let half = (crop_h - crop_w) / 2;
            x1 = (x1 - half).max(0);
            x2 = (x2 + half).min(fw);
        }

        FaceBox::from_corners(x1, y1, x2, y2)
    }

    /// Composes the region and copies its pixels out of `frame`.
    pub fn extract(&self, frame: &Frame, face_box: FaceBox, mode: CompositionMode) -> (FaceBox, Frame) {
        let region = self.compose(frame.width(), frame.height(), face_box, mode);
        (region, frame.crop(&region))
    }
}
