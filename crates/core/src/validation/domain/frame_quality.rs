use crate::shared::frame::Frame;

use super::sharpness::laplacian_variance;

const MIN_BRIGHTNESS: f64 = 40.0;
const MAX_BRIGHTNESS: f64 = 220.0;
const MIN_CONTRAST: f64 = 20.0;
const MIN_SHARPNESS: f64 = 50.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QualityIssues {
    pub too_dark: bool,
    pub too_bright: bool,
    pub low_contrast: bool,
    pub blurry: bool,
}

impl QualityIssues {
    pub fn any(&self) -> bool {
        self.too_dark || self.too_bright || self.low_contrast || self.blurry
    }
}

/// Whole-frame exposure and focus diagnostics.
///
/// Informational: acceptance is decided by the face validator alone.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameQuality {
    /// Mean luma, 0–255.
    pub brightness: f64,
    /// Standard deviation of luma.
    pub contrast: f64,
    pub sharpness: f64,
    pub issues: QualityIssues,
    pub is_quality_ok: bool,
}

pub fn assess_frame_quality(frame: &Frame) -> FrameQuality {
    let gray = frame.to_grayscale();
    let n = gray.len().max(1) as f64;

    let brightness = gray.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = gray
        .iter()
        .map(|&v| {
            let d = v as f64 - brightness;
            d * d
        })
        .sum::<f64>()
        / n;
    let contrast = variance.sqrt();
    let sharpness = laplacian_variance(gray.view());

    let issues = QualityIssues {
        too_dark: brightness < MIN_BRIGHTNESS,
        too_bright: brightness > MAX_BRIGHTNESS,
        low_contrast: contrast < MIN_CONTRAST,
        blurry: sharpness < MIN_SHARPNESS,
    };

    FrameQuality {
        brightness,
        contrast,
        sharpness,
        issues,
        is_quality_ok: !issues.any(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gray_frame(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = f(x, y);
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(data, w, h, 3, 0)
    }

    #[test]
    fn test_black_frame_is_dark_flat_and_blurry() {
        let q = assess_frame_quality(&gray_frame(32, 32, |_, _| 0));
        assert_relative_eq!(q.brightness, 0.0);
        assert_relative_eq!(q.contrast, 0.0);
        assert!(q.issues.too_dark);
        assert!(q.issues.low_contrast);
        assert!(q.issues.blurry);
        assert!(!q.issues.too_bright);
        assert!(!q.is_quality_ok);
    }

    #[test]
    fn test_white_frame_is_too_bright() {
        let q = assess_frame_quality(&gray_frame(16, 16, |_, _| 255));
        assert!(q.issues.too_bright);
        assert!(!q.issues.too_dark);
    }

    #[test]
    fn test_checkerboard_passes() {
        let q = assess_frame_quality(&gray_frame(32, 32, |x, y| if (x + y) % 2 == 0 { 40 } else { 200 }));
        assert_relative_eq!(q.brightness, 120.0);
        assert_relative_eq!(q.contrast, 80.0);
        assert!(q.is_quality_ok, "{q:?}");
    }
}
