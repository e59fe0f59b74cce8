use crate::enhancement::domain::frame_enhancer::FrameEnhancer;
use crate::shared::frame::Frame;

use super::{bilateral, clahe, gaussian, lab};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnhancerConfig {
    pub bilateral_diameter: usize,
    pub bilateral_sigma_color: f64,
    pub bilateral_sigma_space: f64,
    pub unsharp_sigma: f64,
    /// Weight of the blurred image subtracted by the unsharp mask.
    pub unsharp_amount: f32,
    pub clahe_clip_limit: f64,
    pub clahe_tiles: usize,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            bilateral_diameter: 5,
            bilateral_sigma_color: 50.0,
            bilateral_sigma_space: 50.0,
            unsharp_sigma: 2.0,
            unsharp_amount: 0.2,
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
        }
    }
}

/// Denoise → subtle unsharp mask → lightness-only CLAHE.
///
/// Non-RGB frames skip the colour-space step.
#[derive(Clone, Debug, Default)]
pub struct LightEnhancer {
    config: EnhancerConfig,
}

impl LightEnhancer {
    pub fn new(config: EnhancerConfig) -> Self {
        Self { config }
    }
}

impl FrameEnhancer for LightEnhancer {
    fn enhance(&self, frame: &Frame) -> Frame {
        if frame.is_empty() {
            return frame.clone();
        }

        let cfg = &self.config;
        let w = frame.width() as usize;
        let h = frame.height() as usize;
        let channels = frame.channels() as usize;

        let denoised = bilateral::bilateral_filter(
            frame.data(),
            w,
            h,
            channels,
            cfg.bilateral_diameter,
            cfg.bilateral_sigma_color,
            cfg.bilateral_sigma_space,
        );

        let blurred = gaussian::gaussian_blur(&denoised, w, h, channels, cfg.unsharp_sigma);
        let sharpened = unsharp_blend(&denoised, &blurred, cfg.unsharp_amount);

        let data = if channels == 3 {
            let mut planes = lab::rgb_to_lab(&sharpened);
            planes.lightness = clahe::clahe(&planes.lightness, w, h, cfg.clahe_clip_limit, cfg.clahe_tiles);
            lab::lab_to_rgb(&planes)
        } else {
            log::debug!("Skipping exposure correction for {channels}-channel frame");
            sharpened
        };

        Frame::new(data, frame.width(), frame.height(), frame.channels(), frame.index())
    }
}

/// `(1 + amount) * sharp - amount * blurred`, saturated to 8 bits.
fn unsharp_blend(sharp: &[u8], blurred: &[u8], amount: f32) -> Vec<u8> {
    sharp
        .iter()
        .zip(blurred)
        .map(|(&s, &b)| ((1.0 + amount) * s as f32 - amount * b as f32).round().clamp(0.0, 255.0) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured_frame(w: u32, h: u32) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[
                    ((x * 7 + y * 3) % 200 + 20) as u8,
                    ((x * 2 + y * 11) % 180 + 40) as u8,
                    ((x * 5 + y * 5) % 160 + 30) as u8,
                ]);
            }
        }
        Frame::new(data, w, h, 3, 4)
    }

    #[test]
    fn test_keeps_dimensions_and_index() {
        let frame = textured_frame(37, 29);
        let out = LightEnhancer::default().enhance(&frame);
        assert_eq!(out.width(), 37);
        assert_eq!(out.height(), 29);
        assert_eq!(out.channels(), 3);
        assert_eq!(out.index(), 4);
        assert_eq!(out.data().len(), frame.data().len());
    }

    #[test]
    fn test_is_deterministic() {
        let frame = textured_frame(48, 40);
        let enhancer = LightEnhancer::default();
        assert_eq!(enhancer.enhance(&frame), enhancer.enhance(&frame));
    }

    #[test]
    fn test_changes_pixels() {
        let frame = textured_frame(48, 40);
        assert_ne!(LightEnhancer::default().enhance(&frame), frame);
    }

    #[test]
    fn test_empty_frame_passes_through() {
        let frame = Frame::new(Vec::new(), 0, 0, 3, 0);
        assert_eq!(LightEnhancer::default().enhance(&frame), frame);
    }

    #[test]
    fn test_single_channel_frame_keeps_shape() {
        let frame = Frame::new((0..64u8).collect(), 8, 8, 1, 0);
        let out = LightEnhancer::default().enhance(&frame);
        assert_eq!(out.channels(), 1);
        assert_eq!(out.data().len(), 64);
    }

    #[test]
    fn test_unsharp_blend_amplifies_difference() {
        let out = unsharp_blend(&[100, 100, 250], &[50, 100, 0], 0.2);
        assert_eq!(out, vec![110, 100, 255]);
    }
}
