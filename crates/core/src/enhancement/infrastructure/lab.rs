//! sRGB ↔ CIE L*a*b* (D65) for 8-bit pixels.
//!
//! Lightness is stored the 8-bit way (`L * 255 / 100`) so it can be
//! histogram-equalised directly; chroma stays in floating point so that a
//! round trip touching only lightness does not quantise colour twice.

const WHITE_X: f32 = 0.950456;
const WHITE_Z: f32 = 1.088754;
const EPSILON: f32 = 0.008856;
const KAPPA: f32 = 903.3;

/// Split planes of a Lab image.
pub struct LabPlanes {
    /// Lightness scaled to 0–255.
    pub lightness: Vec<u8>,
    pub a: Vec<f32>,
    pub b: Vec<f32>,
}

pub fn rgb_to_lab(rgb: &[u8]) -> LabPlanes {
    let n = rgb.len() / 3;
    let mut planes = LabPlanes {
        lightness: Vec::with_capacity(n),
        a: Vec::with_capacity(n),
        b: Vec::with_capacity(n),
    };

    for px in rgb.chunks_exact(3) {
        let r = srgb_to_linear(px[0]);
        let g = srgb_to_linear(px[1]);
        let b = srgb_to_linear(px[2]);

        let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / WHITE_X;
        let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
        let z = (0.019334 * r + 0.119193 * g + 0.950227 * b) / WHITE_Z;

        let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
        let l = if y > EPSILON { 116.0 * fy - 16.0 } else { KAPPA * y };

        planes.lightness.push((l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8);
        planes.a.push(500.0 * (fx - fy));
        planes.b.push(200.0 * (fy - fz));
    }
    planes
}

pub fn lab_to_rgb(planes: &LabPlanes) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(planes.lightness.len() * 3);

    for ((&l8, &a), &b) in planes.lightness.iter().zip(&planes.a).zip(&planes.b) {
        let l = l8 as f32 * 100.0 / 255.0;
        let fy = (l + 16.0) / 116.0;
        let fx = fy + a / 500.0;
        let fz = fy - b / 200.0;

        let y = if l > KAPPA * EPSILON { fy * fy * fy } else { l / KAPPA };
        let x = lab_f_inv(fx) * WHITE_X;
        let z = lab_f_inv(fz) * WHITE_Z;

        let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
        let g = -0.969256 * x + 1.875991 * y + 0.041556 * z;
        let bl = 0.055648 * x - 0.204043 * y + 1.057311 * z;

        rgb.push(linear_to_srgb(r));
        rgb.push(linear_to_srgb(g));
        rgb.push(linear_to_srgb(bl));
    }
    rgb
}

fn srgb_to_linear(v: u8) -> f32 {
    let c = v as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let v = if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f32) -> f32 {
    let t = f * f * f;
    if t > EPSILON {
        t
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}
