/// Kernel size for a given sigma on 8-bit images: `round(6σ + 1) | 1`.
pub fn kernel_size_for_sigma(sigma: f64) -> usize {
    ((sigma * 6.0 + 1.0).round() as usize).max(1) | 1
}

/// Precompute a normalised 1D Gaussian kernel.
///
/// `kernel_size` must be odd and >= 1.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    if sigma <= 0.0 {
        let mut identity = vec![0.0; kernel_size];
        identity[kernel_size / 2] = 1.0;
        return identity;
    }
    let half = (kernel_size / 2) as f64;
    let mut kernel_f64: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel_f64.iter().sum();
    for v in &mut kernel_f64 {
        *v /= sum;
    }
    kernel_f64.iter().map(|&v| v as f32).collect()
}

/// Blurs interleaved 8-bit pixels into a new buffer.
///
/// Separable: horizontal pass into an `f32` scratch buffer, then a
/// vertical pass back to `u8`. Borders replicate the edge pixel.
pub fn gaussian_blur(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    sigma: f64,
) -> Vec<u8> {
    let kernel = gaussian_kernel_1d(kernel_size_for_sigma(sigma), sigma);
    let mut out = data.to_vec();
    let mut temp = Vec::new();
    separable_gaussian_blur_with_kernel(&mut out, width, height, channels, &kernel, &mut temp);
    out
}

/// Apply a separable Gaussian blur in place using a pre-computed kernel, reusing `temp`.
pub fn separable_gaussian_blur_with_kernel(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
    temp: &mut Vec<f32>,
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = kernel_size / 2;

    temp.resize(width * height * channels, 0.0);

    // Horizontal pass: data → temp
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - half as isize).clamp(0, (width - 1) as isize)
                        as usize;
                    sum += data[(y * width + sx) * channels + c] as f32 * w;
                }
                temp[(y * width + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp → data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sy = (y as isize + k as isize - half as isize).clamp(0, (height - 1) as isize)
                        as usize;
                    sum += temp[(sy * width + x) * channels + c] * w;
                }
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_size_for_sigma() {
        assert_eq!(kernel_size_for_sigma(2.0), 13);
        assert_eq!(kernel_size_for_sigma(1.0), 7);
        assert_eq!(kernel_size_for_sigma(0.0), 1);
    }

    #[test]
    fn test_kernel_sums_to_one() {
        let k = gaussian_kernel_1d(13, 2.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_kernel_is_symmetric_with_peak_in_centre() {
        let k = gaussian_kernel_1d(13, 2.0);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-6);
            assert!(k[i] < k[6]);
        }
    }

    #[test]
    fn test_blur_uniform_image_unchanged() {
        let data = vec![128u8; 10 * 10 * 3];
        let out = gaussian_blur(&data, 10, 10, 3, 2.0);
        assert!(out.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_blur_spreads_single_bright_pixel() {
        let mut data = vec![0u8; 15 * 15 * 3];
        let cx = 7 * 15 + 7;
        data[cx * 3..cx * 3 + 3].copy_from_slice(&[255, 255, 255]);

        let out = gaussian_blur(&data, 15, 15, 3, 2.0);
        assert!(out[cx * 3] < 255);
        assert!(out[(7 * 15 + 8) * 3] > 0);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let data: Vec<u8> = (0..5 * 5 * 3).map(|v| v as u8).collect();
        assert_eq!(gaussian_blur(&data, 5, 5, 3, 0.0), data);
    }
}
