/// Edge-preserving smoothing of interleaved 8-bit pixels.
///
/// Each output pixel is a weighted mean over a circular window of
/// diameter `diameter`. Weights multiply a spatial Gaussian (`sigma_space`)
/// by a range Gaussian of the L1 colour distance summed over channels
/// (`sigma_color`). Borders replicate the edge pixel.
pub fn bilateral_filter(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    diameter: usize,
    sigma_color: f64,
    sigma_space: f64,
) -> Vec<u8> {
    let radius = (diameter / 2) as isize;
    if radius == 0 || width == 0 || height == 0 || channels == 0 {
        return data.to_vec();
    }

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    let color_weight: Vec<f32> = (0..256 * channels)
        .map(|i| {
            let d = i as f64;
            (d * d * color_coeff).exp() as f32
        })
        .collect();

    let mut taps: Vec<(isize, isize, f32)> = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dy * dy + dx * dx) as f64;
            if r2.sqrt() > radius as f64 {
                continue;
            }
            taps.push((dy, dx, (r2 * space_coeff).exp() as f32));
        }
    }

    let mut out = vec![0u8; data.len()];
    let mut acc = vec![0.0f32; channels];
    for y in 0..height {
        for x in 0..width {
            let centre = (y * width + x) * channels;
            let centre_px = &data[centre..centre + channels];
            acc.iter_mut().for_each(|a| *a = 0.0);
            let mut weight_sum = 0.0f32;

            for &(dy, dx, space_w) in &taps {
                let sy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                let sx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                let idx = (sy * width + sx) * channels;
                let px = &data[idx..idx + channels];

                let dist: usize = px
                    .iter()
                    .zip(centre_px)
                    .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as usize)
                    .sum();
                let w = space_w * color_weight[dist];
                for (a, &v) in acc.iter_mut().zip(px) {
                    *a += v as f32 * w;
                }
                weight_sum += w;
            }

            for (c, a) in acc.iter().enumerate() {
                out[centre + c] = (a / weight_sum).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}
