const BINS: usize = 256;

/// Contrast-limited adaptive histogram equalisation of one 8-bit plane.
///
/// The plane is split into `tiles × tiles` regions (padded on the right and
/// bottom by mirroring when the size is not a multiple). Each region gets an
/// equalisation table whose histogram is clipped at
/// `max(clip_limit * region_area / 256, 1)` with the excess spread over all
/// bins; pixels are mapped by bilinear interpolation between the four
/// nearest region tables.
pub fn clahe(plane: &[u8], width: usize, height: usize, clip_limit: f64, tiles: usize) -> Vec<u8> {
    if width == 0 || height == 0 || tiles == 0 {
        return plane.to_vec();
    }

    let tile_w = width.div_ceil(tiles);
    let tile_h = height.div_ceil(tiles);
    let tile_area = tile_w * tile_h;

    let clip = if clip_limit > 0.0 {
        ((clip_limit * tile_area as f64 / BINS as f64) as usize).max(1)
    } else {
        usize::MAX
    };
    let lut_scale = (BINS - 1) as f32 / tile_area as f32;

    let mut luts = vec![[0u8; BINS]; tiles * tiles];
    for ty in 0..tiles {
        for tx in 0..tiles {
            let mut hist = [0usize; BINS];
            for row in ty * tile_h..(ty + 1) * tile_h {
                let sy = mirror(row, height);
                for col in tx * tile_w..(tx + 1) * tile_w {
                    let sx = mirror(col, width);
                    hist[plane[sy * width + sx] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, clip);

            let lut = &mut luts[ty * tiles + tx];
            let mut cumulative = 0usize;
            for (bin, entry) in lut.iter_mut().enumerate() {
                cumulative += hist[bin];
                *entry = (cumulative as f32 * lut_scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let mut out = vec![0u8; plane.len()];
    for y in 0..height {
        let (ty1, ty2, ya) = neighbours(y as f32 * inv_th - 0.5, tiles);
        for x in 0..width {
            let (tx1, tx2, xa) = neighbours(x as f32 * inv_tw - 0.5, tiles);
            let v = plane[y * width + x] as usize;

            let top = luts[ty1 * tiles + tx1][v] as f32 * (1.0 - xa) + luts[ty1 * tiles + tx2][v] as f32 * xa;
            let bottom = luts[ty2 * tiles + tx1][v] as f32 * (1.0 - xa) + luts[ty2 * tiles + tx2][v] as f32 * xa;
            out[y * width + x] = (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Caps every bin at `clip` and redistributes the excess evenly,
/// leftovers going to bins spaced evenly across the range.
fn clip_histogram(hist: &mut [usize; BINS], clip: usize) {
    let mut excess = 0usize;
    for h in hist.iter_mut() {
        if *h > clip {
            excess += *h - clip;
            *h = clip;
        }
    }
    if excess == 0 {
        return;
    }

    let batch = excess / BINS;
    let mut residual = excess - batch * BINS;
    for h in hist.iter_mut() {
        *h += batch;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut bin = 0;
        while bin < BINS && residual > 0 {
            hist[bin] += 1;
            residual -= 1;
            bin += step;
        }
    }
}

/// Two nearest tile indices along one axis and the weight of the second.
fn neighbours(pos: f32, tiles: usize) -> (usize, usize, f32) {
    let first = pos.floor();
    let weight = pos - first;
    let last = tiles as isize - 1;
    let t1 = (first as isize).clamp(0, last) as usize;
    let t2 = (first as isize + 1).clamp(0, last) as usize;
    (t1, t2, weight)
}

/// Index into a padded axis, mirroring past the end without repeating the edge.
fn mirror(i: usize, len: usize) -> usize {
    if i < len || len == 1 {
        return i.min(len - 1);
    }
    let period = 2 * (len - 1);
    let m = i % period;
    if m < len {
        m
    } else {
        period - m
    }
}
