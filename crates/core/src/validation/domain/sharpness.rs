use ndarray::ArrayView2;

/// Focus score: population variance of the 4-neighbour Laplacian.
///
/// Kernel `[0 1 0; 1 -4 1; 0 1 0]`, borders mirrored without repeating the
/// edge pixel (`gfedcb|abcdefgh|gfedcba`). Higher means sharper.
pub fn laplacian_variance(gray: ArrayView2<'_, u8>) -> f64 {
    let (h, w) = gray.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }

    let at = |r: isize, c: isize| -> f64 { gray[[reflect_101(r, h), reflect_101(c, w)]] as f64 };

    let n = (h * w) as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for r in 0..h as isize {
        for c in 0..w as isize {
            let lap = at(r - 1, c) + at(r + 1, c) + at(r, c - 1) + at(r, c + 1) - 4.0 * at(r, c);
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = i;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}
