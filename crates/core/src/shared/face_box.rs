/// Integer rectangle in frame pixel coordinates.
///
/// Produced by detectors (raw face boxes), by the validator (subject
/// region: a face or the union of several) and by the crop composer
/// (padded bust-shot region).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from corner coordinates `(x1, y1)`–`(x2, y2)`.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Box area divided by frame area.
    pub fn area_ratio(&self, frame_width: u32, frame_height: u32) -> f64 {
        let frame_area = frame_width as f64 * frame_height as f64;
        if frame_area == 0.0 {
            return 0.0;
        }
        self.area() as f64 / frame_area
    }

    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= frame_width as i32
            && self.bottom() <= frame_height as i32
    }

    /// Intersection with the frame rectangle. May be empty.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> FaceBox {
        let x1 = self.x.clamp(0, frame_width as i32);
        let y1 = self.y.clamp(0, frame_height as i32);
        let x2 = self.right().clamp(x1, frame_width as i32);
        let y2 = self.bottom().clamp(y1, frame_height as i32);
        FaceBox::from_corners(x1, y1, x2, y2)
    }

    /// Tight bounding box covering every box in `boxes`, or `None` if empty.
    pub fn union<'a>(boxes: impl IntoIterator<Item = &'a FaceBox>) -> Option<FaceBox> {
        boxes.into_iter().fold(None, |acc, b| {
            Some(match acc {
                None => *b,
                Some(u) => FaceBox::from_corners(
                    u.x.min(b.x),
                    u.y.min(b.y),
                    u.right().max(b.right()),
                    u.bottom().max(b.bottom()),
                ),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    // ── Area ratio ───────────────────────────────────────────────────

    #[test]
    fn test_area_ratio_full_hd() {
        let b = FaceBox::new(800, 300, 200, 250);
        assert_relative_eq!(b.area_ratio(1920, 1080), 50_000.0 / 2_073_600.0);
    }

    #[test]
    fn test_area_ratio_tiny_face() {
        let b = FaceBox::new(800, 300, 10, 10);
        assert!(b.area_ratio(1920, 1080) < 0.0001);
    }

    #[test]
    fn test_area_ratio_empty_frame() {
        assert_relative_eq!(FaceBox::new(0, 0, 10, 10).area_ratio(0, 0), 0.0);
    }

    // ── Union ────────────────────────────────────────────────────────

    #[test]
    fn test_union_of_empty_set() {
        assert!(FaceBox::union(std::iter::empty()).is_none());
    }

    #[test]
    fn test_union_of_single_box_is_identity() {
        let b = FaceBox::new(5, 6, 7, 8);
        assert_eq!(FaceBox::union(&[b]), Some(b));
    }

    #[test]
    fn test_union_of_disjoint_boxes() {
        let a = FaceBox::new(100, 200, 50, 60);
        let b = FaceBox::new(400, 150, 80, 90);
        let u = FaceBox::union(&[a, b]).unwrap();
        assert_eq!(u, FaceBox::from_corners(100, 150, 480, 260));
    }

    // ── Clamping ─────────────────────────────────────────────────────

    #[rstest]
    #[case::inside(FaceBox::new(10, 10, 20, 20), FaceBox::new(10, 10, 20, 20))]
    #[case::overhang_right(FaceBox::new(90, 10, 20, 20), FaceBox::new(90, 10, 10, 20))]
    #[case::negative_origin(FaceBox::new(-5, -5, 20, 20), FaceBox::new(0, 0, 15, 15))]
    #[case::fully_outside(FaceBox::new(150, 150, 20, 20), FaceBox::new(100, 100, 0, 0))]
    fn test_clamp_to(#[case] input: FaceBox, #[case] expected: FaceBox) {
        assert_eq!(input.clamp_to(100, 100), expected);
    }

    #[test]
    fn test_fits_within() {
        assert!(FaceBox::new(0, 0, 100, 100).fits_within(100, 100));
        assert!(!FaceBox::new(1, 0, 100, 100).fits_within(100, 100));
        assert!(!FaceBox::new(-1, 0, 10, 10).fits_within(100, 100));
    }
}
