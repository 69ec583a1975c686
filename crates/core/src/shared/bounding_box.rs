/// Axis-aligned detection box: origin top-left, integer pixel units.
///
/// Locators emit boxes in frame coordinates but make no guarantee they
/// lie inside the frame; a box must pass through [`BoundingBox::clip`]
/// before anything dereferences pixels through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp the box into a `frame_width` × `frame_height` frame.
    ///
    /// Total: never panics, always returns a box satisfying
    /// `0 <= x`, `0 <= y`, `x + width <= frame_width`,
    /// `y + height <= frame_height`, `width >= 1`, `height >= 1`
    /// (degenerate 1×1 at worst). Idempotent.
    pub fn clip(&self, frame_width: u32, frame_height: u32) -> BoundingBox {
        let fw = (frame_width.max(1)) as i32;
        let fh = (frame_height.max(1)) as i32;
        let x = self.x.clamp(0, fw - 1);
        let y = self.y.clamp(0, fh - 1);
        let width = self.width.clamp(1, fw - x);
        let height = self.height.clamp(1, fh - y);
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow the box by `margin` pixels on each side, then clip.
    ///
    /// Used before cropping a face for classification: classifiers do
    /// better with context around the strict detector box.
    pub fn expand(&self, margin: i32, frame_width: u32, frame_height: u32) -> BoundingBox {
        BoundingBox {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2 * margin,
            height: self.height + 2 * margin,
        }
        .clip(frame_width, frame_height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let union = self.area() as f64 + other.area() as f64 - inter;
        inter / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn bbox(x: i32, y: i32, w: i32, h: i32) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    // ── Clip postconditions ──────────────────────────────────────────

    #[rstest]
    #[case::inside(bbox(10, 10, 50, 50))]
    #[case::negative_origin(bbox(-30, -40, 50, 50))]
    #[case::overhanging(bbox(600, 400, 200, 200))]
    #[case::fully_outside(bbox(1000, 1000, 50, 50))]
    #[case::zero_size(bbox(20, 20, 0, 0))]
    #[case::negative_size(bbox(20, 20, -5, -5))]
    fn test_clip_postconditions(#[case] b: BoundingBox) {
        let (fw, fh) = (640u32, 480u32);
        let c = b.clip(fw, fh);
        assert!(c.x >= 0);
        assert!(c.y >= 0);
        assert!(c.width >= 1);
        assert!(c.height >= 1);
        assert!(c.right() <= fw as i32);
        assert!(c.bottom() <= fh as i32);
    }

    #[rstest]
    #[case(bbox(10, 10, 50, 50))]
    #[case(bbox(-30, -40, 5000, 5000))]
    #[case(bbox(639, 479, 10, 10))]
    fn test_clip_idempotent(#[case] b: BoundingBox) {
        let once = b.clip(640, 480);
        let twice = once.clip(640, 480);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clip_keeps_interior_box_unchanged() {
        let b = bbox(100, 100, 200, 150);
        assert_eq!(b.clip(640, 480), b);
    }

    #[test]
    fn test_clip_degenerates_to_unit_box_at_corner() {
        let b = bbox(5000, 5000, 20, 20);
        let c = b.clip(640, 480);
        assert_eq!(c, bbox(639, 479, 1, 1));
    }

    #[test]
    fn test_clip_on_unit_frame_never_panics() {
        let c = bbox(-10, -10, 100, 100).clip(1, 1);
        assert_eq!(c, bbox(0, 0, 1, 1));
    }

    // ── Expand ───────────────────────────────────────────────────────

    #[test]
    fn test_expand_grows_symmetrically() {
        let b = bbox(100, 100, 50, 50);
        let e = b.expand(20, 640, 480);
        assert_eq!(e, bbox(80, 80, 90, 90));
    }

    #[test]
    fn test_expand_clips_at_frame_edge() {
        let b = bbox(5, 5, 50, 50);
        let e = b.expand(20, 640, 480);
        assert_eq!(e.x, 0);
        assert_eq!(e.y, 0);
        // Right/bottom edges keep the full margin
        assert_eq!(e.right(), 75);
        assert_eq!(e.bottom(), 75);
    }

    #[test]
    fn test_expand_zero_margin_is_clip() {
        let b = bbox(-10, 20, 700, 50);
        assert_eq!(b.expand(0, 640, 480), b.clip(640, 480));
    }

    // ── IoU ──────────────────────────────────────────────────────────

    #[test]
    fn test_iou_identical() {
        let b = bbox(10, 10, 100, 100);
        assert_relative_eq!(b.iou(&b), 1.0);
    }

    #[test]
    fn test_iou_disjoint() {
        let a = bbox(0, 0, 50, 50);
        let b = bbox(100, 100, 50, 50);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        // intersection 50×100 = 5000, union 15000
        let a = bbox(0, 0, 100, 100);
        let b = bbox(50, 0, 100, 100);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[test]
    fn test_iou_touching_edges_is_zero() {
        let a = bbox(0, 0, 50, 50);
        let b = bbox(50, 0, 50, 50);
        assert_relative_eq!(a.iou(&b), 0.0);
    }
}
