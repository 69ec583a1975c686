use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Minimum standard deviation for a window to be considered textured at
/// all; uniform windows (flat background, flat interiors) are rejected
/// by this stage alone.
const MIN_WINDOW_STDDEV: f64 = 8.0;

/// Minimum |surround mean − center mean| for a window to count as a
/// centered blob.
const MIN_CENTER_CONTRAST: f64 = 12.0;

/// Maximum |left mean − right mean| over the window center; faces are
/// roughly bilaterally symmetric in intensity.
const MAX_LR_IMBALANCE: f64 = 20.0;

/// Raw hits are clustered when they overlap a cluster seed above this.
const GROUP_IOU: f64 = 0.3;

/// Sliding-window parameters for one detection pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeParams {
    /// Geometric growth factor between successive window sizes.
    pub scale_factor: f64,
    /// Overlapping raw hits required before a group becomes a detection.
    pub min_neighbors: usize,
    /// Smallest window edge length, in pixels.
    pub min_size: u32,
}

impl CascadeParams {
    pub const DEFAULT: CascadeParams = CascadeParams {
        scale_factor: 1.1,
        min_neighbors: 5,
        min_size: 30,
    };

    /// Looser pass used once when the default pass finds nothing; cuts
    /// false negatives on small or angled faces.
    pub const PERMISSIVE: CascadeParams = CascadeParams {
        scale_factor: 1.05,
        min_neighbors: 3,
        min_size: 20,
    };
}

/// Multi-scale sliding-window cascade over Haar-like rectangle features.
///
/// Each square window runs through cheap rejection stages computed from
/// an integral image (texture, center-vs-surround contrast, left/right
/// balance); surviving windows are grouped and groups smaller than
/// `min_neighbors` discarded. Entirely self-contained: no model file, no
/// network, construction cannot fail — which is what makes this the
/// fallback every other backend degrades to. No per-window confidence is
/// available; every grouped detection is accepted.
pub struct HaarLocator {
    params: CascadeParams,
}

impl HaarLocator {
    pub fn new() -> Self {
        Self::with_params(CascadeParams::DEFAULT)
    }

    pub fn with_params(params: CascadeParams) -> Self {
        Self { params }
    }
}

impl Default for HaarLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceLocator for HaarLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let gray = to_luma(frame);
        let integral = IntegralImage::new(&gray, frame.width() as usize, frame.height() as usize);

        let mut boxes = detect_pass(&integral, &self.params);
        if boxes.is_empty() && self.params == CascadeParams::DEFAULT {
            boxes = detect_pass(&integral, &CascadeParams::PERMISSIVE);
        }

        Ok(boxes
            .into_iter()
            .map(|b| b.clip(frame.width(), frame.height()))
            .collect())
    }
}

/// Rec. 601 luma, integer arithmetic.
fn to_luma(frame: &Frame) -> Vec<u8> {
    frame
        .data()
        .chunks_exact(3)
        .map(|px| {
            ((299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32) / 1000) as u8
        })
        .collect()
}

fn detect_pass(integral: &IntegralImage, params: &CascadeParams) -> Vec<BoundingBox> {
    let hits = scan(integral, params);
    group(&hits, params.min_neighbors)
}

fn scan(integral: &IntegralImage, params: &CascadeParams) -> Vec<BoundingBox> {
    let (fw, fh) = (integral.width, integral.height);
    let min_dim = fw.min(fh);

    let mut hits = Vec::new();
    let mut window = params.min_size as f64;
    while window.round() as usize <= min_dim {
        let w = window.round() as usize;
        let step = (w / 8).max(2);
        for y in (0..=fh - w).step_by(step) {
            for x in (0..=fw - w).step_by(step) {
                if window_passes(integral, x, y, w) {
                    hits.push(BoundingBox::new(x as i32, y as i32, w as i32, w as i32));
                }
            }
        }
        window *= params.scale_factor;
    }
    hits
}

/// The cascade proper: cheapest stage first, each failure rejects.
fn window_passes(integral: &IntegralImage, x: usize, y: usize, w: usize) -> bool {
    // Stage 1: texture. Uniform windows carry no structure.
    if integral.stddev(x, y, w, w) < MIN_WINDOW_STDDEV {
        return false;
    }

    // Stage 2: center-surround contrast (two-rectangle Haar feature).
    let inset = w / 4;
    let inner_w = w - 2 * inset;
    if inner_w == 0 {
        return false;
    }
    let (ix, iy) = (x + inset, y + inset);
    let center = integral.mean(ix, iy, inner_w, inner_w);
    let window_sum = integral.sum(x, y, w, w) as f64;
    let inner_sum = integral.sum(ix, iy, inner_w, inner_w) as f64;
    let ring_area = (w * w - inner_w * inner_w) as f64;
    let surround = (window_sum - inner_sum) / ring_area;
    if (surround - center).abs() < MIN_CENTER_CONTRAST {
        return false;
    }

    // Stage 3: bilateral balance over the center.
    let half = inner_w / 2;
    if half == 0 {
        return false;
    }
    let left = integral.mean(ix, iy, half, inner_w);
    let right = integral.mean(ix + inner_w - half, iy, half, inner_w);
    (left - right).abs() <= MAX_LR_IMBALANCE
}

/// Min-neighbors grouping: greedy clustering by IoU against the cluster
/// seed, groups below `min_neighbors` dropped, survivors averaged.
fn group(hits: &[BoundingBox], min_neighbors: usize) -> Vec<BoundingBox> {
    let mut clusters: Vec<(BoundingBox, Vec<BoundingBox>)> = Vec::new();
    for hit in hits {
        match clusters
            .iter_mut()
            .find(|(seed, _)| seed.iou(hit) > GROUP_IOU)
        {
            Some((_, members)) => members.push(*hit),
            None => clusters.push((*hit, vec![*hit])),
        }
    }

    clusters
        .into_iter()
        .filter(|(_, members)| members.len() >= min_neighbors.max(1))
        .map(|(_, members)| average(&members))
        .collect()
}

fn average(boxes: &[BoundingBox]) -> BoundingBox {
    let n = boxes.len() as i64;
    let sum = |f: fn(&BoundingBox) -> i32| {
        (boxes.iter().map(|b| f(b) as i64).sum::<i64>() as f64 / n as f64).round() as i32
    };
    BoundingBox::new(sum(|b| b.x), sum(|b| b.y), sum(|b| b.width), sum(|b| b.height))
}

/// Summed-area tables for O(1) rectangle sums and variances.
struct IntegralImage {
    width: usize,
    height: usize,
    sums: Vec<u64>,
    sq_sums: Vec<u64>,
}

impl IntegralImage {
    fn new(gray: &[u8], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        let mut sq_sums = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for x in 0..width {
                let v = gray[y * width + x] as u64;
                row_sum += v;
                row_sq += v * v;
                sums[(y + 1) * stride + (x + 1)] = sums[y * stride + (x + 1)] + row_sum;
                sq_sums[(y + 1) * stride + (x + 1)] = sq_sums[y * stride + (x + 1)] + row_sq;
            }
        }

        Self {
            width,
            height,
            sums,
            sq_sums,
        }
    }

    fn rect(&self, table: &[u64], x: usize, y: usize, w: usize, h: usize) -> u64 {
        let stride = self.width + 1;
        table[(y + h) * stride + (x + w)] + table[y * stride + x]
            - table[y * stride + (x + w)]
            - table[(y + h) * stride + x]
    }

    fn sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        self.rect(&self.sums, x, y, w, h)
    }

    fn mean(&self, x: usize, y: usize, w: usize, h: usize) -> f64 {
        self.sum(x, y, w, h) as f64 / (w * h) as f64
    }

    fn stddev(&self, x: usize, y: usize, w: usize, h: usize) -> f64 {
        let n = (w * h) as f64;
        let mean = self.sum(x, y, w, h) as f64 / n;
        let sq_mean = self.rect(&self.sq_sums, x, y, w, h) as f64 / n;
        (sq_mean - mean * mean).max(0.0).sqrt()
    }
}
