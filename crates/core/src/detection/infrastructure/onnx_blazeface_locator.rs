/// BlazeFace short-range face detector using ONNX Runtime via `ort`.
///
/// The landmark-family detector: anchor-based decode over a 128×128
/// input, producing coordinates **relative** to the frame (0–1) that are
/// scaled by frame width/height before use. Input must be RGB, which the
/// `Frame` contract already guarantees.
use std::path::Path;

use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::math::{nms, sigmoid, RawDetection};

/// Model input resolution.
const INPUT_SIZE: u32 = 128;

/// Default score threshold after sigmoid.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold (applied in relative coordinates).
const NMS_IOU_THRESH: f64 = 0.3;

/// Anchor count for the short-range model: 16×16×2 + 8×8×6.
const NUM_ANCHORS: usize = 896;

/// Values per regressor row: box deltas + 6 keypoints, unused here.
const REGRESSOR_WIDTH: usize = 16;

pub struct OnnxBlazefaceLocator {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceLocator {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceLocator for OnnxBlazefaceLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        let (fw, fh) = (frame.width(), frame.height());

        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input])?;

        // Two outputs: regressors [1, 896, 16] and scores [1, 896, 1].
        if outputs.len() < 2 {
            return Err(format!("face model expected 2 outputs, got {}", outputs.len()).into());
        }
        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("cannot view regressors")?;
        let score_data = scores.as_slice().ok_or("cannot view scores")?;

        let mut relative = decode_relative(reg_data, score_data, &self.anchors, self.confidence);
        let kept = nms(&mut relative, NMS_IOU_THRESH);

        // Relative → pixel coordinates.
        Ok(kept
            .iter()
            .map(|d| {
                let x = (d.x1 * fw as f64).round() as i32;
                let y = (d.y1 * fh as f64).round() as i32;
                let w = ((d.x2 - d.x1) * fw as f64).round() as i32;
                let h = ((d.y2 - d.y1) * fh as f64).round() as i32;
                BoundingBox::new(x, y, w, h).clip(fw, fh)
            })
            .collect())
    }
}

/// Decode anchor-relative regressors into unit-square corner boxes,
/// keeping anchors whose sigmoid score clears `confidence`.
fn decode_relative(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    confidence: f64,
) -> Vec<RawDetection> {
    let mut dets = Vec::new();
    let count = anchors.len().min(score_data.len()).min(NUM_ANCHORS);

    for (i, anchor) in anchors.iter().enumerate().take(count) {
        let score = sigmoid(score_data[i]) as f64;
        if score < confidence {
            continue;
        }

        let base = i * REGRESSOR_WIDTH;
        if base + 4 > reg_data.len() {
            break;
        }

        // Regressors are offsets in input pixels from the anchor center.
        let cx = anchor[0] + reg_data[base] / INPUT_SIZE as f32;
        let cy = anchor[1] + reg_data[base + 1] / INPUT_SIZE as f32;
        let w = reg_data[base + 2] / INPUT_SIZE as f32;
        let h = reg_data[base + 3] / INPUT_SIZE as f32;

        dets.push(RawDetection {
            x1: ((cx - w / 2.0) as f64).clamp(0.0, 1.0),
            y1: ((cy - h / 2.0) as f64).clamp(0.0, 1.0),
            x2: ((cx + w / 2.0) as f64).clamp(0.0, 1.0),
            y2: ((cy + h / 2.0) as f64).clamp(0.0, 1.0),
            score,
        });
    }
    dets
}

/// Resize to `size` × `size` and normalize to [-1, 1] NCHW float32, the
/// range this detector family is trained on.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let (src_w, src_h) = (frame.width() as usize, frame.height() as usize);
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    for y in 0..s {
        let sy = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let sx = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[sy, sx, c]] as f32 - 127.5) / 127.5;
            }
        }
    }
    tensor
}

/// Anchor centers for the short-range model: two feature maps (16×16
/// with 2 anchors per cell, 8×8 with 6), all in unit coordinates.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8usize, 2usize), (16, 6)];
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, per_cell) in &strides {
        let grid = INPUT_SIZE as usize / stride;
        for y in 0..grid {
            for x in 0..grid {
                let cx = (x as f32 + 0.5) / grid as f32;
                let cy = (y as f32 + 0.5) / grid as f32;
                for _ in 0..per_cell {
                    anchors.push([cx, cy]);
                }
            }
        }
    }
    anchors
}
