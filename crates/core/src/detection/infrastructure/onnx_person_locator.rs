/// Single-shot person detector using ONNX Runtime via `ort`.
///
/// Runs a COCO-trained YOLO export over the whole frame and keeps only
/// detections whose best class is `person`. Person boxes stand in for
/// face boxes: tighter than nothing, and robust at angles where the
/// face-specific backends lose the subject.
use std::path::Path;

use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::math::{nms, RawDetection};

/// Fallback input resolution when the model doesn't declare dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// COCO class index of `person`.
const PERSON_CLASS: usize = 0;

/// Minimum best-class score for a detection to survive.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

pub struct OnnxPersonLocator {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxPersonLocator {
    /// Load the model and run one warm-up inference.
    ///
    /// The first inference on some runtimes is pathologically slow or
    /// can hang outright; paying it here keeps the first real frame
    /// inside the per-frame budget.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        // Read the input resolution from the model's NCHW input shape;
        // dynamic or missing dims fall back to 640.
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        let mut locator = Self {
            session,
            confidence,
            input_size,
        };
        locator.warm_up()?;
        Ok(locator)
    }

    fn warm_up(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let size = self.input_size as usize;
        let zeros = ndarray::Array4::<f32>::zeros((1, 3, size, size));
        let input = ort::value::Tensor::from_array(zeros)?;
        let _ = self.session.run(ort::inputs![input])?;
        Ok(())
    }
}

impl FaceLocator for OnnxPersonLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        let (fw, fh) = (frame.width(), frame.height());

        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);
        let input = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err("person detector produced no outputs".into());
        }

        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape();
        if shape.len() != 3 {
            return Err(format!("unexpected detector output shape: {shape:?}").into());
        }
        // Output is either [1, feats, dets] (transposed) or [1, dets, feats].
        let transposed = shape[1] < shape[2];
        let (num_dets, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        let data = tensor.as_slice().ok_or("cannot view detector output")?;

        let mut dets = decode(
            data,
            num_dets,
            num_feats,
            transposed,
            self.confidence,
            scale,
            pad_x,
            pad_y,
        );
        let kept = nms(&mut dets, NMS_IOU_THRESH);

        Ok(kept
            .iter()
            .map(|d| {
                BoundingBox::new(
                    d.x1.round() as i32,
                    d.y1.round() as i32,
                    (d.x2 - d.x1).round() as i32,
                    (d.y2 - d.y1).round() as i32,
                )
                .clip(fw, fh)
            })
            .collect())
    }
}

/// Parse raw rows `[cx, cy, w, h, class scores...]`, keep rows whose
/// best class is `person` above `confidence`, and map the letterboxed
/// center/size form back to corner coordinates in frame space.
#[allow(clippy::too_many_arguments)]
fn decode(
    data: &[f32],
    num_dets: usize,
    num_feats: usize,
    transposed: bool,
    confidence: f64,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
) -> Vec<RawDetection> {
    let mut dets = Vec::new();
    if num_feats < 5 {
        return dets;
    }

    for i in 0..num_dets {
        let at = |f: usize| {
            if transposed {
                data[f * num_dets + i]
            } else {
                data[i * num_feats + f]
            }
        };

        let (mut best_class, mut best_score) = (0usize, f32::MIN);
        for class in 0..num_feats - 4 {
            let score = at(4 + class);
            if score > best_score {
                best_class = class;
                best_score = score;
            }
        }
        if best_class != PERSON_CLASS || (best_score as f64) < confidence {
            continue;
        }

        let cx = at(0) as f64;
        let cy = at(1) as f64;
        let w = at(2) as f64;
        let h = at(3) as f64;

        dets.push(RawDetection {
            x1: ((cx - w / 2.0) - pad_x as f64) / scale,
            y1: ((cy - h / 2.0) - pad_y as f64) / scale,
            x2: ((cx + w / 2.0) - pad_x as f64) / scale,
            y2: ((cy + h / 2.0) - pad_y as f64) / scale,
            score: best_score as f64,
        });
    }
    dets
}

/// Letterbox-resize a frame to `target` × `target`: aspect-preserving
/// scale, centered, padding filled with the conventional 114 gray.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let (fw, fh) = (frame.width() as f64, frame.height() as f64);
    let scale = (target as f64 / fw).min(target as f64 / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target - new_w) / 2;
    let pad_y = (target - new_h) / 2;

    let pad_value = 114.0f32 / 255.0;
    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target as usize, target as usize),
        pad_value,
    );

    let src = frame.as_ndarray();
    let (src_w, src_h) = (frame.width() as usize, frame.height() as usize);
    for y in 0..new_h as usize {
        let sy = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let sx = ((x as f64 / scale) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, pad_y as usize + y, pad_x as usize + x]] =
                    src[[sy, sx, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}
