/// Emotion classifier using ONNX Runtime via `ort`.
///
/// An AffectNet-trained EfficientNet-B0 export with eight output
/// classes. The classifier is total: every internal failure collapses
/// to the low-confidence neutral fallback.
use std::path::Path;

use crate::classification::domain::emotion::{Classification, EmotionLabel};
use crate::classification::domain::emotion_classifier::EmotionClassifier;
use crate::shared::constants::CANONICAL_FACE_SIZE;
use crate::shared::frame::Frame;

/// ImageNet channel statistics the backbone was trained with.
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self { session })
    }

    fn infer(&mut self, face_crop: &Frame) -> Result<EmotionLabel, Box<dyn std::error::Error>> {
        if face_crop.is_empty() {
            return Err("empty face crop".into());
        }

        // The model is size-sensitive; every crop goes through the same
        // canonical square resolution regardless of detector box shape.
        let canonical = canonicalize(face_crop);
        let input = ort::value::Tensor::from_array(preprocess(&canonical))?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err("emotion model produced no outputs".into());
        }

        let tensor = outputs[0].try_extract_array::<f32>()?;
        let logits = tensor.as_slice().ok_or("cannot view emotion logits")?;
        let probabilities = softmax(logits);

        let (best, _) = probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or("emotion model produced no classes")?;

        label_from_index(best).ok_or_else(|| format!("unexpected class index {best}").into())
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&mut self, face_crop: &Frame) -> Classification {
        recover(self.infer(face_crop))
    }
}

/// Collapse an inference outcome into a total result: the dominant
/// label at full confidence, or the low-confidence neutral fallback.
fn recover(outcome: Result<EmotionLabel, Box<dyn std::error::Error>>) -> Classification {
    match outcome {
        Ok(label) => Classification {
            label,
            confidence: 1.0,
        },
        Err(err) => {
            // Expected on featureless or heavily occluded crops; not
            // worth an operator-visible warning per face.
            log::debug!("emotion inference failed, using fallback: {err}");
            Classification::fallback()
        }
    }
}

/// Resize a crop to the canonical square resolution.
fn canonicalize(crop: &Frame) -> Frame {
    if crop.width() == CANONICAL_FACE_SIZE && crop.height() == CANONICAL_FACE_SIZE {
        return crop.clone();
    }
    let resized = image::imageops::resize(
        &crop.to_rgb_image(),
        CANONICAL_FACE_SIZE,
        CANONICAL_FACE_SIZE,
        image::imageops::FilterType::Triangle,
    );
    Frame::from_rgb_image(&resized)
}

/// ImageNet-normalized NCHW float32 tensor.
fn preprocess(canonical: &Frame) -> ndarray::Array4<f32> {
    let size = CANONICAL_FACE_SIZE as usize;
    let src = canonical.as_ndarray();
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
    for y in 0..size {
        for x in 0..size {
            for c in 0..3 {
                let v = src[[y, x, c]] as f32 / 255.0;
                tensor[[0, c, y, x]] = (v - MEAN[c]) / STD[c];
            }
        }
    }
    tensor
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|&v| v / total).collect()
}

/// Model output order (alphabetical AffectNet labels). `contempt` has
/// no counterpart in the vocabulary and folds into `disgust`.
fn label_from_index(index: usize) -> Option<EmotionLabel> {
    match index {
        0 => Some(EmotionLabel::Angry),
        1 => Some(EmotionLabel::Disgust), // contempt
        2 => Some(EmotionLabel::Disgust),
        3 => Some(EmotionLabel::Fear),
        4 => Some(EmotionLabel::Happy),
        5 => Some(EmotionLabel::Neutral),
        6 => Some(EmotionLabel::Sad),
        7 => Some(EmotionLabel::Surprise),
        _ => None,
    }
}
