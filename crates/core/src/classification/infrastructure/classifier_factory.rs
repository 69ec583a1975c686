use std::path::Path;

use crate::classification::domain::emotion::Classification;
use crate::classification::domain::emotion_classifier::EmotionClassifier;
use crate::pipeline::diagnostics::DiagnosticsSink;
use crate::shared::asset_resolver;
use crate::shared::constants::{EMOTION_MODEL_NAME, EMOTION_MODEL_URL};
use crate::shared::frame::Frame;

use super::onnx_emotion_classifier::OnnxEmotionClassifier;

/// Stand-in used when the emotion model cannot be loaded: every crop
/// classifies as the low-confidence neutral fallback. Keeps the
/// pipeline constructible — and total — without the model.
pub struct NeutralFallbackClassifier;

impl EmotionClassifier for NeutralFallbackClassifier {
    fn classify(&mut self, _face_crop: &Frame) -> Classification {
        Classification::fallback()
    }
}

/// Build the emotion classifier, degrading to the neutral fallback when
/// model weights cannot be resolved or loaded.
pub fn create_classifier(
    bundled_dir: Option<&Path>,
    sink: &mut dyn DiagnosticsSink,
) -> Box<dyn EmotionClassifier> {
    match try_create(bundled_dir) {
        Ok(classifier) => classifier,
        Err(err) => {
            sink.warning(&format!(
                "emotion model unavailable ({err}), classifying everything as neutral"
            ));
            Box::new(NeutralFallbackClassifier)
        }
    }
}

fn try_create(
    bundled_dir: Option<&Path>,
) -> Result<Box<dyn EmotionClassifier>, Box<dyn std::error::Error>> {
    let path = asset_resolver::resolve(EMOTION_MODEL_NAME, EMOTION_MODEL_URL, bundled_dir, None)?;
    Ok(Box::new(OnnxEmotionClassifier::new(&path)?))
}
