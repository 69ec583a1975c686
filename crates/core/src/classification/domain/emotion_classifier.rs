use crate::classification::domain::emotion::Classification;
use crate::shared::frame::Frame;

/// Domain interface for classifying the dominant emotion of one face.
///
/// Total by contract: implementations recover internally and return
/// [`Classification::fallback`] instead of surfacing an error, so a bad
/// crop can never abort the frame it came from. The crop is an
/// already-located face region — implementations must not re-run face
/// detection on it.
pub trait EmotionClassifier: Send {
    fn classify(&mut self, face_crop: &Frame) -> Classification;
}
