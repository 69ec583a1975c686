use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for locating faces in a frame.
///
/// Implementations hold loaded models or scratch state, hence `&mut self`.
/// Returned boxes are in the coordinate space of the frame passed in, but
/// are not guaranteed to lie inside it — callers clip before use.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;
}
