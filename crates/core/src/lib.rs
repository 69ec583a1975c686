pub mod annotation;
pub mod classification;
pub mod detection;
pub mod pipeline;
pub mod shared;

pub use classification::domain::emotion::{Classification, EmotionLabel};
pub use detection::domain::backend_kind::{BackendKind, UnknownBackendError};
pub use pipeline::detection_pipeline::DetectionPipeline;
pub use pipeline::diagnostics::{DiagnosticsSink, LogDiagnostics, NullDiagnostics};
pub use shared::bounding_box::BoundingBox;
pub use shared::frame::Frame;
