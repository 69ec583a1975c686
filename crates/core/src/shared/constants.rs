pub const PERSON_MODEL_NAME: &str = "yolov8n-coco.onnx";
pub const PERSON_MODEL_URL: &str =
    "https://github.com/moodframe/moodframe/releases/download/v0.1.0/yolov8n-coco.onnx";

pub const BLAZEFACE_MODEL_NAME: &str = "blazeface-short-range.onnx";
pub const BLAZEFACE_MODEL_URL: &str =
    "https://github.com/moodframe/moodframe/releases/download/v0.1.0/blazeface-short-range.onnx";

pub const EMOTION_MODEL_NAME: &str = "enet-b0-affectnet.onnx";
pub const EMOTION_MODEL_URL: &str =
    "https://github.com/moodframe/moodframe/releases/download/v0.1.0/enet-b0-affectnet.onnx";

pub const LABEL_FONT_NAME: &str = "DejaVuSans.ttf";
pub const LABEL_FONT_URL: &str =
    "https://github.com/moodframe/moodframe/releases/download/v0.1.0/DejaVuSans.ttf";

/// Edge length the emotion model expects its input normalized to.
pub const CANONICAL_FACE_SIZE: u32 = 224;

/// Margin added around a detector box before cropping for classification.
pub const CROP_MARGIN: i32 = 20;

/// Detection and annotation run at or below this working resolution.
pub const MAX_WORKING_WIDTH: u32 = 640;
pub const MAX_WORKING_HEIGHT: u32 = 480;
