pub mod classifier_factory;
pub mod onnx_emotion_classifier;
