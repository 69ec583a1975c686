pub mod haar_locator;
pub mod locator_factory;
pub mod math;
pub mod onnx_blazeface_locator;
pub mod onnx_person_locator;
