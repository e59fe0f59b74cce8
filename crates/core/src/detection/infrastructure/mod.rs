pub mod cascade_face_detector;
mod execution_provider;
pub mod model_resolver;
pub mod onnx_blazeface_detector;
