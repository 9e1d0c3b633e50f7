pub mod estimator_loader;
mod execution_provider;
pub mod onnx_body_estimator;
