use crate::estimation::domain::inference_output::{InferenceOutput, MeshTopology};
use crate::shared::frame::Frame;

/// Domain interface for single-image body mesh estimation.
///
/// Implementations may hold model state, hence `&mut self`. Frames must be
/// in RGB order.
pub trait PoseEstimator: Send {
    fn estimate(&mut self, frame: &Frame) -> Result<InferenceOutput, Box<dyn std::error::Error>>;

    /// Mesh topology shared by every estimate this model produces.
    fn faces(&self) -> &MeshTopology;
}

/// Loads an estimator once from a model identifier.
pub trait EstimatorLoader: Send {
    fn load(&self, model_id: &str) -> Result<Box<dyn PoseEstimator>, Box<dyn std::error::Error>>;
}
