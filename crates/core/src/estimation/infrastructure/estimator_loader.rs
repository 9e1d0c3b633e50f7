use crate::estimation::domain::pose_estimator::{EstimatorLoader, PoseEstimator};
use crate::shared::constants::{MESH_FACES_FILE_NAME, MODEL_FILE_NAME};
use crate::shared::model_resolver::{self, ProgressFn};

use super::onnx_body_estimator::{OnnxBodyEstimator, DEFAULT_MIN_SCORE};

/// Resolves `model.onnx` and `faces.json` for a repository id (or local
/// directory) and builds an [`OnnxBodyEstimator`] from them.
pub struct OnnxEstimatorLoader {
    min_score: f32,
    progress: Option<ProgressFn>,
}

impl OnnxEstimatorLoader {
    pub fn new(min_score: f32, progress: Option<ProgressFn>) -> Self {
        Self {
            min_score,
            progress,
        }
    }
}

impl Default for OnnxEstimatorLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCORE, None)
    }
}

impl EstimatorLoader for OnnxEstimatorLoader {
    fn load(&self, model_id: &str) -> Result<Box<dyn PoseEstimator>, Box<dyn std::error::Error>> {
        let model_path = model_resolver::resolve(model_id, MODEL_FILE_NAME, self.progress.as_ref())?;
        let faces_path =
            model_resolver::resolve(model_id, MESH_FACES_FILE_NAME, self.progress.as_ref())?;

        let estimator = OnnxBodyEstimator::new(&model_path, &faces_path, self.min_score)?;
        Ok(Box::new(estimator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_directory_without_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let loader = OnnxEstimatorLoader::default();
        let err = loader
            .load(dir.path().to_str().unwrap())
            .err()
            .expect("loading an empty directory must fail");
        assert!(err.to_string().contains("model.onnx"));
    }

    #[test]
    fn test_load_from_directory_without_faces_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"not a model").unwrap();
        let loader = OnnxEstimatorLoader::default();
        let err = loader
            .load(dir.path().to_str().unwrap())
            .err()
            .expect("loading without faces.json must fail");
        assert!(err.to_string().contains("faces.json"));
    }
}
