use std::path::PathBuf;

use crate::shared::constants::{DEFAULT_HF_REPO_ID, FALLBACK_FPS, PROGRESS_INTERVAL};

/// Inputs of one render run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Hub repository id (`owner/name`) or a local model directory.
    pub model_id: String,
    /// Used when the source reports a missing or invalid frame rate.
    pub fallback_fps: f64,
    /// Progress is reported every this many processed frames.
    pub progress_interval: usize,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            model_id: DEFAULT_HF_REPO_ID.to_string(),
            fallback_fps: FALLBACK_FPS,
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

/// What a completed run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSummary {
    pub frames_written: usize,
    /// Frames written after the bootstrap frame.
    pub streamed_frames: usize,
    /// Frames the stabilizer had to resize.
    pub resized_frames: usize,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub output: PathBuf,
}
