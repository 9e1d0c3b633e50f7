use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate as reported by the container; 0.0 when unknown.
    pub fps: f64,
    /// 0 when the container does not report a frame count.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// The reported frame rate, or `fallback` when it is missing,
    /// non-positive or not finite.
    pub fn effective_fps(&self, fallback: f64) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            fallback
        }
    }
}
