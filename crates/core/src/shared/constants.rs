/// Model repository used when no `--hf_repo_id` is given.
pub const DEFAULT_HF_REPO_ID: &str = "facebook/sam-3d-body-dinov3";

pub const HF_RESOLVE_BASE_URL: &str = "https://huggingface.co";

pub const MODEL_FILE_NAME: &str = "model.onnx";
pub const MESH_FACES_FILE_NAME: &str = "faces.json";

/// Frame rate substituted when the source reports none (or nonsense).
pub const FALLBACK_FPS: f64 = 25.0;

/// Emit a progress line every this many processed frames.
pub const PROGRESS_INTERVAL: usize = 50;

/// Paths used by the fixed-path runner.
pub const FIXED_INPUT_PATH: &str = "videos/in.mp4";
pub const FIXED_OUTPUT_PATH: &str = "outputs/out.mp4";
