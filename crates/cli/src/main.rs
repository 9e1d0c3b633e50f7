use std::path::PathBuf;

use clap::Parser;

use bodyviz_core::pipeline::pipeline_config::PipelineConfig;
use bodyviz_core::shared::constants::DEFAULT_HF_REPO_ID;

mod runner;

/// Render a body mesh estimate over every frame of a video.
#[derive(Parser, Debug)]
#[command(name = "bodyviz")]
struct Cli {
    /// Input video file.
    #[arg(long)]
    input: PathBuf,

    /// Output video file (MPEG-4). Parent directories are created.
    #[arg(long)]
    output: PathBuf,

    /// Hugging Face model repository, or a local directory with
    /// model.onnx and faces.json.
    #[arg(long = "hf_repo_id", default_value = DEFAULT_HF_REPO_ID)]
    hf_repo_id: String,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig::new(self.input, self.output).with_model_id(self.hf_repo_id)
    }
}

fn main() {
    runner::render_or_exit(Cli::parse().into_config());
}
