//! Renders `videos/in.mp4` to `outputs/out.mp4` with the default model.

use bodyviz_core::pipeline::pipeline_config::PipelineConfig;
use bodyviz_core::shared::constants::{FIXED_INPUT_PATH, FIXED_OUTPUT_PATH};

mod runner;

fn main() {
    runner::render_or_exit(PipelineConfig::new(FIXED_INPUT_PATH, FIXED_OUTPUT_PATH));
}
