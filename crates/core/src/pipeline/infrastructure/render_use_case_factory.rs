use crate::estimation::infrastructure::estimator_loader::OnnxEstimatorLoader;
use crate::estimation::infrastructure::onnx_body_estimator::DEFAULT_MIN_SCORE;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_logger::StdoutPipelineLogger;
use crate::pipeline::render_video_use_case::RenderVideoUseCase;
use crate::rendering::infrastructure::mesh_overlay_compositor::MeshOverlayCompositor;
use crate::shared::model_resolver::ProgressFn;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Wires the production collaborators: ffmpeg decode/encode, the ONNX body
/// estimator and the side-by-side mesh overlay.
///
/// `download_progress` is called while model files are fetched.
pub fn build_render_use_case(
    config: PipelineConfig,
    download_progress: Option<ProgressFn>,
) -> RenderVideoUseCase {
    RenderVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new()),
        Box::new(OnnxEstimatorLoader::new(DEFAULT_MIN_SCORE, download_progress)),
        Box::new(MeshOverlayCompositor::default()),
        Box::new(StdoutPipelineLogger::new()),
        config,
    )
}
