use std::time::Instant;

use crate::estimation::domain::pose_estimator::{EstimatorLoader, PoseEstimator};
use crate::rendering::domain::compositor::Compositor;
use crate::shared::frame::{Frame, PixelOrder};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::dimension_stabilizer::DimensionStabilizer;
use super::pipeline_config::{PipelineConfig, RenderSummary};
use super::pipeline_error::{FrameStage, PipelineError};
use super::pipeline_logger::PipelineLogger;

const OUTPUT_CODEC: &str = "mpeg4";

/// Lifecycle of a render run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    Bootstrap,
    Streaming,
    Done,
    Failed,
}

/// Renders a video frame by frame: decode, estimate, composite, stabilize
/// the output size, encode.
///
/// Single-use: `execute` takes ownership of the collaborators, so a second
/// call returns [`PipelineError::AlreadyExecuted`]. Whatever was opened is
/// closed exactly once on every exit path, sink before source.
pub struct RenderVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    loader: Option<Box<dyn EstimatorLoader>>,
    compositor: Option<Box<dyn Compositor>>,
    logger: Box<dyn PipelineLogger>,
    config: PipelineConfig,
    stage: PipelineStage,
}

/// Per-run mutable state threaded through the frame loop.
struct RunState {
    stabilizer: DimensionStabilizer,
    fps: f64,
    total_frames: usize,
    processed: usize,
    sink_open: bool,
}

impl RenderVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        loader: Box<dyn EstimatorLoader>,
        compositor: Box<dyn Compositor>,
        logger: Box<dyn PipelineLogger>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            loader: Some(loader),
            compositor: Some(compositor),
            logger,
            config,
            stage: PipelineStage::Init,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn execute(&mut self) -> Result<RenderSummary, PipelineError> {
        let (Some(mut reader), Some(mut writer), Some(loader), Some(compositor)) = (
            self.reader.take(),
            self.writer.take(),
            self.loader.take(),
            self.compositor.take(),
        ) else {
            return Err(PipelineError::AlreadyExecuted);
        };

        let result = self.run(
            reader.as_mut(),
            writer.as_mut(),
            loader.as_ref(),
            compositor.as_ref(),
        );
        match &result {
            Ok(summary) => {
                self.enter(PipelineStage::Done);
                self.logger.info(&format!(
                    "Done. Saved rendered video to: {}",
                    summary.output.display()
                ));
                self.logger.info(&format!(
                    "Wrote {} frames at {}x{} @ {:.3} FPS ({} resized)",
                    summary.frames_written,
                    summary.width,
                    summary.height,
                    summary.fps,
                    summary.resized_frames
                ));
                self.logger.summary();
            }
            Err(e) => {
                self.enter(PipelineStage::Failed);
                log::debug!("Render failed: {e}");
            }
        }
        result
    }

    /// INIT then the frame loop, followed by teardown of whatever opened.
    fn run(
        &mut self,
        reader: &mut dyn VideoReader,
        writer: &mut dyn VideoWriter,
        loader: &dyn EstimatorLoader,
        compositor: &dyn Compositor,
    ) -> Result<RenderSummary, PipelineError> {
        self.enter(PipelineStage::Init);
        self.logger.info(&format!("Input video: {}", self.config.input.display()));
        self.logger
            .info(&format!("Output video: {}", self.config.output.display()));
        self.logger.info(&format!("Model: {}", self.config.model_id));

        let mut estimator =
            loader
                .load(&self.config.model_id)
                .map_err(|source| PipelineError::Configuration {
                    model_id: self.config.model_id.clone(),
                    source,
                })?;
        self.logger.info("Model loaded");

        let metadata =
            reader
                .open(&self.config.input)
                .map_err(|source| PipelineError::OpenInput {
                    path: self.config.input.clone(),
                    source,
                })?;

        let fps = metadata.effective_fps(self.config.fallback_fps);
        if fps != metadata.fps {
            log::debug!(
                "Source reports {} FPS, using fallback {fps}",
                metadata.fps
            );
        }
        let mut state = RunState {
            stabilizer: DimensionStabilizer::new(),
            fps,
            total_frames: metadata.total_frames,
            processed: 0,
            sink_open: false,
        };

        let result = self.stream(
            reader,
            writer,
            estimator.as_mut(),
            compositor,
            &mut state,
        );

        // Sink first so its trailer is written even when the run failed.
        let finalized = if state.sink_open {
            writer.close()
        } else {
            Ok(())
        };
        reader.close();

        match (result, finalized) {
            (Ok(summary), Ok(())) => Ok(summary),
            (Ok(_), Err(source)) => Err(PipelineError::Finalize {
                path: self.config.output.clone(),
                source,
            }),
            (Err(e), Err(close_err)) => {
                log::warn!(
                    "Failed to finalize {} after error: {close_err}",
                    self.config.output.display()
                );
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }

    /// BOOTSTRAP and STREAMING.
    fn stream(
        &mut self,
        reader: &mut dyn VideoReader,
        writer: &mut dyn VideoWriter,
        estimator: &mut dyn PoseEstimator,
        compositor: &dyn Compositor,
        state: &mut RunState,
    ) -> Result<RenderSummary, PipelineError> {
        self.enter(PipelineStage::Bootstrap);
        let mut frames = reader.frames();

        let decode_start = Instant::now();
        let first = match frames.next() {
            Some(frame) => frame.map_err(|source| PipelineError::Decode { frame: 0, source })?,
            None => {
                return Err(PipelineError::EmptyInput {
                    path: self.config.input.clone(),
                })
            }
        };
        self.logger.timing("decode", elapsed_ms(decode_start));

        let rendered = self.render(first, 0, estimator, compositor, state)?;
        let (width, height) = rendered.dimensions();

        let output_metadata = VideoMetadata {
            width,
            height,
            fps: state.fps,
            total_frames: state.total_frames,
            codec: OUTPUT_CODEC.to_string(),
            source_path: Some(self.config.output.clone()),
        };
        writer
            .open(&self.config.output, &output_metadata)
            .map_err(|source| PipelineError::OpenOutput {
                path: self.config.output.clone(),
                source,
            })?;
        state.sink_open = true;
        self.logger.info(&format!(
            "Rendered frame size: {width}x{height} @ {} FPS",
            state.fps
        ));
        self.encode(writer, &rendered, state)?;

        self.enter(PipelineStage::Streaming);
        loop {
            let index = state.processed;
            let decode_start = Instant::now();
            let Some(next) = frames.next() else {
                break;
            };
            let frame = next.map_err(|source| PipelineError::Decode {
                frame: index,
                source,
            })?;
            self.logger.timing("decode", elapsed_ms(decode_start));

            let rendered = self.render(frame, index, estimator, compositor, state)?;
            self.encode(writer, &rendered, state)?;
        }

        Ok(RenderSummary {
            frames_written: state.processed,
            streamed_frames: state.processed.saturating_sub(1),
            resized_frames: state.stabilizer.resized_count(),
            width,
            height,
            fps: state.fps,
            output: self.config.output.clone(),
        })
    }

    /// Estimate, composite, normalize to 8-bit BGR, stabilize.
    fn render(
        &mut self,
        frame: Frame,
        index: usize,
        estimator: &mut dyn PoseEstimator,
        compositor: &dyn Compositor,
        state: &mut RunState,
    ) -> Result<Frame, PipelineError> {
        let processing = |stage: FrameStage| {
            move |source: Box<dyn std::error::Error>| PipelineError::Processing {
                frame: index,
                stage,
                source,
            }
        };

        let start = Instant::now();
        let output = estimator
            .estimate(&frame.to_order(PixelOrder::Rgb))
            .map_err(processing(FrameStage::Inference))?;
        self.logger.timing("infer", elapsed_ms(start));
        self.logger.metric("people", output.people.len() as f64);

        let bgr = frame.into_order(PixelOrder::Bgr);
        let start = Instant::now();
        let rendered = compositor
            .composite(&bgr, &output, estimator.faces())
            .map_err(processing(FrameStage::Composite))?;
        self.logger.timing("composite", elapsed_ms(start));

        let normalized = rendered
            .into_frame(index)
            .map_err(processing(FrameStage::Normalize))?
            .into_order(PixelOrder::Bgr);

        let start = Instant::now();
        let stable = state
            .stabilizer
            .stabilize(normalized)
            .map_err(processing(FrameStage::Stabilize))?;
        self.logger.timing("stabilize", elapsed_ms(start));
        Ok(stable)
    }

    fn encode(
        &mut self,
        writer: &mut dyn VideoWriter,
        frame: &Frame,
        state: &mut RunState,
    ) -> Result<(), PipelineError> {
        let start = Instant::now();
        writer
            .write(frame)
            .map_err(|source| PipelineError::Encode {
                frame: state.processed,
                source,
            })?;
        self.logger.timing("encode", elapsed_ms(start));

        state.processed += 1;
        if state.processed % self.config.progress_interval.max(1) == 0 {
            self.logger.progress(state.processed, state.total_frames);
        }
        Ok(())
    }

    fn enter(&mut self, stage: PipelineStage) {
        log::debug!("Pipeline stage: {:?} -> {stage:?}", self.stage);
        self.stage = stage;
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
