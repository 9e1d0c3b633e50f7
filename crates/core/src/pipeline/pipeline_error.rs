use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

type Source = Box<dyn std::error::Error + 'static>;

/// Pipeline stage a frame-level failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    Inference,
    Composite,
    Normalize,
    Stabilize,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameStage::Inference => "inference",
            FrameStage::Composite => "compositing",
            FrameStage::Normalize => "pixel normalization",
            FrameStage::Stabilize => "dimension stabilization",
        };
        f.write_str(name)
    }
}

/// Fatal errors of a render run. Frame numbers are 0-based decode indices.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load model '{model_id}'")]
    Configuration {
        model_id: String,
        #[source]
        source: Source,
    },

    #[error("failed to open input video {}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: Source,
    },

    #[error("failed to open output video {}", path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: Source,
    },

    #[error("input video {} contains no decodable frames", path.display())]
    EmptyInput { path: PathBuf },

    #[error("{stage} failed on frame {frame}")]
    Processing {
        frame: usize,
        stage: FrameStage,
        #[source]
        source: Source,
    },

    #[error("failed to decode frame {frame}")]
    Decode {
        frame: usize,
        #[source]
        source: Source,
    },

    #[error("failed to encode frame {frame}")]
    Encode {
        frame: usize,
        #[source]
        source: Source,
    },

    #[error("failed to finalize output video {}", path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: Source,
    },

    #[error("pipeline already executed")]
    AlreadyExecuted,
}
