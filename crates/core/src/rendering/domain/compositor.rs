use crate::estimation::domain::inference_output::{InferenceOutput, MeshTopology};
use crate::shared::frame::Frame;
use crate::shared::rendered_image::RenderedImage;

/// Domain interface for turning an estimate into a drawable image.
///
/// `frame` is the original decoded frame in BGR order. The result may differ
/// in size and pixel type from the input; the pipeline normalizes it.
pub trait Compositor: Send {
    fn composite(
        &self,
        frame: &Frame,
        output: &InferenceOutput,
        faces: &MeshTopology,
    ) -> Result<RenderedImage, Box<dyn std::error::Error>>;
}
