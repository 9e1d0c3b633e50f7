use crate::estimation::domain::inference_output::{InferenceOutput, MeshTopology, PersonEstimate};
use crate::rendering::domain::compositor::Compositor;
use crate::shared::frame::{Frame, PixelOrder};
use crate::shared::rendered_image::RenderedImage;

use super::canvas::{ClipRect, FloatCanvas};

/// Light blue in BGR.
pub const DEFAULT_MESH_COLOR: [u8; 3] = [219, 189, 166];
pub const DEFAULT_MESH_ALPHA: f32 = 0.6;

/// Draws every estimated mesh as an alpha-blended wireframe.
///
/// With `side_by_side` the output is twice as wide: the untouched frame on
/// the left, the overlay on the right. Blending happens in floating point,
/// so the result is a [`RenderedImage::Float`] in BGR order.
pub struct MeshOverlayCompositor {
    color: [f32; 3],
    alpha: f32,
    side_by_side: bool,
}

impl MeshOverlayCompositor {
    pub fn new(mesh_color: [u8; 3], alpha: f32, side_by_side: bool) -> Self {
        Self {
            color: mesh_color.map(f32::from),
            alpha: alpha.clamp(0.0, 1.0),
            side_by_side,
        }
    }

    fn draw_person(
        &self,
        canvas: &mut FloatCanvas,
        person: &PersonEstimate,
        edges: &[(u32, u32)],
        panel: ClipRect,
    ) {
        let offset = panel.x as f32;
        for &(a, b) in edges {
            let (va, vb) = (person.vertices[a as usize], person.vertices[b as usize]);
            canvas.draw_line(
                [va[0] + offset, va[1]],
                [vb[0] + offset, vb[1]],
                panel,
                self.color,
                self.alpha,
            );
        }
    }
}

impl Default for MeshOverlayCompositor {
    fn default() -> Self {
        Self::new(DEFAULT_MESH_COLOR, DEFAULT_MESH_ALPHA, true)
    }
}

impl Compositor for MeshOverlayCompositor {
    fn composite(
        &self,
        frame: &Frame,
        output: &InferenceOutput,
        faces: &MeshTopology,
    ) -> Result<RenderedImage, Box<dyn std::error::Error>> {
        let frame = if frame.order() == PixelOrder::Bgr {
            std::borrow::Cow::Borrowed(frame)
        } else {
            std::borrow::Cow::Owned(frame.to_order(PixelOrder::Bgr))
        };

        let (width, height) = frame.dimensions();
        let panels = if self.side_by_side { 2 } else { 1 };
        let mut canvas = FloatCanvas::new(width * panels, height);

        canvas.paste(&frame, 0);
        let overlay = if self.side_by_side {
            canvas.paste(&frame, width);
            width
        } else {
            0
        };

        if !output.is_empty() {
            if let Some(max) = faces.max_index() {
                let needed = max as usize + 1;
                if let Some(person) = output.people.iter().find(|p| p.vertices.len() < needed) {
                    return Err(format!(
                        "mesh topology references vertex {max}, estimate has {} vertices",
                        person.vertices.len()
                    )
                    .into());
                }
            }
            let edges = faces.edges();
            let panel = ClipRect {
                x: overlay,
                y: 0,
                w: width,
                h: height,
            };
            for person in &output.people {
                self.draw_person(&mut canvas, person, &edges, panel);
            }
        }

        Ok(RenderedImage::Float {
            data: canvas.data,
            width: canvas.width,
            height: canvas.height,
            order: PixelOrder::Bgr,
        })
    }
}
