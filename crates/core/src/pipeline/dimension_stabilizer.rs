use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::shared::frame::Frame;

/// Keeps every encoded frame at one size.
///
/// The first frame passed to [`stabilize`](Self::stabilize) fixes the output
/// dimensions. Later frames of a different size are bilinearly resized to
/// match; they are never dropped.
#[derive(Debug, Default)]
pub struct DimensionStabilizer {
    locked: Option<(u32, u32)>,
    resized_count: usize,
}

impl DimensionStabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locked `(width, height)`, once the first frame has been seen.
    /// Number of frames that needed a resize.
    pub fn resized_count(&self) -> usize {
        self.resized_count
    }

    pub fn stabilize(&mut self, frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        let dims = frame.dimensions();
        let Some((width, height)) = self.locked else {
            if dims.0 == 0 || dims.1 == 0 {
                return Err(format!("cannot lock output size to {}x{}", dims.0, dims.1).into());
            }
            self.locked = Some(dims);
            return Ok(frame);
        };
        if dims == (width, height) {
            return Ok(frame);
        }

        log::debug!(
            "Resizing frame {} from {}x{} to {width}x{height}",
            frame.index(),
            dims.0,
            dims.1
        );
        self.resized_count += 1;
        resize(frame, width, height)
    }
}

/// Bilinear resize. Channel order is carried through untouched.
fn resize(frame: Frame, width: u32, height: u32) -> Result<Frame, Box<dyn std::error::Error>> {
    let (src_w, src_h) = frame.dimensions();
    let (order, index) = (frame.order(), frame.index());
    if src_w == 0 || src_h == 0 {
        return Err(format!("frame {index} is empty ({src_w}x{src_h})").into());
    }

    let buffer = RgbImage::from_raw(src_w, src_h, frame.into_data())
        .ok_or_else(|| format!("frame {index} buffer does not match {src_w}x{src_h}"))?;
    let resized = imageops::resize(&buffer, width, height, FilterType::Triangle);
    Ok(Frame::new(resized.into_raw(), width, height, order, index))
}
