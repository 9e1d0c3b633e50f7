use crate::shared::frame::{Frame, PixelOrder, CHANNELS};

/// Output of a compositor, before it is normalized for encoding.
///
/// Renderers that blend in floating point hand back `Float`; values are
/// expected in the 0..=255 range but are not required to be.
#[derive(Clone, Debug)]
pub enum RenderedImage {
    Bytes(Frame),
    Float {
        data: Vec<f32>,
        width: u32,
        height: u32,
        order: PixelOrder,
    },
}

impl RenderedImage {
    /// Converts to an 8-bit frame carrying `index`.
    ///
    /// Float channels are truncated toward zero and saturated to 0..=255
    /// (NaN becomes 0).
    pub fn into_frame(self, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
        match self {
            RenderedImage::Bytes(frame) => {
                let (width, height, order) = (frame.width(), frame.height(), frame.order());
                check_len(frame.data().len(), width, height)?;
                Ok(Frame::new(frame.into_data(), width, height, order, index))
            }
            RenderedImage::Float {
                data,
                width,
                height,
                order,
            } => {
                check_len(data.len(), width, height)?;
                let bytes = data.into_iter().map(|v| v as u8).collect();
                Ok(Frame::new(bytes, width, height, order, index))
            }
        }
    }
}

fn check_len(len: usize, width: u32, height: u32) -> Result<(), Box<dyn std::error::Error>> {
    let expected = width as usize * height as usize * CHANNELS;
    if len != expected {
        return Err(format!(
            "rendered image has {len} values, expected {expected} for {width}x{height}"
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_keeps_pixels_and_reindexes() {
        let frame = Frame::new(vec![7u8; 12], 2, 2, PixelOrder::Bgr, 0);
        let out = RenderedImage::Bytes(frame).into_frame(9).unwrap();
        assert_eq!(out.index(), 9);
        assert_eq!(out.order(), PixelOrder::Bgr);
        assert!(out.data().iter().all(|&v| v == 7));
    }

    #[test]
    fn test_float_is_truncated_and_saturated() {
        let image = RenderedImage::Float {
            data: vec![-5.0, 12.9, 300.0, f32::NAN, 254.99, 0.5],
            width: 2,
            height: 1,
            order: PixelOrder::Bgr,
        };
        let out = image.into_frame(0).unwrap();
        assert_eq!(out.data(), &[0, 12, 255, 0, 254, 0]);
    }

    #[test]
    fn test_bytes_length_mismatch_is_error() {
        let frame = Frame::new(vec![0u8; 10], 4, 2, PixelOrder::Bgr, 0);
        let err = RenderedImage::Bytes(frame).into_frame(0).unwrap_err();
        assert!(err.to_string().contains("expected 24"));
    }

    #[test]
    fn test_float_length_mismatch_is_error() {
        let image = RenderedImage::Float {
            data: vec![0.0; 5],
            width: 2,
            height: 1,
            order: PixelOrder::Rgb,
        };
        assert!(image.into_frame(0).is_err());
    }
}
