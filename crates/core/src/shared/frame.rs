use ndarray::{ArrayView3, ShapeError};

/// Number of interleaved channels in every frame.
pub const CHANNELS: usize = 3;

/// Channel order of a frame's interleaved pixels.
///
/// Decoders hand out `Bgr`; the estimator expects `Rgb`. The two are never
/// treated as interchangeable: crossing a boundary goes through
/// [`Frame::to_order`] or [`Frame::into_order`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelOrder {
    Rgb,
    Bgr,
}

/// A single video frame: contiguous 8-bit pixels in row-major order.
///
/// Construction does not check the buffer length; consumers that index rows
/// call [`Frame::is_well_formed`] first.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    order: PixelOrder,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, order: PixelOrder, index: usize) -> Self {
        Self {
            data,
            width,
            height,
            order,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn order(&self) -> PixelOrder {
        self.order
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a copy of this frame with its channels arranged in `order`.
    pub fn to_order(&self, order: PixelOrder) -> Frame {
        self.clone().into_order(order)
    }

    /// Rearranges channels in place. A no-op when the order already matches.
    pub fn into_order(mut self, order: PixelOrder) -> Frame {
        if self.order != order {
            for pixel in self.data.chunks_exact_mut(CHANNELS) {
                pixel.swap(0, 2);
            }
            self.order = order;
        }
        self
    }

    /// Number of bytes `width x height` pixels occupy.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }

    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    /// `[H, W, C]` view. Fails when the buffer does not match the dimensions.
    pub fn as_ndarray(&self) -> Result<ArrayView3<'_, u8>, ShapeError> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, CHANNELS),
            &self.data,
        )
    }
}
