//! Floating-point raster used by the compositors.

use crate::shared::frame::{Frame, CHANNELS};

/// Interleaved 3-channel f32 image, values nominally in 0..=255.
pub(super) struct FloatCanvas {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

/// Axis-aligned clip rectangle in canvas pixels, inclusive-exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct ClipRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl FloatCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0.0; width as usize * height as usize * CHANNELS],
            width,
            height,
        }
    }

    /// Copies `frame` so its top-left corner lands at `(x_offset, 0)`.
    /// Pixels falling outside the canvas are dropped.
    pub fn paste(&mut self, frame: &Frame, x_offset: u32) {
        let cw = self.width as usize;
        let fw = frame.width() as usize;
        let rows = (frame.height().min(self.height)) as usize;
        let cols = fw.min(cw.saturating_sub(x_offset as usize));
        let src = frame.data();

        for row in 0..rows {
            let src_start = row * fw * CHANNELS;
            let dst_start = (row * cw + x_offset as usize) * CHANNELS;
            for i in 0..cols * CHANNELS {
                self.data[dst_start + i] = src[src_start + i] as f32;
            }
        }
    }

    /// Alpha-blends `color` over one pixel. Out-of-bounds writes are ignored.
    pub fn blend(&mut self, x: i64, y: i64, color: [f32; 3], alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        for (c, value) in color.iter().enumerate() {
            let dst = &mut self.data[offset + c];
            *dst = *dst * (1.0 - alpha) + value * alpha;
        }
    }

    /// Draws a one-pixel line, clipped to `clip`.
    pub fn draw_line(
        &mut self,
        from: [f32; 2],
        to: [f32; 2],
        clip: ClipRect,
        color: [f32; 3],
        alpha: f32,
    ) {
        let Some((p0, p1)) = clip_segment(from, to, clip) else {
            return;
        };

        // Bresenham over the clipped integer endpoints
        let (mut x0, mut y0) = (p0[0].round() as i64, p0[1].round() as i64);
        let (x1, y1) = (p1[0].round() as i64, p1[1].round() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.blend(x0, y0, color, alpha);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Liang–Barsky clipping of a segment against `clip`.
///
/// Returns `None` when the segment lies entirely outside or has non-finite
/// endpoints.
fn clip_segment(from: [f32; 2], to: [f32; 2], clip: ClipRect) -> Option<([f32; 2], [f32; 2])> {
    if !from.iter().chain(to.iter()).all(|v| v.is_finite()) {
        return None;
    }
    if clip.w == 0 || clip.h == 0 {
        return None;
    }

    let x_min = clip.x as f32;
    let y_min = clip.y as f32;
    let x_max = (clip.x + clip.w - 1) as f32;
    let y_max = (clip.y + clip.h - 1) as f32;

    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    let edges = [
        (-dx, from[0] - x_min),
        (dx, x_max - from[0]),
        (-dy, from[1] - y_min),
        (dy, y_max - from[1]),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        [from[0] + t0 * dx, from[1] + t0 * dy],
        [from[0] + t1 * dx, from[1] + t1 * dy],
    ))
}
