use std::path::Path;

use crate::shared::frame::{Frame, PixelOrder, CHANNELS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes BGR frames to MPEG-4 Part 2 video via ffmpeg-next.
///
/// The output geometry and frame rate are fixed at `open`; the container
/// is finalized on `close`.
pub struct FfmpegWriter {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    time_base: ffmpeg_next::Rational,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            time_base: ffmpeg_next::Rational(1, 1),
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    /// Number of frames accepted since the last `open`.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Drains every packet the encoder has ready into the container.
    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let encoder = self.encoder.as_mut().ok_or("FfmpegWriter: not opened")?;
        let octx = self.octx.as_mut().ok_or("FfmpegWriter: not opened")?;
        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(self.time_base, ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }

    /// Flushes the encoder and writes the trailer. No-op when not opened.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(encoder) = self.encoder.as_mut() else {
            return Ok(());
        };
        encoder.send_eof()?;
        self.drain_packets()?;
        if let Some(octx) = self.octx.as_mut() {
            octx.write_trailer()?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        if metadata.width == 0 || metadata.height == 0 {
            return Err(format!(
                "invalid output size {}x{}",
                metadata.width, metadata.height
            )
            .into());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let frame_rate = frame_rate_rational(metadata.fps);
        let time_base = frame_rate.invert();

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(frame_rate));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        ost.set_time_base(time_base);
        ost.set_avg_frame_rate(frame_rate);
        let video_stream_index = ost.index();

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::BGR24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoding {} at {}x{}, {}/{} fps",
            path.display(),
            metadata.width,
            metadata.height,
            frame_rate.numerator(),
            frame_rate.denominator()
        );

        self.width = metadata.width;
        self.height = metadata.height;
        self.time_base = time_base;
        self.video_stream_index = video_stream_index;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if self.encoder.is_none() {
            return Err("FfmpegWriter: not opened".into());
        }
        if frame.dimensions() != (self.width, self.height) {
            return Err(format!(
                "frame {} is {}x{}, writer expects {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }
        if frame.order() != PixelOrder::Bgr {
            return Err(format!("frame {} is not in BGR order", frame.index()).into());
        }
        if !frame.is_well_formed() {
            return Err(format!(
                "frame {} carries {} bytes, expected {}",
                frame.index(),
                frame.data().len(),
                frame.expected_len()
            )
            .into());
        }

        let mut bgr_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::BGR24,
            self.width,
            self.height,
        );

        let stride = bgr_frame.stride(0);
        let data = bgr_frame.data_mut(0);
        let src = frame.data();
        let row_len = self.width as usize * CHANNELS;

        // Copy pixel data, respecting stride
        for row in 0..self.height as usize {
            let src_start = row * row_len;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_len]
                .copy_from_slice(&src[src_start..src_start + row_len]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler
            .as_mut()
            .ok_or("FfmpegWriter: not opened")?
            .run(&bgr_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        self.encoder
            .as_mut()
            .ok_or("FfmpegWriter: not opened")?
            .send_frame(&yuv_frame)?;
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let result = self.finish();

        self.scaler = None;
        self.encoder = None;
        self.octx = None;

        result
    }
}

/// Expresses `fps` as an exact rational the MPEG-4 encoder accepts.
///
/// Whole rates map to `n/1`, NTSC rates (29.97, 23.976, ...) to
/// `n*1000/1001`, anything else to millihertz precision. Non-positive or
/// non-finite input is treated as 25.
pub fn frame_rate_rational(fps: f64) -> ffmpeg_next::Rational {
    if !fps.is_finite() || fps <= 0.0 {
        return ffmpeg_next::Rational(25, 1);
    }

    let whole = fps.round();
    if whole >= 1.0 && (fps - whole).abs() < 1e-3 {
        return ffmpeg_next::Rational(whole as i32, 1);
    }

    let ntsc = fps * 1.001;
    if (ntsc - ntsc.round()).abs() < 1e-2 && ntsc.round() >= 1.0 {
        return ffmpeg_next::Rational(ntsc.round() as i32 * 1000, 1001);
    }

    let num = ((fps * 1000.0).round() as i32).max(1);
    let divisor = gcd(num, 1000);
    ffmpeg_next::Rational(num / divisor, 1000 / divisor)
}

fn gcd(mut a: i32, mut b: i32) -> i32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs().max(1)
}
