use std::path::Path;

use crate::shared::frame::{Frame, PixelOrder, CHANNELS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded frame to BGR24 and wraps it in a [`Frame`].
pub struct FfmpegReader {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    video_stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            decoder: None,
            video_stream_index: 0,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        self.close();

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let fps = rational_to_fps(stream.avg_frame_rate())
            .or_else(|| rational_to_fps(stream.rate()))
            .unwrap_or(0.0);

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        log::debug!(
            "Opened {}: {}x{} {} @ {:.3} fps, {} frames",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.fps,
            metadata.total_frames
        );

        self.video_stream_index = video_stream_index;
        self.decoder = Some(decoder);
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(ictx) = self.input_ctx.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };
        let Some(decoder) = self.decoder.take() else {
            return Box::new(std::iter::once(Err(
                "FfmpegReader: frames already consumed".into(),
            )));
        };

        Box::new(FfmpegFrameIter {
            ictx,
            decoder,
            scaler: None,
            video_stream_index: self.video_stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.decoder = None;
        self.input_ctx = None;
    }
}

/// Frame rate from a stream rational, `None` when unset or degenerate.
fn rational_to_fps(rate: ffmpeg_next::Rational) -> Option<f64> {
    if rate.numerator() <= 0 || rate.denominator() <= 0 {
        return None;
    }
    Some(rate.numerator() as f64 / rate.denominator() as f64)
}

/// Converter to BGR24 for the geometry and pixel format it was built for.
struct BgrScaler {
    context: ffmpeg_next::software::scaling::Context,
    format: ffmpeg_next::format::Pixel,
    width: u32,
    height: u32,
}

/// Lazy iterator that decodes video frames one at a time, avoiding the need
/// to buffer the entire video in memory.
struct FfmpegFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: Option<BgrScaler>,
    video_stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    /// Next decoded frame, `None` when the decoder needs more input or is
    /// drained. Decoder failures are returned as errors.
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        match self.decoder.receive_frame(&mut decoded) {
            Ok(()) => Some(self.convert(&decoded)),
            Err(ffmpeg_next::Error::Eof) => None,
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::util::error::EAGAIN => {
                None
            }
            Err(e) => Some(Err(self.decode_error(e))),
        }
    }

    /// Ends iteration and describes the failure with the frame it hit.
    fn decode_error(&mut self, e: ffmpeg_next::Error) -> Box<dyn std::error::Error> {
        self.done = true;
        format!("decoder failed at frame {}: {e}", self.frame_index).into()
    }

    fn convert(
        &mut self,
        decoded: &ffmpeg_next::util::frame::video::Video,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let (format, width, height) = (decoded.format(), decoded.width(), decoded.height());
        let stale = self
            .scaler
            .as_ref()
            .map_or(true, |s| s.format != format || s.width != width || s.height != height);
        if stale {
            let context = ffmpeg_next::software::scaling::Context::get(
                format,
                width,
                height,
                ffmpeg_next::format::Pixel::BGR24,
                width,
                height,
                ffmpeg_next::software::scaling::Flags::BILINEAR,
            )?;
            self.scaler = Some(BgrScaler {
                context,
                format,
                width,
                height,
            });
        }
        let scaler = self.scaler.as_mut().ok_or("FfmpegReader: scaler missing")?;

        let mut bgr_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.context.run(decoded, &mut bgr_frame)?;

        let pixels = extract_packed_pixels(&bgr_frame, width, height);
        let frame = Frame::new(pixels, width, height, PixelOrder::Bgr, self.frame_index);
        self.frame_index += 1;
        Ok(frame)
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                if let Err(e) = self.decoder.send_eof() {
                    return Some(Err(self.decode_error(e)));
                }
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if let Err(e) = self.decoder.send_packet(&packet) {
                return Some(Err(self.decode_error(e)));
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
/// This function strips that padding to produce a tightly-packed pixel buffer.
fn extract_packed_pixels(
    frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_len = width as usize * CHANNELS;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(row_len * h);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Encodes `num_frames` solid frames of the given RGB colour.
    fn create_test_video(
        path: &Path,
        num_frames: usize,
        width: u32,
        height: u32,
        fps: i32,
        rgb: [u8; 3],
    ) {
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();

        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);

        octx.write_header().unwrap();

        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        let drain = |encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
                         octx: &mut ffmpeg_next::format::context::Output| {
            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
                encoded.write_interleaved(octx).unwrap();
            }
        };

        for i in 0..num_frames {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            let stride = rgb_frame.stride(0);
            let data = rgb_frame.data_mut(0);
            for row in 0..height as usize {
                for col in 0..width as usize {
                    let offset = row * stride + col * 3;
                    data[offset..offset + 3].copy_from_slice(&rgb);
                }
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));

            encoder.send_frame(&yuv_frame).unwrap();
            drain(&mut encoder, &mut octx);
        }

        encoder.send_eof().unwrap();
        drain(&mut encoder, &mut octx);

        octx.write_trailer().unwrap();
    }

    /// Writes `num_frames` PNG-coded frames to an AVI container, replacing
    /// the payload of frame `bad_index` with bytes no PNG decoder accepts.
    fn create_video_with_corrupt_frame(path: &Path, num_frames: usize, bad_index: usize) {
        ffmpeg_next::init().unwrap();
        let (width, height, fps) = (32u32, 24u32, 25);

        let mut octx = ffmpeg_next::format::output(path).unwrap();
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::PNG).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::RGB24);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));
        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);

        octx.write_header().unwrap();
        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut written = 0usize;
        let mut drain = |encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
                         octx: &mut ffmpeg_next::format::context::Output| {
            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                let mut packet = if written == bad_index {
                    let mut garbage = ffmpeg_next::Packet::copy(&[0xA5u8; 64]);
                    garbage.set_pts(encoded.pts());
                    garbage.set_dts(encoded.dts());
                    garbage.set_flags(encoded.flags());
                    garbage
                } else {
                    encoded.clone()
                };
                packet.set_stream(0);
                packet.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
                packet.write_interleaved(octx).unwrap();
                written += 1;
            }
        };

        for i in 0..num_frames {
            let mut frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            frame.data_mut(0).fill(90);
            frame.set_pts(Some(i as i64));
            encoder.send_frame(&frame).unwrap();
            drain(&mut encoder, &mut octx);
        }
        encoder.send_eof().unwrap();
        drain(&mut encoder, &mut octx);

        octx.write_trailer().unwrap();
    }

    fn test_video_path(dir: &Path) -> PathBuf {
        dir.join("test.mp4")
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30, [128, 128, 128]);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert!((meta.fps - 30.0).abs() < 0.5, "fps was {}", meta.fps);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_open_nonexistent_raises() {
        let mut reader = FfmpegReader::new();
        assert!(reader.open(Path::new("/nonexistent/test.mp4")).is_err());
    }

    #[test]
    fn test_frames_yields_correct_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30, [128, 128, 128]);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frames: Vec<_> = reader.frames().collect();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.is_ok()));
    }

    #[test]
    fn test_frames_have_sequential_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30, [128, 128, 128]);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
        }
    }

    #[test]
    fn test_frames_are_bgr() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        // Solid red in RGB
        create_test_video(&path, 1, 160, 120, 30, [220, 20, 20]);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(frame.order(), PixelOrder::Bgr);
        assert_eq!(frame.data().len(), 160 * 120 * 3);
        let centre = frame.as_ndarray().unwrap();
        let (b, r) = (centre[[60, 80, 0]], centre[[60, 80, 2]]);
        assert!(r > b + 100, "expected red in the last channel, got b={b} r={r}");
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = FfmpegReader::new();
        let result = reader.frames().next().unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_frames_cannot_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 3, 160, 120, 30, [128, 128, 128]);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        assert_eq!(reader.frames().count(), 3);

        let second: Vec<_> = reader.frames().collect();
        assert_eq!(second.len(), 1);
        assert!(second[0].is_err());
    }

    #[test]
    fn test_corrupt_packet_is_reported_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.avi");
        create_video_with_corrupt_frame(&path, 5, 2);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let results: Vec<_> = reader.frames().collect();

        // Two good frames, then the failure ends iteration
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        let err = results[2].as_ref().unwrap_err();
        assert!(err.to_string().contains("frame 2"), "got: {err}");
    }

    #[test]
    fn test_rational_to_fps() {
        assert_eq!(rational_to_fps(ffmpeg_next::Rational(30, 1)), Some(30.0));
        assert_eq!(rational_to_fps(ffmpeg_next::Rational(0, 1)), None);
        assert_eq!(rational_to_fps(ffmpeg_next::Rational(25, 0)), None);
        let ntsc = rational_to_fps(ffmpeg_next::Rational(30000, 1001)).unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 1, 160, 120, 30, [128, 128, 128]);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
