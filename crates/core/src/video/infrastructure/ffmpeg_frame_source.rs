use std::path::Path;

use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::{DecodeFailure, FrameSource, FrameSourceError};

/// `AVFormatContext` duration and seek positions are in microseconds.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Random-access frame reads via ffmpeg-next (libavformat + libavcodec).
///
/// Each read seeks to the nearest keyframe at or before the target, then
/// decodes forward to the first frame whose timestamp reaches the target
/// frame (within half a frame). Frames come back as RGB24.
pub struct FfmpegFrameSource {
    state: Option<DecodeState>,
    metadata: Option<VideoMetadata>,
}

struct DecodeState {
    input_ctx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    video_stream_index: usize,
    /// Seconds per stream timestamp tick.
    time_base: f64,
    width: u32,
    height: u32,
}

// Safety: FfmpegFrameSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    pub fn new() -> Self {
        Self {
            state: None,
            metadata: None,
        }
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegFrameSource {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, FrameSourceError> {
        self.close();
        ffmpeg_next::init().map_err(setup_error)?;

        let ictx = ffmpeg_next::format::input(path).map_err(|e| FrameSourceError::Open {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        let (video_stream_index, time_base, fps, stream_frames, decoder) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or_else(|| FrameSourceError::NoVideoStream {
                    path: path.to_path_buf(),
                })?;

            let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
                .map_err(setup_error)?;
            let decoder = codec_ctx.decoder().video().map_err(setup_error)?;

            let rate = stream.rate();
            let fps = if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            };
            (
                stream.index(),
                f64::from(stream.time_base()),
                fps,
                stream.frames(),
                decoder,
            )
        };

        // Some containers don't record a frame count; estimate it from the duration.
        let total_frames = if stream_frames > 0 {
            stream_frames as usize
        } else if ictx.duration() > 0 && fps > 0.0 {
            (ictx.duration() as f64 / AV_TIME_BASE * fps).round() as usize
        } else {
            0
        };

        let width = decoder.width();
        let height = decoder.height();
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(setup_error)?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps, {} frames",
            path.display(),
            width,
            height,
            fps,
            total_frames
        );

        self.state = Some(DecodeState {
            input_ctx: ictx,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            width,
            height,
        });
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn read_at(&mut self, timestamp: f64) -> Result<Frame, DecodeFailure> {
        let (Some(state), Some(metadata)) = (self.state.as_mut(), self.metadata.as_ref()) else {
            return Err(DecodeFailure::NotOpen);
        };

        let duration = metadata.duration_seconds();
        if !timestamp.is_finite() || timestamp < 0.0 || (duration > 0.0 && timestamp > duration) {
            return Err(DecodeFailure::OutOfRange { timestamp });
        }

        let index = metadata.frame_index_at(timestamp);
        let (target, tolerance) = if metadata.fps > 0.0 {
            (index as f64 / metadata.fps, 0.5 / metadata.fps)
        } else {
            (timestamp, 0.0)
        };

        match state.decode_at(target, tolerance, index) {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => Err(DecodeFailure::EndOfStream { timestamp }),
            Err(e) => Err(DecodeFailure::Decoder {
                timestamp,
                source: Box::new(e),
            }),
        }
    }

    fn close(&mut self) {
        self.state = None;
        self.metadata = None;
    }
}

impl DecodeState {
    fn decode_at(
        &mut self,
        target: f64,
        tolerance: f64,
        index: usize,
    ) -> Result<Option<Frame>, ffmpeg_next::Error> {
        let DecodeState {
            input_ctx,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            width,
            height,
        } = self;

        let position = (target * AV_TIME_BASE) as i64;
        input_ctx.seek(position, ..position)?;
        decoder.flush();

        let mut decoded = Video::empty();
        for (stream, packet) in input_ctx.packets() {
            if stream.index() != *video_stream_index {
                continue;
            }
            if decoder.send_packet(&packet).is_err() {
                continue;
            }
            while decoder.receive_frame(&mut decoded).is_ok() {
                if reached(&decoded, *time_base, target, tolerance) {
                    return to_frame(scaler, &decoded, *width, *height, index).map(Some);
                }
            }
        }

        // Drain frames the decoder is still holding back
        let _ = decoder.send_eof();
        while decoder.receive_frame(&mut decoded).is_ok() {
            if reached(&decoded, *time_base, target, tolerance) {
                return to_frame(scaler, &decoded, *width, *height, index).map(Some);
            }
        }
        Ok(None)
    }
}

fn reached(decoded: &Video, time_base: f64, target: f64, tolerance: f64) -> bool {
    match decoded.timestamp().or_else(|| decoded.pts()) {
        Some(ts) => ts as f64 * time_base + tolerance >= target,
        None => true,
    }
}

fn to_frame(
    scaler: &mut scaling::Context,
    decoded: &Video,
    width: u32,
    height: u32,
    index: usize,
) -> Result<Frame, ffmpeg_next::Error> {
    let mut rgb_frame = Video::empty();
    scaler.run(decoded, &mut rgb_frame)?;
    let pixels = extract_rgb_pixels(&rgb_frame, width, height);
    Ok(Frame::new(pixels, width, height, 3, index))
}

fn setup_error(e: ffmpeg_next::Error) -> FrameSourceError {
    FrameSourceError::Decoder {
        source: Box::new(e),
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
pub(crate) fn extract_rgb_pixels(rgb_frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
