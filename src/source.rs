//! Decodable video sources.
//!
//! [`VideoSource`] is what the [`FrameSampler`](crate::FrameSampler) reads
//! from: something with a frame rate, a frame count, and a way to decode the
//! frame at an exact index. [`FfmpegVideoSource`] is the real implementation;
//! tests plug in synthetic sources.
//!
//! Frames are addressed by their position in the decoder's output, counted
//! from the start of the stream. Timestamps are never used to locate a frame,
//! so variable-frame-rate files map indices to the same pictures on every
//! run.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    error::FrameSplitError,
    metadata::VideoMetadata,
    utilities::{estimate_frame_count, packed_rgb, rational_to_fps, stream_time_to_duration},
};

/// A stream of frames addressable by index.
pub trait VideoSource {
    /// Cached stream metadata.
    fn metadata(&self) -> &VideoMetadata;

    /// Total number of frames in the stream.
    fn total_frames(&self) -> u64 {
        self.metadata().frame_count
    }

    /// Native frame rate in frames per second. Always positive.
    fn native_frame_rate(&self) -> f64 {
        self.metadata().frames_per_second
    }

    /// Decode the frame at `frame_index` (0-based).
    ///
    /// Callers are expected to request increasing indices; implementations
    /// may be much slower when asked to go backwards.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSplitError::DecodeFailure`] if the stream ends before
    /// the frame or the frame cannot be decoded.
    fn read_frame(&mut self, frame_index: u64) -> Result<DynamicImage, FrameSplitError>;
}

/// A video file decoded through FFmpeg.
///
/// Owns the demuxer, decoder, and scaler. Everything is released when the
/// value is dropped.
pub struct FfmpegVideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: Option<(ScalerKey, ScalingContext)>,
    video_stream_index: usize,
    metadata: VideoMetadata,
    /// Index the next frame out of the decoder will have.
    next_frame_index: u64,
    /// Set once EOF has been sent to the decoder.
    draining: bool,
    file_path: PathBuf,
}

type ScalerKey = (Pixel, u32, u32);

impl FfmpegVideoSource {
    /// Open a video file and read its stream metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSplitError::SourceOpen`] if the file is missing, the
    /// container cannot be parsed, there is no video stream, no decoder is
    /// available, or the frame rate cannot be determined.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameSplitError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        let open_error = |reason: String| FrameSplitError::SourceOpen {
            path: file_path.clone(),
            reason,
        };

        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let format = input_context.format().name().to_string();
        let container_duration_microseconds = input_context.duration();

        let (video_stream_index, decoder, frames_per_second, stream_frames, stream_duration) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or_else(|| open_error("no video stream found".to_string()))?;

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_error(format!("failed to read codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("failed to create video decoder: {error}")))?;

            let frames_per_second = rational_to_fps(stream.avg_frame_rate())
                .or_else(|| rational_to_fps(stream.rate()))
                .ok_or_else(|| open_error("could not determine frame rate".to_string()))?;

            (
                stream.index(),
                decoder,
                frames_per_second,
                stream.frames(),
                stream_time_to_duration(stream.duration(), stream.time_base()),
            )
        };

        let duration = if !stream_duration.is_zero() {
            stream_duration
        } else if container_duration_microseconds > 0 {
            Duration::from_micros(container_duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frame_count = if stream_frames > 0 {
            stream_frames as u64
        } else {
            estimate_frame_count(duration, frames_per_second)
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec,
            format,
        };

        log::debug!(
            "Video stream {video_stream_index}: {}x{} @ {:.3} fps, {} frames [{}]",
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            metadata,
            next_frame_index: 0,
            draining: false,
            file_path,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Go back to the first frame of the stream.
    fn rewind(&mut self) -> Result<(), FrameSplitError> {
        log::debug!("Rewinding {} to frame 0", self.file_path.display());
        self.input_context.seek(0, ..0)?;
        self.decoder.flush();
        self.next_frame_index = 0;
        self.draining = false;
        Ok(())
    }

    /// Read packets until one belongs to the video stream.
    fn next_video_packet(&mut self) -> Option<Packet> {
        let video_stream_index = self.video_stream_index;
        self.input_context
            .packets()
            .find_map(|(stream, packet)| (stream.index() == video_stream_index).then_some(packet))
    }

    /// Pull the next decoded frame into `frame`. Returns `false` at end of
    /// stream.
    fn decode_next(&mut self, frame: &mut VideoFrame) -> Result<bool, FrameSplitError> {
        loop {
            if self.decoder.receive_frame(frame).is_ok() {
                return Ok(true);
            }
            if self.draining {
                return Ok(false);
            }

            match self.next_video_packet() {
                Some(packet) => {
                    self.decoder
                        .send_packet(&packet)
                        .map_err(|error| FrameSplitError::DecodeFailure {
                            frame_index: self.next_frame_index,
                            reason: error.to_string(),
                        })?;
                }
                None => {
                    self.decoder.send_eof()?;
                    self.draining = true;
                }
            }
        }
    }

    /// Convert a decoded frame to an RGB image, rebuilding the scaler when the
    /// frame geometry changes.
    fn convert(&mut self, frame: &VideoFrame) -> Result<DynamicImage, FrameSplitError> {
        let key = (frame.format(), frame.width(), frame.height());
        let scaler = match self.scaler.take() {
            Some((current, scaler)) if current == key => scaler,
            _ => ScalingContext::get(
                key.0,
                key.1,
                key.2,
                Pixel::RGB24,
                key.1,
                key.2,
                ScalingFlags::BILINEAR,
            )?,
        };
        let (_, scaler) = self.scaler.insert((key, scaler));

        let mut rgb_frame = VideoFrame::empty();
        scaler.run(frame, &mut rgb_frame)?;

        let (width, height) = (key.1, key.2);
        let buffer = packed_rgb(&rgb_frame, width, height);
        let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FrameSplitError::DecodeFailure {
                frame_index: self.next_frame_index.saturating_sub(1),
                reason: "decoded frame data does not match its dimensions".to_string(),
            }
        })?;
        Ok(DynamicImage::ImageRgb8(rgb_image))
    }
}

impl VideoSource for FfmpegVideoSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn read_frame(&mut self, frame_index: u64) -> Result<DynamicImage, FrameSplitError> {
        if frame_index < self.next_frame_index {
            self.rewind()?;
        }

        let mut decoded_frame = VideoFrame::empty();
        loop {
            if !self.decode_next(&mut decoded_frame)? {
                return Err(FrameSplitError::DecodeFailure {
                    frame_index,
                    reason: format!(
                        "end of stream reached after {} frames",
                        self.next_frame_index
                    ),
                });
            }

            let current = self.next_frame_index;
            self.next_frame_index += 1;

            if current == frame_index {
                return self.convert(&decoded_frame).map_err(|error| match error {
                    FrameSplitError::DecodeFailure { .. } => error,
                    other => FrameSplitError::DecodeFailure {
                        frame_index,
                        reason: other.to_string(),
                    },
                });
            }
        }
    }
}

impl Drop for FfmpegVideoSource {
    fn drop(&mut self) {
        log::debug!("Closing video source: {}", self.file_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_source_open_error() {
        let error = FfmpegVideoSource::open("definitely/not/here.mp4")
            .err()
            .expect("opening a missing file must fail");
        assert!(matches!(error, FrameSplitError::SourceOpen { .. }));
        assert_eq!(error.exit_code(), 13);
    }
}
