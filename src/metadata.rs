//! Video stream metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened and cached for its lifetime.

use std::time::Duration;

/// Metadata for the video stream being sampled.
///
/// # Example
///
/// ```no_run
/// use framesplit::{FfmpegVideoSource, VideoSource};
///
/// let source = FfmpegVideoSource::open("input.mp4").unwrap();
/// let metadata = source.metadata();
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Native frames per second (average rate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames. Taken from the container when it records one,
    /// otherwise estimated from duration and frame rate.
    pub frame_count: u64,
    /// Stream duration.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub format: String,
}
