//! # framesplit
//!
//! Split a video into still images, sampling frames inside an optional time
//! window at a chosen output rate.
//!
//! `framesplit` opens a video through FFmpeg (via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate), works out
//! which source frames to keep, and writes each one with the
//! [`image`](https://crates.io/crates/image) crate as
//! `frame_0000.jpg`, `frame_0001.jpg`, ...
//!
//! ## Quick Start
//!
//! ```no_run
//! use framesplit::{FrameSampler, ImageFormat, SamplingRequest};
//!
//! let request = SamplingRequest::new()
//!     .with_target_fps(1.0)
//!     .with_image_format(ImageFormat::Png);
//!
//! let report = FrameSampler::new().extract("input.mp4", "frames", &request)?;
//! println!("Wrote {} frames", report.frames_written());
//! # Ok::<(), framesplit::FrameSplitError>(())
//! ```
//!
//! ## Frame selection
//!
//! Given the video's native rate `N` and the requested rate `T`:
//!
//! - `T == N`: every frame in the window.
//! - `T > N`: still every frame. Frames are never duplicated.
//! - `T < N`: every `ceil(N / T)`-th frame.
//!
//! The window `[start, end)` is converted to frame indices with
//! `floor(seconds * N)`. Output files are numbered by their position in the
//! sample, not by source frame number. See [`plan`] for details.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod plan;
pub mod progress;
pub mod sampler;
pub mod source;
pub mod timecode;
mod utilities;

pub use configuration::{
    DEFAULT_TARGET_FPS, DEFAULT_VIDEO_EXTENSIONS, FormatAllowList, ImageFormat, SamplingRequest,
};
pub use error::FrameSplitError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use plan::{FPS_TOLERANCE, FrameBounds, FrameIndexPlan, frame_step, output_file_name};
pub use progress::{ProgressCallback, ProgressInfo};
pub use sampler::{ExtractionOutcome, ExtractionReport, ExtractionState, FrameSampler};
pub use source::{FfmpegVideoSource, VideoSource};
pub use timecode::{format_timecode, parse_timecode};
