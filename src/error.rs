//! Error types for the `framesplit` crate.
//!
//! This module defines [`FrameSplitError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry the file paths, frame
//! indices, and upstream messages needed to explain a failure to the user.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framesplit` operations.
///
/// [`UnsupportedFormat`](FrameSplitError::UnsupportedFormat),
/// [`TargetFpsInvalid`](FrameSplitError::TargetFpsInvalid),
/// [`InvalidTimecode`](FrameSplitError::InvalidTimecode) and
/// [`SourceOpen`](FrameSplitError::SourceOpen) abort an extraction before any
/// output is written. [`DecodeFailure`](FrameSplitError::DecodeFailure) is
/// recovered by the sampler, which stops early and keeps what it has written.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameSplitError {
    /// The input file extension is not on the allow-list.
    #[error("Unsupported video format '{extension}' for {path}")]
    UnsupportedFormat {
        /// Path that was rejected.
        path: PathBuf,
        /// Extension found on the path (empty when there is none).
        extension: String,
    },

    /// The requested output frame rate is zero, negative, or not finite.
    #[error("Target frame rate must be greater than zero (got {0})")]
    TargetFpsInvalid(f64),

    /// A time bound could not be parsed as `HH:MM:SS`.
    #[error("Invalid timecode '{value}': {reason}")]
    InvalidTimecode {
        /// The text that failed to parse.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The video source could not be opened.
    #[error("Failed to open video source at {path}: {reason}")]
    SourceOpen {
        /// Path that was passed to the source.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A planned frame could not be decoded.
    #[error("Failed to decode frame {frame_index}: {reason}")]
    DecodeFailure {
        /// Source frame index that was being decoded.
        frame_index: u64,
        /// Underlying reason, e.g. end of stream.
        reason: String,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FrameSplitError {
    fn from(error: FfmpegError) -> Self {
        FrameSplitError::FfmpegError(error.to_string())
    }
}

impl FrameSplitError {
    /// Process exit code used by the command-line tool for this error.
    ///
    /// Every user-facing failure kind gets its own code. Internal failures
    /// (I/O, image encoding, FFmpeg) share the generic code `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            FrameSplitError::UnsupportedFormat { .. } => 10,
            FrameSplitError::TargetFpsInvalid(_) => 11,
            FrameSplitError::InvalidTimecode { .. } => 12,
            FrameSplitError::SourceOpen { .. } => 13,
            FrameSplitError::DecodeFailure { .. } => 14,
            FrameSplitError::FfmpegError(_)
            | FrameSplitError::IoError(_)
            | FrameSplitError::ImageError(_) => 1,
        }
    }
}
