//! Frame sampling and export.
//!
//! [`FrameSampler`] is the main entry point. It checks the input, opens the
//! video, works out which source frames to keep, and writes each one to
//! `output_dir/frame_NNNN.<ext>` as soon as it is decoded.
//!
//! An extraction moves through the states of [`ExtractionState`]:
//!
//! ```text
//! Created -> Validated -> Opened -> Planning -> Exporting -> Completed
//!                                                        \-> PartiallyCompleted
//! ```
//!
//! Failures before `Exporting` abort without writing anything. A decode
//! failure while exporting stops the plan early; the frames already written
//! stay on disk and the report says
//! [`PartiallyCompleted`](ExtractionOutcome::PartiallyCompleted).
//!
//! # Example
//!
//! ```no_run
//! use framesplit::{FrameSampler, ImageFormat, SamplingRequest};
//!
//! let request = SamplingRequest::new()
//!     .with_target_fps(10.0)
//!     .with_image_format(ImageFormat::Png)
//!     .with_timecodes(Some("00:00:05"), Some("00:00:15"))?;
//!
//! let report = FrameSampler::new().extract("input.mp4", "frames", &request)?;
//! println!("wrote {} of {} frames", report.frames_written(), report.frames_planned());
//! # Ok::<(), framesplit::FrameSplitError>(())
//! ```

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    configuration::{FormatAllowList, SamplingRequest},
    error::FrameSplitError,
    metadata::VideoMetadata,
    plan::{FrameBounds, FrameIndexPlan, frame_step, output_path},
    progress::{NoOpProgress, ProgressCallback, ProgressTracker},
    source::{FfmpegVideoSource, VideoSource},
};

/// Lifecycle of a single extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    Created,
    Validated,
    Opened,
    Planning,
    Exporting,
    Completed,
    PartiallyCompleted,
}

impl Display for ExtractionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            ExtractionState::Created => "created",
            ExtractionState::Validated => "validated",
            ExtractionState::Opened => "opened",
            ExtractionState::Planning => "planning",
            ExtractionState::Exporting => "exporting",
            ExtractionState::Completed => "completed",
            ExtractionState::PartiallyCompleted => "partially completed",
        };
        f.write_str(name)
    }
}

/// How an extraction that produced a report ended.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// Every planned frame was written.
    Completed,
    /// Decoding stopped early; frames before the failure were written.
    PartiallyCompleted {
        /// The decode failure that ended the plan.
        failure: FrameSplitError,
    },
}

/// Summary of a finished extraction.
#[derive(Debug)]
#[must_use]
pub struct ExtractionReport {
    plan: FrameIndexPlan,
    written: Vec<PathBuf>,
    outcome: ExtractionOutcome,
}

impl ExtractionReport {
    /// The plan that was executed.
    pub fn plan(&self) -> &FrameIndexPlan {
        &self.plan
    }

    pub fn frames_planned(&self) -> u64 {
        self.plan.len()
    }

    pub fn frames_written(&self) -> u64 {
        self.written.len() as u64
    }

    /// Paths of written images, in output order.
    pub fn written_paths(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn outcome(&self) -> &ExtractionOutcome {
        &self.outcome
    }

    /// Returns `true` if every planned frame was written.
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Completed)
    }

    /// Terminal state of the extraction.
    pub fn state(&self) -> ExtractionState {
        match self.outcome {
            ExtractionOutcome::Completed => ExtractionState::Completed,
            ExtractionOutcome::PartiallyCompleted { .. } => ExtractionState::PartiallyCompleted,
        }
    }

    /// Consume the report, returning the decode failure if there was one.
    pub fn into_failure(self) -> Option<FrameSplitError> {
        match self.outcome {
            ExtractionOutcome::Completed => None,
            ExtractionOutcome::PartiallyCompleted { failure } => Some(failure),
        }
    }
}

/// Samples frames from a video and writes them as images.
///
/// Configure with the `with_*` builders, then call
/// [`extract`](FrameSampler::extract). A sampler holds no per-run state and
/// can be reused.
#[derive(Clone)]
pub struct FrameSampler {
    allow_list: FormatAllowList,
    progress: Arc<dyn ProgressCallback>,
    batch_size: u64,
}

impl Debug for FrameSampler {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameSampler")
            .field("allow_list", &self.allow_list)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSampler {
    /// A sampler with the default allow-list and no progress reporting.
    pub fn new() -> Self {
        Self {
            allow_list: FormatAllowList::default(),
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Replace the set of accepted input extensions.
    #[must_use]
    pub fn with_allow_list(mut self, allow_list: FormatAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `size` written frames. Clamped to at
    /// least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn allow_list(&self) -> &FormatAllowList {
        &self.allow_list
    }

    /// Check the input path and request without touching the file.
    ///
    /// # Errors
    ///
    /// - [`FrameSplitError::UnsupportedFormat`] if the extension is not
    ///   allowed.
    /// - [`FrameSplitError::TargetFpsInvalid`] if the target rate is not
    ///   positive.
    pub fn validate(
        &self,
        video_path: &Path,
        request: &SamplingRequest,
    ) -> Result<(), FrameSplitError> {
        self.allow_list.check(video_path)?;
        request.validate()?;
        log::debug!(
            "{} -> {}",
            ExtractionState::Created,
            ExtractionState::Validated
        );
        Ok(())
    }

    /// Extract frames from the video at `video_path` into `output_dir`.
    ///
    /// The output directory is created (with parents) once the video has
    /// been opened.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`validate`](FrameSampler::validate),
    /// [`FrameSplitError::SourceOpen`] if the video cannot be opened, and I/O
    /// or image errors if the directory or an image cannot be written. Decode
    /// failures are not errors; see [`ExtractionOutcome`].
    pub fn extract<P, Q>(
        &self,
        video_path: P,
        output_dir: Q,
        request: &SamplingRequest,
    ) -> Result<ExtractionReport, FrameSplitError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let video_path = video_path.as_ref();
        self.validate(video_path, request)?;

        let mut source = FfmpegVideoSource::open(video_path)?;
        log::debug!(
            "{} -> {}",
            ExtractionState::Validated,
            ExtractionState::Opened
        );

        self.extract_from_source(&mut source, output_dir.as_ref(), request)
    }

    /// Open the video and compute its plan without decoding any frames.
    ///
    /// # Errors
    ///
    /// Same as [`extract`](FrameSampler::extract) up to and including
    /// opening the source.
    pub fn plan_file<P: AsRef<Path>>(
        &self,
        video_path: P,
        request: &SamplingRequest,
    ) -> Result<(VideoMetadata, FrameIndexPlan), FrameSplitError> {
        let video_path = video_path.as_ref();
        self.validate(video_path, request)?;
        let source = FfmpegVideoSource::open(video_path)?;
        let plan = self.plan(&source, request)?;
        Ok((source.metadata().clone(), plan))
    }

    /// Compute which frames of `source` the request selects.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSplitError::TargetFpsInvalid`] if the target rate is
    /// not positive.
    pub fn plan<S>(
        &self,
        source: &S,
        request: &SamplingRequest,
    ) -> Result<FrameIndexPlan, FrameSplitError>
    where
        S: VideoSource + ?Sized,
    {
        request.validate()?;

        let native_fps = source.native_frame_rate();
        let bounds = FrameBounds::resolve(request, native_fps, source.total_frames());
        let step = frame_step(request.target_fps(), native_fps);
        let plan = FrameIndexPlan::new(bounds, step);

        log::debug!(
            "Plan: frames [{}, {}) step {} ({} frames, native {:.3} fps, target {:.3} fps)",
            plan.start_frame(),
            plan.end_frame(),
            plan.step(),
            plan.len(),
            native_fps,
            request.target_fps(),
        );

        Ok(plan)
    }

    /// Extract from an already opened source.
    ///
    /// The source stays owned by the caller; it is only read from.
    ///
    /// # Errors
    ///
    /// Same as [`extract`](FrameSampler::extract), minus the open and
    /// extension checks.
    pub fn extract_from_source<S>(
        &self,
        source: &mut S,
        output_dir: &Path,
        request: &SamplingRequest,
    ) -> Result<ExtractionReport, FrameSplitError>
    where
        S: VideoSource + ?Sized,
    {
        log::debug!(
            "{} -> {}",
            ExtractionState::Opened,
            ExtractionState::Planning
        );
        let plan = self.plan(source, request)?;

        fs::create_dir_all(output_dir)?;

        log::debug!(
            "{} -> {}",
            ExtractionState::Planning,
            ExtractionState::Exporting
        );
        let format = request.image_format();
        let mut tracker =
            ProgressTracker::new(self.progress.clone(), plan.len(), self.batch_size);
        let mut written = Vec::new();
        let mut failure = None;

        for frame_index in plan.iter() {
            let image = match source.read_frame(frame_index) {
                Ok(image) => image,
                Err(error) => {
                    failure = Some(as_decode_failure(error, frame_index));
                    break;
                }
            };

            let rank = (frame_index - plan.start_frame()) / plan.step();
            let path = output_path(output_dir, rank, format);
            image.save_with_format(&path, format.to_image_format())?;
            log::debug!("Wrote frame {frame_index} -> {}", path.display());

            written.push(path);
            tracker.advance(frame_index);
        }

        tracker.finish();

        let outcome = match failure {
            None => ExtractionOutcome::Completed,
            Some(failure) => {
                log::warn!(
                    "Stopped after {} of {} frames: {failure}",
                    written.len(),
                    plan.len()
                );
                ExtractionOutcome::PartiallyCompleted { failure }
            }
        };

        let report = ExtractionReport {
            plan,
            written,
            outcome,
        };
        log::debug!(
            "{} -> {} ({} frames written)",
            ExtractionState::Exporting,
            report.state(),
            report.frames_written()
        );
        Ok(report)
    }
}

/// Any error while reading a planned frame ends the plan as a decode failure.
fn as_decode_failure(error: FrameSplitError, frame_index: u64) -> FrameSplitError {
    match error {
        FrameSplitError::DecodeFailure { .. } => error,
        other => FrameSplitError::DecodeFailure {
            frame_index,
            reason: other.to_string(),
        },
    }
}
