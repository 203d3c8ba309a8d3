//! Progress reporting.
//!
//! Attach a [`ProgressCallback`] to a [`FrameSampler`](crate::FrameSampler)
//! to be told how far an extraction has got.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesplit::{FrameSampler, ProgressCallback, ProgressInfo, SamplingRequest};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!(
//!             "{}/{} frames ({:.1}%)",
//!             info.frames_written,
//!             info.frames_planned,
//!             info.percentage()
//!         );
//!     }
//! }
//!
//! let sampler = FrameSampler::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(25);
//! let report = sampler.extract("input.mp4", "frames", &SamplingRequest::new())?;
//! println!("{} frames written", report.frames_written());
//! # Ok::<(), framesplit::FrameSplitError>(())
//! ```

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Where an export stands after some number of written frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    pub frames_written: u64,
    /// Length of the frame index plan. Fewer frames are written if decoding
    /// stops early.
    pub frames_planned: u64,
    pub elapsed: Duration,
    /// Extrapolated from the average time per written frame. `None` until
    /// the first frame is out.
    pub estimated_remaining: Option<Duration>,
    /// Source index of the frame just written, or `None` on the closing
    /// report.
    pub source_frame: Option<u64>,
}

impl ProgressInfo {
    /// Share of the plan written so far, in percent. An empty plan counts as
    /// done.
    pub fn percentage(&self) -> f32 {
        if self.frames_planned == 0 {
            100.0
        } else {
            self.frames_written as f32 * 100.0 / self.frames_planned as f32
        }
    }
}

/// Receives export progress from a [`FrameSampler`](crate::FrameSampler).
///
/// Callbacks observe the extraction but cannot stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` written frames and once when exporting ends.
    fn on_progress(&self, info: &ProgressInfo);
}

pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Counts written frames and calls back once per batch.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    frames_planned: u64,
    frames_written: u64,
    batch_size: u64,
    started: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        frames_planned: u64,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            frames_planned,
            frames_written: 0,
            batch_size: batch_size.max(1),
            started: Instant::now(),
        }
    }

    pub(crate) fn advance(&mut self, source_frame: u64) {
        self.frames_written += 1;
        if self.frames_written % self.batch_size == 0 {
            self.notify(Some(source_frame));
        }
    }

    pub(crate) fn finish(&self) {
        self.notify(None);
    }

    fn notify(&self, source_frame: Option<u64>) {
        let elapsed = self.started.elapsed();
        let estimated_remaining = (self.frames_written > 0).then(|| {
            let left = self.frames_planned.saturating_sub(self.frames_written);
            elapsed.mul_f64(left as f64 / self.frames_written as f64)
        });

        self.callback.on_progress(&ProgressInfo {
            frames_written: self.frames_written,
            frames_planned: self.frames_planned,
            elapsed,
            estimated_remaining,
            source_frame,
        });
    }
}
