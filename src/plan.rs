//! Frame selection arithmetic.
//!
//! Turns a [`SamplingRequest`] and the source's frame rate and frame count
//! into a [`FrameIndexPlan`]: the strictly increasing source frame indices to
//! decode, plus the rank each one gets in the output file names.
//!
//! Everything here is pure; no decoding happens in this module.
//!
//! # Example
//!
//! ```
//! use framesplit::{FrameBounds, FrameIndexPlan, SamplingRequest, frame_step};
//!
//! // 10 seconds of 30 fps video, sampled at 10 fps.
//! let request = SamplingRequest::new().with_target_fps(10.0);
//! let bounds = FrameBounds::resolve(&request, 30.0, 300);
//! let plan = FrameIndexPlan::new(bounds, frame_step(10.0, 30.0));
//!
//! assert_eq!(plan.step(), 3);
//! assert_eq!(plan.len(), 100);
//! assert_eq!(plan.iter().last(), Some(297));
//! ```

use std::path::{Path, PathBuf};

use crate::configuration::{ImageFormat, SamplingRequest};

/// Absolute tolerance when comparing frame rates for equality.
///
/// Wide enough that `29.97` matches NTSC `30000/1001`.
pub const FPS_TOLERANCE: f64 = 1e-3;

/// How close a rate ratio must be to a whole number to be treated as one.
const RATIO_TOLERANCE: f64 = 1e-6;

/// Spacing between consecutive sampled source frames.
///
/// - Rates equal within [`FPS_TOLERANCE`]: every frame, step 1.
/// - Target above native: `floor(native / target)` clamped to at least 1,
///   which is always 1. Frames are never duplicated to reach a higher rate.
/// - Target below native: `native / target` rounded up, so the output never
///   exceeds the requested rate. Ratios within floating error of a whole
///   number use that number (30 fps sampled at 10 fps is step 3).
pub fn frame_step(target_fps: f64, native_fps: f64) -> u64 {
    if (target_fps - native_fps).abs() <= FPS_TOLERANCE {
        return 1;
    }

    let ratio = native_fps / target_fps;
    if target_fps > native_fps {
        return (ratio.floor() as u64).max(1);
    }

    let nearest = ratio.round();
    let step = if (ratio - nearest).abs() <= RATIO_TOLERANCE {
        nearest
    } else {
        ratio.ceil()
    };
    (step as u64).max(1)
}

/// Half-open source frame range `[start_frame, end_frame)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBounds {
    pub start_frame: u64,
    pub end_frame: u64,
}

impl FrameBounds {
    /// Convert the request's time window into frame indices.
    ///
    /// `start_frame = floor(start_seconds * native_fps)`, or 0 without a
    /// start time. `end_frame = floor(end_seconds * native_fps)`, or
    /// `total_frames` without an end time. An end past the last frame is kept
    /// as-is; the source simply runs out while the plan is executed.
    pub fn resolve(request: &SamplingRequest, native_fps: f64, total_frames: u64) -> Self {
        let start_frame = request
            .start_time()
            .map(|start| seconds_to_frame(start.as_secs_f64(), native_fps))
            .unwrap_or(0);
        let end_frame = request
            .end_time()
            .map(|end| seconds_to_frame(end.as_secs_f64(), native_fps))
            .unwrap_or(total_frames);

        Self {
            start_frame,
            end_frame,
        }
    }

    /// Returns `true` if the window selects no frames.
    pub fn is_empty(&self) -> bool {
        self.start_frame >= self.end_frame
    }
}

fn seconds_to_frame(seconds: f64, frames_per_second: f64) -> u64 {
    (seconds * frames_per_second).floor() as u64
}

/// The ordered source frame indices an extraction decodes.
///
/// Indices start at `start_frame`, advance by `step`, and stay strictly
/// below `end_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FrameIndexPlan {
    bounds: FrameBounds,
    step: u64,
}

impl FrameIndexPlan {
    /// Build a plan. A `step` of zero is treated as 1.
    pub fn new(bounds: FrameBounds, step: u64) -> Self {
        Self {
            bounds,
            step: step.max(1),
        }
    }

    pub fn bounds(&self) -> FrameBounds {
        self.bounds
    }

    pub fn start_frame(&self) -> u64 {
        self.bounds.start_frame
    }

    pub fn end_frame(&self) -> u64 {
        self.bounds.end_frame
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Number of planned frames: `ceil((end - start) / step)`, or 0.
    pub fn len(&self) -> u64 {
        if self.bounds.is_empty() {
            0
        } else {
            (self.bounds.end_frame - self.bounds.start_frame).div_ceil(self.step)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the planned source frame indices in increasing order.
    pub fn iter(&self) -> PlanIter {
        PlanIter {
            next: self.bounds.start_frame,
            end: self.bounds.end_frame,
            step: self.step,
        }
    }

    /// Output rank of a planned source index: `(index - start) / step`.
    ///
    /// Returns `None` for indices outside the plan.
    pub fn rank_of(&self, frame_index: u64) -> Option<u64> {
        if frame_index < self.bounds.start_frame || frame_index >= self.bounds.end_frame {
            return None;
        }
        let offset = frame_index - self.bounds.start_frame;
        (offset % self.step == 0).then_some(offset / self.step)
    }
}

impl IntoIterator for &FrameIndexPlan {
    type Item = u64;
    type IntoIter = PlanIter;

    fn into_iter(self) -> PlanIter {
        self.iter()
    }
}

/// Iterator over a [`FrameIndexPlan`].
#[derive(Debug, Clone)]
pub struct PlanIter {
    next: u64,
    end: u64,
    step: u64,
}

impl Iterator for PlanIter {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.end {
            return None;
        }
        let current = self.next;
        // Saturating keeps the loop terminating when the step overshoots u64.
        self.next = current.saturating_add(self.step);
        if self.next == current {
            self.next = self.end;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next >= self.end {
            0
        } else {
            (self.end - self.next).div_ceil(self.step)
        };
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// File name for the frame at output `rank`: `frame_0000.jpg` and so on.
///
/// Ranks past 9999 grow wider instead of wrapping.
pub fn output_file_name(rank: u64, format: ImageFormat) -> String {
    format!("frame_{rank:04}.{}", format.extension())
}

/// Full output path for the frame at output `rank` inside `output_dir`.
pub fn output_path(output_dir: &Path, rank: u64, format: ImageFormat) -> PathBuf {
    output_dir.join(output_file_name(rank, format))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn plan_for(request: &SamplingRequest, native_fps: f64, total_frames: u64) -> FrameIndexPlan {
        let bounds = FrameBounds::resolve(request, native_fps, total_frames);
        FrameIndexPlan::new(bounds, frame_step(request.target_fps(), native_fps))
    }

    #[test]
    fn equal_rates_keep_every_frame() {
        assert_eq!(frame_step(24.0, 24.0), 1);
        assert_eq!(frame_step(29.97, 30000.0 / 1001.0), 1);
    }

    #[test]
    fn higher_target_never_duplicates() {
        assert_eq!(frame_step(1000.0, 24.0), 1);
        assert_eq!(frame_step(60.0, 30.0), 1);
    }

    #[test]
    fn lower_target_rounds_up() {
        assert_eq!(frame_step(10.0, 30.0), 3);
        assert_eq!(frame_step(24.0, 30.0), 2);
        assert_eq!(frame_step(1.0, 29.97), 30);
        assert_eq!(frame_step(7.0, 30.0), 5);
    }

    #[test]
    fn ten_second_clip_at_one_third_rate() {
        let request = SamplingRequest::new().with_target_fps(10.0);
        let plan = plan_for(&request, 30.0, 300);

        let indices: Vec<u64> = plan.iter().collect();
        assert_eq!(indices.len(), 100);
        assert_eq!(indices[0], 0);
        assert_eq!(indices[1], 3);
        assert_eq!(*indices.last().unwrap(), 297);
        assert_eq!(plan.len(), 100);
    }

    #[test]
    fn window_bounds_use_floor() {
        let request = SamplingRequest::new()
            .with_start_time(Duration::from_secs(1))
            .with_end_time(Duration::from_secs(2));
        let bounds = FrameBounds::resolve(&request, 29.97, 1000);
        assert_eq!(bounds.start_frame, 29);
        assert_eq!(bounds.end_frame, 59);
    }

    #[test]
    fn missing_end_uses_total_frames() {
        let request = SamplingRequest::new().with_start_time(Duration::from_secs(2));
        let bounds = FrameBounds::resolve(&request, 25.0, 123);
        assert_eq!(bounds.start_frame, 50);
        assert_eq!(bounds.end_frame, 123);
    }

    #[test]
    fn end_before_start_is_empty() {
        let request = SamplingRequest::new()
            .with_start_time(Duration::from_secs(5))
            .with_end_time(Duration::from_secs(1));
        let plan = plan_for(&request, 30.0, 300);
        assert!(plan.is_empty());
        assert_eq!(plan.iter().count(), 0);
    }

    #[test]
    fn length_matches_ceiling_formula() {
        for (start, end, step) in [(0, 10, 3), (5, 6, 4), (0, 9, 3), (7, 100, 1), (3, 3, 2)] {
            let plan = FrameIndexPlan::new(
                FrameBounds {
                    start_frame: start,
                    end_frame: end,
                },
                step,
            );
            let expected = if end > start {
                (end - start).div_ceil(step)
            } else {
                0
            };
            assert_eq!(plan.len(), expected);
            assert_eq!(plan.iter().count() as u64, expected);
            assert_eq!(plan.iter().size_hint().0 as u64, expected);
        }
    }

    #[test]
    fn plan_is_strictly_increasing_and_below_end() {
        let plan = FrameIndexPlan::new(
            FrameBounds {
                start_frame: 11,
                end_frame: 200,
            },
            7,
        );
        let indices: Vec<u64> = plan.iter().collect();
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(indices.iter().all(|&index| index >= 11 && index < 200));
    }

    #[test]
    fn huge_step_terminates() {
        let plan = FrameIndexPlan::new(
            FrameBounds {
                start_frame: 10,
                end_frame: u64::MAX,
            },
            u64::MAX,
        );
        assert_eq!(plan.iter().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn ranks_count_from_window_start() {
        let plan = FrameIndexPlan::new(
            FrameBounds {
                start_frame: 30,
                end_frame: 60,
            },
            3,
        );
        assert_eq!(plan.rank_of(30), Some(0));
        assert_eq!(plan.rank_of(33), Some(1));
        assert_eq!(plan.rank_of(57), Some(9));
        assert_eq!(plan.rank_of(31), None);
        assert_eq!(plan.rank_of(60), None);
        assert_eq!(plan.rank_of(0), None);
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(output_file_name(0, ImageFormat::Jpg), "frame_0000.jpg");
        assert_eq!(output_file_name(99, ImageFormat::Png), "frame_0099.png");
        assert_eq!(output_file_name(12345, ImageFormat::Bmp), "frame_12345.bmp");
        assert_eq!(
            output_path(Path::new("out"), 7, ImageFormat::Jpg),
            Path::new("out").join("frame_0007.jpg")
        );
    }
}
