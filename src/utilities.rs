//! Internal utility functions.
//!
//! Pixel-data copying and timestamp conversion shared by the FFmpeg source.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Pack the first plane of an RGB24 frame into `width * 3` byte rows,
/// dropping any line padding FFmpeg added.
pub(crate) fn packed_rgb(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let row_bytes = width as usize * 3;
    let rows = height as usize;
    let stride = frame.stride(0);
    let plane = frame.data(0);

    if stride == row_bytes {
        return plane[..row_bytes * rows].to_vec();
    }
    plane
        .chunks(stride)
        .take(rows)
        .flat_map(|line| &line[..row_bytes])
        .copied()
        .collect()
}

/// Convert a rational frame rate to frames per second, or `None` if it is
/// zero or undefined.
pub(crate) fn rational_to_fps(rate: Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}

/// Rescale a stream-time-base value to a [`Duration`]. Negative values map
/// to zero.
pub(crate) fn stream_time_to_duration(value: i64, time_base: Rational) -> Duration {
    if value <= 0 || time_base.denominator() == 0 {
        return Duration::ZERO;
    }
    let seconds = value as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    Duration::from_secs_f64(seconds.max(0.0))
}

/// Estimate a frame count from duration and frame rate.
///
/// Rounds down so the estimate never names a frame past the end of the
/// stream. The small slack absorbs float error in durations that are an
/// exact number of frames.
pub(crate) fn estimate_frame_count(duration: Duration, frames_per_second: f64) -> u64 {
    (duration.as_secs_f64() * frames_per_second + 1e-3).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_from_rational() {
        assert_eq!(rational_to_fps(Rational::new(30, 1)), Some(30.0));
        let ntsc = rational_to_fps(Rational::new(30000, 1001)).unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
        assert_eq!(rational_to_fps(Rational::new(0, 1)), None);
        assert_eq!(rational_to_fps(Rational::new(25, 0)), None);
    }

    #[test]
    fn stream_time_rescales() {
        let duration = stream_time_to_duration(90_000 * 10, Rational::new(1, 90_000));
        assert_eq!(duration, Duration::from_secs(10));
        assert_eq!(
            stream_time_to_duration(-5, Rational::new(1, 1000)),
            Duration::ZERO
        );
    }

    #[test]
    fn frame_count_estimate_never_overshoots() {
        assert_eq!(estimate_frame_count(Duration::from_secs(10), 30.0), 300);
        assert_eq!(
            estimate_frame_count(Duration::from_millis(9_999), 30.0),
            299
        );
        assert_eq!(
            estimate_frame_count(Duration::from_millis(10_020), 30.0),
            300
        );
        assert_eq!(
            estimate_frame_count(Duration::from_secs(10), 30_000.0 / 1_001.0),
            299
        );
    }
}
