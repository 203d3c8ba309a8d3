//! `HH:MM:SS` timecode parsing.
//!
//! Time window bounds are given as three colon-separated integer components
//! and converted to whole seconds as `h * 3600 + m * 60 + s`. Components are
//! not range-checked against each other, so `00:90:00` is ninety minutes.

use std::time::Duration;

use crate::error::FrameSplitError;

/// Parse an `HH:MM:SS` timecode into a whole-second [`Duration`].
///
/// Surrounding whitespace is ignored. Each component must be a non-negative
/// integer; fractional seconds are rejected.
///
/// # Errors
///
/// Returns [`FrameSplitError::InvalidTimecode`] if the text does not have
/// exactly three components or a component is not an integer.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// let start = framesplit::parse_timecode("01:02:03")?;
/// assert_eq!(start, Duration::from_secs(3723));
/// # Ok::<(), framesplit::FrameSplitError>(())
/// ```
pub fn parse_timecode(value: &str) -> Result<Duration, FrameSplitError> {
    let invalid = |reason: &str| FrameSplitError::InvalidTimecode {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("time value cannot be empty"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid("expected HH:MM:SS"));
    }

    let mut seconds = 0_u64;
    for (part, weight) in parts.iter().zip([3600_u64, 60, 1]) {
        let component = part
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid(&format!("'{part}' is not a whole number")))?;
        seconds = component
            .checked_mul(weight)
            .and_then(|scaled| seconds.checked_add(scaled))
            .ok_or_else(|| invalid("value is too large"))?;
    }

    Ok(Duration::from_secs(seconds))
}

/// Format a duration as `HH:MM:SS`, truncating sub-second precision.
pub fn format_timecode(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
