//! Sampling configuration.
//!
//! [`SamplingRequest`] describes which frames to pull out of a video and how
//! to encode them. [`FormatAllowList`] decides which input containers the
//! sampler accepts; it is passed to
//! [`FrameSampler::with_allow_list`](crate::FrameSampler::with_allow_list)
//! rather than hard-coded.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use framesplit::{ImageFormat, SamplingRequest};
//!
//! let request = SamplingRequest::new()
//!     .with_target_fps(10.0)
//!     .with_image_format(ImageFormat::Png)
//!     .with_start_time(Duration::from_secs(5))
//!     .with_end_time(Duration::from_secs(20));
//! assert_eq!(request.target_fps(), 10.0);
//! ```

use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    str::FromStr,
    time::Duration,
};

use crate::{error::FrameSplitError, timecode::parse_timecode};

/// Default output frame rate when none is requested.
pub const DEFAULT_TARGET_FPS: f64 = 24.0;

/// Container extensions accepted by [`FormatAllowList::default`].
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "avi", "mov", "mkv", "flv", "wmv"];

/// Image encoding for exported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// JPEG. This is the default.
    #[default]
    Jpg,
    /// Lossless PNG.
    Png,
    /// Uncompressed Windows bitmap.
    Bmp,
}

impl ImageFormat {
    /// File extension written after `frame_NNNN.`.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Map to the corresponding `image` crate format.
    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            "png" => Ok(ImageFormat::Png),
            "bmp" => Ok(ImageFormat::Bmp),
            other => Err(format!("unsupported image type: {other}")),
        }
    }
}

/// Mapping from lower-case file extension to whether it is accepted as input.
///
/// Extensions missing from the map are rejected. Lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatAllowList {
    extensions: HashMap<String, bool>,
}

impl Default for FormatAllowList {
    fn default() -> Self {
        Self::from_extensions(DEFAULT_VIDEO_EXTENSIONS)
    }
}

impl FormatAllowList {
    /// An allow-list that accepts nothing.
    pub fn empty() -> Self {
        Self {
            extensions: HashMap::new(),
        }
    }

    /// Build an allow-list accepting exactly the given extensions.
    ///
    /// Leading dots are stripped, so `".mp4"` and `"mp4"` are equivalent.
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extensions
            .into_iter()
            .fold(Self::empty(), |list, extension| list.with(extension, true))
    }

    /// Mark an extension as supported or unsupported.
    #[must_use]
    pub fn with<S: AsRef<str>>(mut self, extension: S, supported: bool) -> Self {
        self.extensions
            .insert(normalize_extension(extension.as_ref()), supported);
        self
    }

    /// Returns `true` if the extension is present and marked supported.
    pub fn is_supported(&self, extension: &str) -> bool {
        self.extensions
            .get(&normalize_extension(extension))
            .copied()
            .unwrap_or(false)
    }

    /// Check a path's extension against the list.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSplitError::UnsupportedFormat`] when the path has no
    /// extension or the extension is not supported.
    pub fn check(&self, path: &Path) -> Result<(), FrameSplitError> {
        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !extension.is_empty() && self.is_supported(&extension) {
            Ok(())
        } else {
            Err(FrameSplitError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

/// Which frames to sample and how to write them.
///
/// Built with chained `with_*` calls; each call consumes the request and
/// returns a new one, so a finished request is never modified in place.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct SamplingRequest {
    start_time: Option<Duration>,
    end_time: Option<Duration>,
    target_fps: f64,
    image_format: ImageFormat,
}

impl Default for SamplingRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingRequest {
    /// A request for the whole video at [`DEFAULT_TARGET_FPS`] as JPEG.
    pub fn new() -> Self {
        Self {
            start_time: None,
            end_time: None,
            target_fps: DEFAULT_TARGET_FPS,
            image_format: ImageFormat::Jpg,
        }
    }

    /// Start of the time window. Absent means the first frame.
    pub fn with_start_time(mut self, start: Duration) -> Self {
        self.start_time = Some(start);
        self
    }

    /// End of the time window (exclusive). Absent means the end of the video.
    pub fn with_end_time(mut self, end: Duration) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Parse optional `HH:MM:SS` bounds and apply them.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSplitError::InvalidTimecode`] if either bound is
    /// malformed.
    pub fn with_timecodes(
        mut self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, FrameSplitError> {
        if let Some(start) = start {
            self = self.with_start_time(parse_timecode(start)?);
        }
        if let Some(end) = end {
            self = self.with_end_time(parse_timecode(end)?);
        }
        Ok(self)
    }

    /// Requested output sampling rate in frames per second.
    ///
    /// The value is checked when extraction starts, not here.
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        self.target_fps = fps;
        self
    }

    /// Encoding for exported images.
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    pub fn start_time(&self) -> Option<Duration> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Duration> {
        self.end_time
    }

    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    /// Reject non-positive or non-finite target rates.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSplitError::TargetFpsInvalid`].
    pub fn validate(&self) -> Result<(), FrameSplitError> {
        if self.target_fps.is_finite() && self.target_fps > 0.0 {
            Ok(())
        } else {
            Err(FrameSplitError::TargetFpsInvalid(self.target_fps))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn default_allow_list_matches_known_containers() {
        let list = FormatAllowList::default();
        for extension in DEFAULT_VIDEO_EXTENSIONS {
            assert!(list.is_supported(extension), "{extension} should be allowed");
        }
        assert!(!list.is_supported("txt"));
        assert!(!list.is_supported("webm"));
    }

    #[test]
    fn allow_list_is_case_insensitive() {
        let list = FormatAllowList::default();
        assert!(list.check(Path::new("clip.MP4")).is_ok());
        assert!(list.check(Path::new("/videos/Holiday.MkV")).is_ok());
    }

    #[test]
    fn allow_list_rejects_unknown_and_missing_extensions() {
        let list = FormatAllowList::default();

        let error = list.check(Path::new("notes.txt")).unwrap_err();
        match error {
            FrameSplitError::UnsupportedFormat { path, extension } => {
                assert_eq!(path, PathBuf::from("notes.txt"));
                assert_eq!(extension, "txt");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(list.check(Path::new("no_extension")).is_err());
    }

    #[test]
    fn allow_list_entries_can_be_disabled_or_added() {
        let list = FormatAllowList::default()
            .with("flv", false)
            .with(".WEBM", true);
        assert!(!list.is_supported("flv"));
        assert!(list.is_supported("webm"));
        assert!(list.check(Path::new("a.webm")).is_ok());
    }

    #[test]
    fn image_format_parses_cli_names() {
        assert_eq!("jpg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpg);
        assert_eq!("JPEG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpg);
        assert_eq!(".png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("bmp".parse::<ImageFormat>().unwrap(), ImageFormat::Bmp);
        assert!("gif".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn request_defaults() {
        let request = SamplingRequest::new();
        assert_eq!(request.target_fps(), DEFAULT_TARGET_FPS);
        assert_eq!(request.image_format(), ImageFormat::Jpg);
        assert!(request.start_time().is_none());
        assert!(request.end_time().is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_rejects_bad_fps() {
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let error = SamplingRequest::new()
                .with_target_fps(fps)
                .validate()
                .unwrap_err();
            assert!(matches!(error, FrameSplitError::TargetFpsInvalid(_)));
        }
    }

    #[test]
    fn request_parses_timecodes() {
        let request = SamplingRequest::new()
            .with_timecodes(Some("00:00:05"), Some("00:01:00"))
            .unwrap();
        assert_eq!(request.start_time(), Some(Duration::from_secs(5)));
        assert_eq!(request.end_time(), Some(Duration::from_secs(60)));

        assert!(SamplingRequest::new().with_timecodes(Some("5"), None).is_err());
    }
}
