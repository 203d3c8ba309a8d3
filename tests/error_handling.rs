//! Error handling integration tests.
//!
//! These tests verify that each failure kind is reported before any output
//! is produced.

use std::path::Path;

use framesplit::{FormatAllowList, FrameSampler, FrameSplitError, SamplingRequest};

#[test]
fn unsupported_extension_is_rejected() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = temporary_directory.path().join("notes.txt");
    std::fs::write(&input, b"plain text").expect("Failed to write input");
    let output_dir = temporary_directory.path().join("frames");

    let error = FrameSampler::new()
        .extract(&input, &output_dir, &SamplingRequest::new())
        .unwrap_err();

    assert!(matches!(error, FrameSplitError::UnsupportedFormat { .. }));
    assert_eq!(error.exit_code(), 10);
    assert!(!output_dir.exists());
}

#[test]
fn extension_check_ignores_case() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_dir = temporary_directory.path().join("frames");

    // Passes the extension check, then fails to open.
    let error = FrameSampler::new()
        .extract(
            temporary_directory.path().join("MISSING.MOV"),
            &output_dir,
            &SamplingRequest::new(),
        )
        .unwrap_err();

    assert!(matches!(error, FrameSplitError::SourceOpen { .. }));
}

#[test]
fn injected_allow_list_is_used() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let sampler =
        FrameSampler::new().with_allow_list(FormatAllowList::default().with("mp4", false));

    let error = sampler
        .extract(
            temporary_directory.path().join("clip.mp4"),
            temporary_directory.path().join("frames"),
            &SamplingRequest::new(),
        )
        .unwrap_err();

    assert!(matches!(error, FrameSplitError::UnsupportedFormat { .. }));
}

#[test]
fn non_positive_fps_is_rejected() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_dir = temporary_directory.path().join("frames");

    let error = FrameSampler::new()
        .extract(
            temporary_directory.path().join("clip.mp4"),
            &output_dir,
            &SamplingRequest::new().with_target_fps(-2.0),
        )
        .unwrap_err();

    assert!(matches!(error, FrameSplitError::TargetFpsInvalid(_)));
    assert_eq!(error.exit_code(), 11);
    assert!(!output_dir.exists());
}

#[test]
fn open_nonexistent_file() {
    let error = FrameSampler::new()
        .extract(
            "this_file_does_not_exist.mp4",
            "unused_output",
            &SamplingRequest::new(),
        )
        .unwrap_err();

    let error_message = error.to_string();
    assert!(
        error_message.contains("Failed to open video source"),
        "Error message should mention open failure: {error_message}",
    );
    assert!(!Path::new("unused_output").exists());
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");
    let output_dir = temporary_directory.path().join("frames");

    let error = FrameSampler::new()
        .extract(&invalid_file_path, &output_dir, &SamplingRequest::new())
        .unwrap_err();

    assert!(matches!(error, FrameSplitError::SourceOpen { .. }));
    assert_eq!(error.exit_code(), 13);
    assert!(!output_dir.exists());
}

#[test]
fn malformed_timecode_is_rejected() {
    let error = SamplingRequest::new()
        .with_timecodes(Some("1:30"), None)
        .unwrap_err();
    assert!(matches!(error, FrameSplitError::InvalidTimecode { .. }));
    assert_eq!(error.exit_code(), 12);
}
