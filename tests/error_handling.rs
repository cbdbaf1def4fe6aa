//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for unreadable
//! inputs and that failed runs never leave partial output behind.

use framesift::{DecodeSession, SampleOptions, sample};

#[test]
fn open_nonexistent_file() {
    let result = DecodeSession::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open video file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    // A file with garbage content is not a media container.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = DecodeSession::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
    assert!(result.unwrap_err().is_decode());
}

#[test]
fn sampling_malformed_input_leaves_no_partial_output() {
    let scratch = tempfile::tempdir().expect("Failed to create temp dir");
    let source = scratch.path().join("broken.mp4");
    std::fs::write(&source, b"definitely not a video").expect("Failed to write invalid file");

    let output_dir = scratch.path().join("dataset");
    let options = SampleOptions::new();

    let result = sample(&source, &output_dir, 0, &options);
    assert!(result.is_err(), "Expected decode error for malformed video");

    // Zero partial output files, and the source must survive even though
    // delete_after defaults to true, because processing failed.
    let outputs = std::fs::read_dir(&output_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(outputs, 0, "No frame images should be written");
    assert!(source.exists(), "Failed runs must keep the source file");
}

#[test]
fn errors_format_with_context() {
    let error = framesift::SiftError::Download {
        url: "https://example.org/a.mp4".to_string(),
        reason: "connection reset".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("https://example.org/a.mp4"));
    assert!(message.contains("connection reset"));
    assert!(!error.is_decode());
}
