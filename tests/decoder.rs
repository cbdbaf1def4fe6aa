//! Frame decoder integration tests.
//!
//! Uses the fixture-guard convention: decode-dependent assertions are
//! skipped when `tests/fixtures/sample_video.mp4` is absent.

use std::path::Path;

use framesift::DecodeSession;

const FIXTURE: &str = "tests/fixtures/sample_video.mp4";

#[test]
fn metadata_is_available_without_decoding() {
    if !Path::new(FIXTURE).exists() {
        return;
    }

    let session = DecodeSession::open(FIXTURE).expect("Failed to open fixture");
    assert!(session.width() > 0);
    assert!(session.height() > 0);
    assert!(session.frame_rate() > 0.0, "Fixture should report a frame rate");
    assert!(!session.codec().is_empty());
    assert_eq!(session.path(), Path::new(FIXTURE));
}

#[test]
fn frames_are_indexed_sequentially_from_zero() {
    if !Path::new(FIXTURE).exists() {
        return;
    }

    let session = DecodeSession::open(FIXTURE).expect("Failed to open fixture");
    let width = session.width();
    let height = session.height();

    let mut expected: u64 = 0;
    for result in session.frames() {
        let (index, image) = result.expect("Frame decode failed");
        assert_eq!(index, expected, "Indices must be a gapless run from 0");
        assert_eq!(image.width(), width);
        assert_eq!(image.height(), height);
        expected += 1;
    }

    assert!(expected > 0, "Fixture should contain at least one frame");
}

#[test]
fn iterator_is_finite_and_fused() {
    if !Path::new(FIXTURE).exists() {
        return;
    }

    let session = DecodeSession::open(FIXTURE).expect("Failed to open fixture");
    let mut frames = session.frames();
    while frames.next().is_some() {}

    // Exhausted iterators stay exhausted.
    assert!(frames.next().is_none());
    assert!(frames.next().is_none());
}

#[test]
fn frame_count_estimate_tracks_the_real_count() {
    if !Path::new(FIXTURE).exists() {
        return;
    }

    let session = DecodeSession::open(FIXTURE).expect("Failed to open fixture");
    let estimate = session.frame_count_estimate();
    if estimate == 0 {
        // Container reported no duration; nothing to compare.
        return;
    }

    let actual = session.frames().filter(|result| result.is_ok()).count() as u64;

    // The estimate is metadata-based and may be off by a handful of frames.
    let difference = estimate.abs_diff(actual);
    assert!(
        difference <= estimate / 10 + 5,
        "Estimate {estimate} is too far from actual {actual}",
    );
}
