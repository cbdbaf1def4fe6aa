//! Time-windowed frame sampling.
//!
//! [`sample`] is the core of the dataset pipeline: it decodes one video,
//! keeps the frames inside a window derived from a lead-in and a trailing
//! cut (both expressed as wall-clock durations and converted to frame
//! indices via the stream's reported frame rate), and writes each retained
//! frame as `{ordinal}-frame{index}.png` in the output directory.
//!
//! The end boundary is precomputed from container metadata (duration x fps)
//! rather than learned by buffering the full decoded sequence. That keeps
//! sampling streaming and lets decode stop as soon as the window has been
//! passed; when the container reports no duration the trailing cut cannot be
//! applied and the window extends to the end of the stream.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{SampleOptions, sample};
//! use std::time::Duration;
//!
//! let options = SampleOptions::new()
//!     .with_start_after(Duration::from_secs(60))
//!     .with_cut_last(Duration::from_secs(60))
//!     .with_delete_after(false);
//!
//! let written = sample("downloads/cartoon.mp4", "dataset", 0, &options)?;
//! println!("{written} frames written");
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::{fs, path::Path, time::Duration};

use crate::decoder::DecodeSession;
use crate::error::SiftError;

/// Options controlling one [`sample`] run.
///
/// Defaults match the archival-cartoon pipeline this crate was built for:
/// skip the first minute (title cards), drop the last minute (credits), and
/// delete the source video once its frames are on disk.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    /// Lead-in to skip before the first retained frame.
    pub start_after: Duration,
    /// Trailing segment to drop before the end of the stream.
    pub cut_last: Duration,
    /// Remove the source file after a fully successful run.
    pub delete_after: bool,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleOptions {
    /// Create options with the defaults: 60 s lead-in, 60 s trailing cut,
    /// delete the source afterward.
    pub fn new() -> Self {
        Self {
            start_after: Duration::from_secs(60),
            cut_last: Duration::from_secs(60),
            delete_after: true,
        }
    }

    /// Set the lead-in duration to skip.
    #[must_use]
    pub fn with_start_after(mut self, start_after: Duration) -> Self {
        self.start_after = start_after;
        self
    }

    /// Set the trailing duration to drop.
    #[must_use]
    pub fn with_cut_last(mut self, cut_last: Duration) -> Self {
        self.cut_last = cut_last;
        self
    }

    /// Control whether the source file is removed after a successful run.
    #[must_use]
    pub fn with_delete_after(mut self, delete_after: bool) -> Self {
        self.delete_after = delete_after;
        self
    }
}

/// The contiguous range of frame indices retained for output.
///
/// Derived from the frame rate, the (estimated) total frame count, and the
/// lead-in / trailing-cut durations. `end` is inclusive; `None` means the
/// window extends to the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    /// First retained frame index (inclusive).
    pub start: u64,
    /// Last retained frame index (inclusive), or `None` for "until EOF".
    pub end: Option<u64>,
    empty: bool,
}

impl FrameWindow {
    /// Compute the window for a stream.
    ///
    /// `start = round(fps * start_after)` and
    /// `end = total_frames - round(fps * cut_last)`, with these degenerate
    /// cases:
    ///
    /// - `fps <= 0` — frame timing is unknowable, so the whole stream is
    ///   retained (`start = 0`, unbounded end).
    /// - `total_frames == 0` (duration unknown) — the trailing cut cannot be
    ///   placed, so the end is unbounded.
    /// - `end < start` (including a negative end) — the window is empty and
    ///   no frames are retained. This is not an error.
    pub fn from_timing(
        fps: f64,
        total_frames: u64,
        start_after: Duration,
        cut_last: Duration,
    ) -> Self {
        if fps <= 0.0 {
            return Self {
                start: 0,
                end: None,
                empty: false,
            };
        }

        let start = (fps * start_after.as_secs_f64()).round() as u64;

        if total_frames == 0 {
            return Self {
                start,
                end: None,
                empty: false,
            };
        }

        let end = total_frames as i64 - (fps * cut_last.as_secs_f64()).round() as i64;
        if end < start as i64 {
            return Self::empty();
        }

        Self {
            start,
            end: Some(end as u64),
            empty: false,
        }
    }

    /// A window that retains nothing.
    pub fn empty() -> Self {
        Self {
            start: 0,
            end: Some(0),
            empty: true,
        }
    }

    /// Whether the window retains no frames at all.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether frame `index` falls inside the window.
    pub fn contains(&self, index: u64) -> bool {
        !self.empty && index >= self.start && self.end.is_none_or(|end| index <= end)
    }

    /// Whether frame `index` is beyond the window, i.e. decoding can stop.
    pub fn is_past(&self, index: u64) -> bool {
        self.empty || self.end.is_some_and(|end| index > end)
    }
}

/// Output filename for one retained frame.
fn frame_file_name(ordinal: u64, index: u64) -> String {
    format!("{ordinal}-frame{index}.png")
}

/// Sample a contiguous window of frames from one video into `output_dir`.
///
/// Opens a decode session on `path`, derives the [`FrameWindow`] from the
/// stream's frame rate and duration, and writes every in-window frame as
/// `{ordinal}-frame{index}.png`. Existing files with the same name are
/// overwritten, so re-running with identical inputs is idempotent. Decoding
/// stops as soon as the window has been passed.
///
/// When `options.delete_after` is set the source file is removed after the
/// run completes; cleanup is skipped entirely if decoding or writing failed
/// partway, leaving the source available for inspection.
///
/// Returns the number of images written. An empty window (short video,
/// aggressive cuts) writes nothing and is not an error.
///
/// # Errors
///
/// [`SiftError::FileOpen`] / [`SiftError::NoVideoStream`] when the file is
/// not a decodable video, [`SiftError::FrameDecode`] / [`SiftError::Ffmpeg`]
/// on mid-stream decode failures, and [`SiftError::Io`] /
/// [`SiftError::Image`] on output failures. Already-written frames from the
/// same run are left on disk.
pub fn sample<P, Q>(
    path: P,
    output_dir: Q,
    ordinal: u64,
    options: &SampleOptions,
) -> Result<u64, SiftError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path = path.as_ref();
    let output_dir = output_dir.as_ref();

    let session = DecodeSession::open(path)?;
    let fps = session.frame_rate();
    let total = session.frame_count_estimate();

    let window = FrameWindow::from_timing(fps, total, options.start_after, options.cut_last);
    log::debug!(
        "Sampling {} (ordinal {ordinal}): fps={fps:.2}, ~{total} frames, window={window:?}",
        path.display(),
    );

    fs::create_dir_all(output_dir)?;

    let mut written: u64 = 0;

    if !window.is_empty() {
        for result in session.frames() {
            let (index, image) = result?;

            if window.is_past(index) {
                break;
            }
            if !window.contains(index) {
                continue;
            }

            let output_path = output_dir.join(frame_file_name(ordinal, index));
            image.save(&output_path)?;
            written += 1;
            log::trace!("Wrote {}", output_path.display());
        }
    } else {
        log::info!(
            "{}: window is empty (video shorter than lead-in + trailing cut), nothing to write",
            path.display(),
        );
    }

    log::info!(
        "Sampled {} frames from {} (ordinal {ordinal})",
        written,
        path.display(),
    );

    if options.delete_after {
        fs::remove_file(path)?;
        log::debug!("Removed source file {}", path.display());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_index_is_fps_times_lead_in_rounded() {
        let window =
            FrameWindow::from_timing(29.97, 10_000, Duration::from_secs(60), Duration::ZERO);
        assert_eq!(window.start, 1798); // round(29.97 * 60)
    }

    #[test]
    fn thirty_fps_one_second_cuts_give_inclusive_window() {
        // N = 300 frames at 30 fps, 1 s lead-in, 1 s trailing cut.
        let window = FrameWindow::from_timing(
            30.0,
            300,
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        assert_eq!(window.start, 30);
        assert_eq!(window.end, Some(270));

        assert!(!window.contains(29));
        assert!(window.contains(30));
        assert!(window.contains(270));
        assert!(!window.contains(271));
        assert!(window.is_past(271));
        assert!(!window.is_past(270));
    }

    #[test]
    fn video_shorter_than_both_cuts_yields_empty_window() {
        // 50 frames at 30 fps cannot absorb 1 s + 1 s of cuts.
        let window = FrameWindow::from_timing(
            30.0,
            50,
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        assert!(window.is_empty());
        assert!(!window.contains(0));
        assert!(window.is_past(0));
    }

    #[test]
    fn negative_end_index_is_empty_not_an_error() {
        let window =
            FrameWindow::from_timing(30.0, 10, Duration::ZERO, Duration::from_secs(60));
        assert!(window.is_empty());
    }

    #[test]
    fn zero_fps_retains_the_entire_stream() {
        let window = FrameWindow::from_timing(
            0.0,
            0,
            Duration::from_secs(60),
            Duration::from_secs(60),
        );
        assert_eq!(window.start, 0);
        assert_eq!(window.end, None);
        assert!(window.contains(0));
        assert!(window.contains(1_000_000));
        assert!(!window.is_past(1_000_000));
    }

    #[test]
    fn unknown_duration_skips_the_trailing_cut() {
        let window = FrameWindow::from_timing(
            25.0,
            0,
            Duration::from_secs(2),
            Duration::from_secs(60),
        );
        assert_eq!(window.start, 50);
        assert_eq!(window.end, None);
        assert!(!window.contains(49));
        assert!(window.contains(50));
    }

    #[test]
    fn zero_cuts_keep_every_frame() {
        let window = FrameWindow::from_timing(30.0, 100, Duration::ZERO, Duration::ZERO);
        assert_eq!(window.start, 0);
        assert_eq!(window.end, Some(100));
        assert!(window.contains(0));
        assert!(window.contains(99));
    }

    #[test]
    fn frame_file_names_are_deterministic() {
        assert_eq!(frame_file_name(0, 30), "0-frame30.png");
        assert_eq!(frame_file_name(17, 1234), "17-frame1234.png");
    }

    #[test]
    fn default_options_match_the_pipeline_defaults() {
        let options = SampleOptions::default();
        assert_eq!(options.start_after, Duration::from_secs(60));
        assert_eq!(options.cut_last, Duration::from_secs(60));
        assert!(options.delete_after);
    }
}
