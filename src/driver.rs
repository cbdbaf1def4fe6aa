//! Batch dataset building.
//!
//! [`BatchDriver`] strings the collaborators together: for each URL it
//! downloads the video, samples its frame window into the output directory,
//! and moves on. One bad video never aborts the batch; download and decode
//! failures are logged and counted, and the source file of a failed sample
//! is kept on disk for inspection.
//!
//! Processing is sequential and single-threaded. Ordinals increase
//! monotonically from 0 across the URL list, and a failed URL still consumes
//! its ordinal so output naming stays deterministic across retries of the
//! same list.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{BatchDriver, HttpFetcher, SampleOptions};
//!
//! let driver = BatchDriver::new(HttpFetcher::new())
//!     .with_download_dir("downloads")
//!     .with_output_dir("dataset")
//!     .with_options(SampleOptions::new());
//!
//! let urls = vec!["https://archive.example.org/item/cartoon.mp4".to_string()];
//! let summary = driver.run(&urls);
//! println!("{} frames from {} videos", summary.frames_written, summary.videos_processed);
//! ```

use std::path::{Path, PathBuf};

use crate::error::SiftError;
use crate::fetch::Fetcher;
use crate::sampler::{SampleOptions, sample};

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Videos downloaded and sampled successfully.
    pub videos_processed: usize,
    /// Videos skipped because download or sampling failed.
    pub videos_failed: usize,
    /// Total images written across the batch.
    pub frames_written: u64,
}

/// Sequential download-and-sample driver.
///
/// Generic over the [`Fetcher`] so tests (and future API-based fetchers) can
/// substitute the download step.
pub struct BatchDriver<F: Fetcher> {
    fetcher: F,
    options: SampleOptions,
    download_dir: PathBuf,
    output_dir: PathBuf,
}

impl<F: Fetcher> BatchDriver<F> {
    /// Create a driver with the default directories (`./downloads`,
    /// `./dataset`) and default [`SampleOptions`].
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            options: SampleOptions::new(),
            download_dir: PathBuf::from("downloads"),
            output_dir: PathBuf::from("dataset"),
        }
    }

    /// Set the directory videos are downloaded into.
    #[must_use]
    pub fn with_download_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.download_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the directory frame images are written into.
    #[must_use]
    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the sampling options applied to every video.
    #[must_use]
    pub fn with_options(mut self, options: SampleOptions) -> Self {
        self.options = options;
        self
    }

    /// Download and sample a single URL under the given ordinal.
    ///
    /// Exposed so callers driving their own progress display can run the
    /// batch loop themselves; [`run`](BatchDriver::run) is built on this.
    ///
    /// # Errors
    ///
    /// Propagates download errors from the fetcher and decode/write errors
    /// from the sampler. The downloaded file is left in place when sampling
    /// fails.
    pub fn process(&self, url: &str, ordinal: u64) -> Result<u64, SiftError> {
        log::info!("Downloading {url}...");
        let local_path = self.fetcher.fetch(url, &self.download_dir)?;
        sample(&local_path, &self.output_dir, ordinal, &self.options)
    }

    /// Process every URL in order, skipping failures.
    pub fn run(&self, urls: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (ordinal, url) in urls.iter().enumerate() {
            match self.process(url, ordinal as u64) {
                Ok(written) => {
                    summary.videos_processed += 1;
                    summary.frames_written += written;
                }
                Err(error) => {
                    log::warn!("Skipping {url}: {error}");
                    summary.videos_failed += 1;
                }
            }
        }

        log::info!(
            "Batch complete: {} videos processed, {} failed, {} frames written",
            summary.videos_processed,
            summary.videos_failed,
            summary.frames_written,
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Fetcher;
    use std::path::Path;

    /// Fetcher that fails every request, as a persistently bad URL would.
    struct AlwaysFails;

    impl Fetcher for AlwaysFails {
        fn fetch(&self, url: &str, _download_dir: &Path) -> Result<PathBuf, SiftError> {
            Err(SiftError::Download {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    /// Fetcher that pretends the file is already on disk but hands back
    /// something undecodable.
    struct ServesGarbage;

    impl Fetcher for ServesGarbage {
        fn fetch(&self, url: &str, download_dir: &Path) -> Result<PathBuf, SiftError> {
            std::fs::create_dir_all(download_dir)?;
            let name = crate::fetch::file_name_for_url(url)?;
            let path = download_dir.join(name);
            std::fs::write(&path, b"not a video")?;
            Ok(path)
        }
    }

    #[test]
    fn failed_downloads_do_not_abort_the_batch() {
        let driver = BatchDriver::new(AlwaysFails);
        let urls = vec![
            "https://example.org/a.mp4".to_string(),
            "https://example.org/b.mp4".to_string(),
        ];

        let summary = driver.run(&urls);
        assert_eq!(summary.videos_processed, 0);
        assert_eq!(summary.videos_failed, 2);
        assert_eq!(summary.frames_written, 0);
    }

    #[test]
    fn undecodable_videos_are_skipped_and_kept_on_disk() {
        let scratch = tempfile::tempdir().expect("Failed to create temp dir");
        let download_dir = scratch.path().join("downloads");
        let output_dir = scratch.path().join("dataset");

        let driver = BatchDriver::new(ServesGarbage)
            .with_download_dir(&download_dir)
            .with_output_dir(&output_dir);

        let urls = vec!["https://example.org/broken.mp4".to_string()];
        let summary = driver.run(&urls);

        assert_eq!(summary.videos_failed, 1);
        assert_eq!(summary.frames_written, 0);
        // The source stays behind for inspection when sampling fails.
        assert!(download_dir.join("broken.mp4").exists());
        // No partial frame output was produced.
        let outputs = std::fs::read_dir(&output_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(outputs, 0);
    }
}
