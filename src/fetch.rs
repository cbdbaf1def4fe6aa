//! Video downloading.
//!
//! The sampler and driver treat downloading as an opaque collaborator: any
//! implementation of [`Fetcher`] that turns a URL into a fully-downloaded
//! local file will do. [`HttpFetcher`] is the shipped implementation, a
//! blocking ureq client with explicit timeouts and a small bounded retry.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use crate::error::SiftError;

/// Something that can turn a URL into a local file.
///
/// Implementations must either return a path to a fully-downloaded file or
/// fail; partially-written files must not be left at the returned path.
pub trait Fetcher {
    /// Download `url` into `download_dir` and return the local path.
    fn fetch(&self, url: &str, download_dir: &Path) -> Result<PathBuf, SiftError>;
}

/// Blocking HTTP downloader backed by [`ureq`].
///
/// The local filename is derived from the last path segment of the URL
/// (query string and fragment stripped). A failing transfer is retried up to
/// [`HttpFetcher::MAX_ATTEMPTS`] times with linear backoff before giving up,
/// and any partial file is removed.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Attempts per URL before giving up.
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Create a fetcher with a 20 s connect timeout and a 60 s read timeout.
    ///
    /// Archive servers can be slow to serve large files, so the read timeout
    /// applies per read call, not to the whole transfer.
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(20))
            .timeout_read(Duration::from_secs(60))
            .build();
        Self { agent }
    }

    /// Single download attempt, streaming the body to `target`.
    fn fetch_once(&self, url: &str, target: &Path) -> Result<(), SiftError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|error| SiftError::Download {
                url: url.to_string(),
                reason: error.to_string(),
            })?;

        let mut reader = response.into_reader();
        let mut file = File::create(target)?;

        if let Err(error) = io::copy(&mut reader, &mut file) {
            // Never leave a truncated file where a caller expects a
            // fully-downloaded video.
            drop(file);
            let _ = fs::remove_file(target);
            return Err(SiftError::Download {
                url: url.to_string(),
                reason: format!("transfer interrupted: {error}"),
            });
        }

        Ok(())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, download_dir: &Path) -> Result<PathBuf, SiftError> {
        fs::create_dir_all(download_dir)?;

        let file_name = file_name_for_url(url)?;
        let target = download_dir.join(file_name);

        let mut last_error = None;
        for attempt in 1..=Self::MAX_ATTEMPTS {
            log::debug!("Downloading {url} (attempt {attempt}/{})", Self::MAX_ATTEMPTS);

            match self.fetch_once(url, &target) {
                Ok(()) => {
                    log::info!("Downloaded {url} -> {}", target.display());
                    return Ok(target);
                }
                Err(error) => {
                    log::warn!("Download attempt {attempt} for {url} failed: {error}");
                    last_error = Some(error);
                    if attempt < Self::MAX_ATTEMPTS {
                        thread::sleep(Duration::from_secs(attempt as u64));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SiftError::Download {
            url: url.to_string(),
            reason: "no attempts were made".to_string(),
        }))
    }
}

/// Derive a local filename from a URL's last path segment.
///
/// Query string and fragment are stripped first. Fails with
/// [`SiftError::UnnamableUrl`] when the path ends in `/` or the URL has no
/// path component at all.
pub fn file_name_for_url(url: &str) -> Result<String, SiftError> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);

    // Drop the scheme and authority so a bare host never masquerades as a
    // filename.
    let path = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);

    match path.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(SiftError::UnnamableUrl(url.to_string())),
    }
}
