//! Video URL listings.
//!
//! Scraping an archive listing page is out of scope for this crate; the
//! driver only needs a sequence of direct-download URLs. [`VideoListing`] is
//! the seam that keeps the source pluggable (a browser-automation scraper,
//! an archive API client, a plain text file) without touching the sampler.
//!
//! [`LinksFile`] is the shipped implementation: one URL per line, filtered
//! by file extension, with duplicate video stems skipped.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::error::SiftError;

/// Default extensions accepted from a listing, matching the archive's
/// vintage-cartoon holdings.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp4", "mpeg"];

/// A source of direct-download video URLs.
pub trait VideoListing {
    /// Produce the list of video URLs to process, in order.
    fn list_video_urls(&self) -> Result<Vec<String>, SiftError>;
}

/// A newline-separated links file, as written by the archive scraper.
///
/// Blank lines are ignored. URLs whose extension is not in the allow-list
/// are dropped, and URLs whose stem (everything before the final `.`)
/// duplicates an earlier entry are skipped with a warning, so each video is
/// downloaded at most once even when the archive serves it in several
/// formats.
pub struct LinksFile {
    path: PathBuf,
    extensions: Vec<String>,
}

impl LinksFile {
    /// Read URLs from `path`, accepting the [`DEFAULT_EXTENSIONS`].
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_extensions(path, DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()))
    }

    /// Read URLs from `path`, accepting only the given extensions
    /// (lowercase, without the leading dot).
    pub fn with_extensions<P, I>(path: P, extensions: I) -> Self
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = String>,
    {
        Self {
            path: path.as_ref().to_path_buf(),
            extensions: extensions.into_iter().collect(),
        }
    }
}

impl VideoListing for LinksFile {
    fn list_video_urls(&self) -> Result<Vec<String>, SiftError> {
        let contents = fs::read_to_string(&self.path)?;
        let urls = filter_urls(contents.lines(), &self.extensions);
        log::info!(
            "Loaded {} video URLs from {}",
            urls.len(),
            self.path.display(),
        );
        Ok(urls)
    }
}

/// Extension of a URL (lowercased), if it has one.
fn url_extension(url: &str) -> Option<String> {
    let (stem, extension) = url.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() || extension.contains('/') {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Filter a raw URL sequence down to unique, allowed video URLs.
///
/// Keeps input order. A URL passes when its extension is in `extensions` and
/// its stem has not been seen before; duplicate stems are logged and
/// dropped.
fn filter_urls<'a, I>(urls: I, extensions: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen_stems: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();

    for url in urls {
        let url = url.trim();
        if url.is_empty() {
            continue;
        }

        let Some(extension) = url_extension(url) else {
            log::debug!("Skipping URL without an extension: {url}");
            continue;
        };
        if !extensions.iter().any(|allowed| *allowed == extension) {
            log::debug!("Skipping URL with extension .{extension}: {url}");
            continue;
        }

        let stem = url[..url.len() - extension.len() - 1].to_string();
        if !seen_stems.insert(stem) {
            log::warn!("Skipping duplicate video: {url}");
            continue;
        }

        kept.push(url.to_string());
    }

    kept
}
