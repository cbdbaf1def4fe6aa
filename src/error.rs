//! Error types for the `framesift` crate.
//!
//! This module defines [`SiftError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry enough context to diagnose
//! a problem without additional logging at the call site, including file
//! paths, URLs, and upstream error messages.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framesift` operations.
///
/// Every public method that can fail returns `Result<T, SiftError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SiftError {
    /// The video file could not be opened or parsed as a media container.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::DecodeSession::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    FrameDecode(String),

    /// A video could not be downloaded.
    #[error("Failed to download {url}: {reason}")]
    Download {
        /// The URL that was being fetched.
        url: String,
        /// Underlying reason the transfer failed.
        reason: String,
    },

    /// A URL carries no usable filename in its path component.
    #[error("Cannot derive a filename from URL: {0}")]
    UnnamableUrl(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while encoding a frame to PNG.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for SiftError {
    fn from(error: FfmpegError) -> Self {
        SiftError::Ffmpeg(error.to_string())
    }
}

impl SiftError {
    /// Whether this error came from opening or decoding a video, as opposed
    /// to downloading or filesystem work.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            SiftError::FileOpen { .. }
                | SiftError::NoVideoStream
                | SiftError::FrameDecode(_)
                | SiftError::Ffmpeg(_)
        )
    }
}
