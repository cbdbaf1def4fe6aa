//! # framesift
//!
//! Build image datasets from public video archives — download videos and
//! sample time-windowed frames as PNGs, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! The core of the crate is the windowed frame sampler: it decodes a video,
//! converts a lead-in and a trailing-cut duration into frame indices using
//! the stream's reported frame rate, and writes every frame inside that
//! window as `{ordinal}-frame{index}.png`. Downloading and URL listing are
//! thin collaborators behind the [`Fetcher`] and [`VideoListing`] traits.
//!
//! ## Quick Start
//!
//! ### Sample one video
//!
//! ```no_run
//! use framesift::{SampleOptions, sample};
//!
//! let options = SampleOptions::new().with_delete_after(false);
//! let written = sample("downloads/cartoon.mp4", "dataset", 0, &options)?;
//! println!("{written} frames written");
//! # Ok::<(), framesift::SiftError>(())
//! ```
//!
//! ### Build a dataset from a links file
//!
//! ```no_run
//! use framesift::{BatchDriver, HttpFetcher, LinksFile, SampleOptions, VideoListing};
//!
//! let urls = LinksFile::new("video-links.txt").list_video_urls()?;
//! let driver = BatchDriver::new(HttpFetcher::new())
//!     .with_download_dir("downloads")
//!     .with_output_dir("dataset");
//! let summary = driver.run(&urls);
//! println!("{} frames from {} videos", summary.frames_written, summary.videos_processed);
//! # Ok::<(), framesift::SiftError>(())
//! ```
//!
//! ### Inspect a stream
//!
//! ```no_run
//! use framesift::DecodeSession;
//!
//! let session = DecodeSession::open("clip.mp4")?;
//! println!(
//!     "{}x{} @ {:.2} fps, ~{} frames",
//!     session.width(),
//!     session.height(),
//!     session.frame_rate(),
//!     session.frame_count_estimate(),
//! );
//! # Ok::<(), framesift::SiftError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system for
//! `ffmpeg-next` to build and link.

pub mod decoder;
pub mod driver;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod sampler;

pub use decoder::{DecodeSession, FrameIterator};
pub use driver::{BatchDriver, BatchSummary};
pub use error::SiftError;
pub use fetch::{Fetcher, HttpFetcher, file_name_for_url};
pub use listing::{DEFAULT_EXTENSIONS, LinksFile, VideoListing};
pub use sampler::{FrameWindow, SampleOptions, sample};
