//! Video decode sessions.
//!
//! [`DecodeSession`] wraps an FFmpeg demuxer + video decoder for a single
//! local file. Opening a session reads stream metadata (frame rate,
//! duration, dimensions); calling [`DecodeSession::frames`] consumes the
//! session and returns a lazy [`FrameIterator`] over decoded frames.
//!
//! A session is deliberately single-use: `frames()` takes `self` by value,
//! so reading the stream a second time requires opening a fresh session.
//! All FFmpeg handles are released when the session or iterator is dropped.
//!
//! # Example
//!
//! ```no_run
//! use framesift::DecodeSession;
//!
//! let session = DecodeSession::open("clip.mp4")?;
//! println!("{:.2} fps, ~{} frames", session.frame_rate(), session.frame_count_estimate());
//!
//! for result in session.frames() {
//!     let (index, image) = result?;
//!     println!("decoded frame {index} ({}x{})", image.width(), image.height());
//! }
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError,
    Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::error::SiftError;

/// An open decode session on a local video file.
///
/// Holds the demuxer context, a video decoder for the best video stream, and
/// an RGB24 scaling context. Metadata accessors are free; decoding happens
/// lazily through [`frames()`](DecodeSession::frames).
pub struct DecodeSession {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    frame_rate: f64,
    duration: Duration,
    width: u32,
    height: u32,
    codec: String,
    path: PathBuf,
}

impl std::fmt::Debug for DecodeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeSession")
            .field("path", &self.path)
            .field("codec", &self.codec)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frame_rate", &self.frame_rate)
            .field("duration", &self.duration)
            .field("stream_index", &self.stream_index)
            .finish_non_exhaustive()
    }
}

impl DecodeSession {
    /// Open a video file for decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, locates the best
    /// video stream, and builds a decoder plus an RGB24 scaler at the source
    /// resolution.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::FileOpen`] if the file cannot be opened or parsed
    /// as a supported container, and [`SiftError::NoVideoStream`] if it
    /// carries no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SiftError> {
        let path = path.as_ref().to_path_buf();

        log::debug!("Opening video file: {}", path.display());

        // Safe to call multiple times.
        ffmpeg_next::init().map_err(|error| SiftError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| SiftError::FileOpen {
            path: path.clone(),
            reason: error.to_string(),
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(SiftError::NoVideoStream)?;
        let stream_index = stream.index();

        // Nominal fps from the stream's average frame rate, falling back to
        // the raw rate field. Malformed containers may report zero; callers
        // must tolerate that.
        let avg = stream.avg_frame_rate();
        let frame_rate = if avg.denominator() != 0 {
            avg.numerator() as f64 / avg.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let decoder_context =
            CodecContext::from_parameters(stream.parameters()).map_err(|error| {
                SiftError::FileOpen {
                    path: path.clone(),
                    reason: format!("Failed to read video codec parameters: {error}"),
                }
            })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| SiftError::FileOpen {
                path: path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let width = decoder.width();
        let height = decoder.height();
        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        // Container-level duration is reported in AV_TIME_BASE units (us).
        let duration_microseconds = input.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        log::info!(
            "Opened {}: {}x{}, {:.2} fps, {:.2}s, codec={}",
            path.display(),
            width,
            height,
            frame_rate,
            duration.as_secs_f64(),
            codec,
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            frame_rate,
            duration,
            width,
            height,
            codec,
            path,
        })
    }

    /// The stream's nominal frames per second.
    ///
    /// May be `0.0` when the container reports no usable frame rate.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Container-level duration. [`Duration::ZERO`] when unknown.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Estimated total frame count, computed as duration x frame rate.
    ///
    /// Returns 0 when either quantity is unknown. This is a metadata-based
    /// estimate, not an exact count; inaccurate containers can be off by a
    /// few frames.
    pub fn frame_count_estimate(&self) -> u64 {
        if self.frame_rate > 0.0 {
            (self.duration.as_secs_f64() * self.frame_rate) as u64
        } else {
            0
        }
    }

    /// Source frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Name of the video codec, or `"unknown"`.
    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// The path this session was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the session and return a lazy iterator over decoded frames.
    ///
    /// Frames are yielded as `(index, image)` pairs with a running index
    /// starting at 0, in temporal order. The sequence is finite and not
    /// restartable; open a new session to read the stream again.
    pub fn frames(self) -> FrameIterator {
        FrameIterator {
            input: self.input,
            decoder: self.decoder,
            scaler: self.scaler,
            stream_index: self.stream_index,
            width: self.width,
            height: self.height,
            decoded: VideoFrame::empty(),
            scaled: VideoFrame::empty(),
            next_index: 0,
            eof_sent: false,
            done: false,
        }
    }
}

/// A lazy, pull-based iterator over decoded video frames.
///
/// Each call to [`next()`](Iterator::next) reads and decodes just enough
/// packets to produce the next frame, so the full frame set is never
/// buffered. Yields `Result<(u64, DynamicImage)>`; after the first `Err` the
/// iterator is fused. Dropping the iterator releases the demuxer and
/// decoder.
pub struct FrameIterator {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    width: u32,
    height: u32,
    decoded: VideoFrame,
    scaled: VideoFrame,
    next_index: u64,
    eof_sent: bool,
    done: bool,
}

impl FrameIterator {
    /// Scale and convert the current decoded frame to a [`DynamicImage`].
    fn convert_current_frame(&mut self) -> Result<DynamicImage, SiftError> {
        self.scaler.run(&self.decoded, &mut self.scaled)?;

        let buffer = packed_rgb(
            self.scaled.data(0),
            self.scaled.stride(0),
            self.width,
            self.height,
        );
        let image = RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            SiftError::FrameDecode(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl Iterator for FrameIterator {
    type Item = Result<(u64, DynamicImage), SiftError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Drain frames the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                match self.convert_current_frame() {
                    Ok(image) => {
                        let index = self.next_index;
                        self.next_index += 1;
                        return Some(Ok((index, image)));
                    }
                    Err(error) => {
                        self.done = true;
                        return Some(Err(error));
                    }
                }
            }

            // Decoder has no buffered frames. Feed it more packets.
            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            self.done = true;
                            return Some(Err(SiftError::from(error)));
                        }
                    }
                    // Audio/subtitle packets are silently skipped.
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        self.done = true;
                        return Some(Err(SiftError::from(error)));
                    }
                    self.eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error, try the next packet.
                }
            }
        }
    }
}

/// Copy plane data into a tightly-packed RGB buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width x 3); this
/// strips it so the result can be handed to [`RgbImage::from_raw`].
fn packed_rgb(data: &[u8], stride: usize, width: u32, height: u32) -> Vec<u8> {
    let row_bytes = (width as usize) * 3;

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    }
}
