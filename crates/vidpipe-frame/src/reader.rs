use std::io::BufRead;

use crate::codec::{read_frame, FrameConfig};
use crate::error::Result;
use crate::frame::Frame;
use crate::geometry::StreamGeometry;

/// Reads complete frames from any buffered stream.
///
/// Handles partial reads internally; callers always get complete frames.
/// The first successful frame freezes the stream geometry.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
    total_len: Option<u64>,
    seconds_per_frame: f64,
    geometry: Option<StreamGeometry>,
}

impl<T: BufRead> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            config,
            total_len: None,
            seconds_per_frame: 0.0,
            geometry: None,
        }
    }

    /// Total stream length and playback rate used when geometry is frozen.
    pub fn with_stream_info(mut self, total_len: Option<u64>, seconds_per_frame: f64) -> Self {
        self.total_len = total_len;
        self.seconds_per_frame = seconds_per_frame;
        self
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::EndOfStream)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let frame = read_frame(&mut self.inner, &self.config)?;
        if self.geometry.is_none() {
            self.geometry = Some(StreamGeometry::from_first_frame(
                frame.header(),
                self.total_len,
                self.seconds_per_frame,
            ));
        }
        Ok(frame)
    }

    /// Geometry frozen from the first frame, if one has been read.
    pub fn geometry(&self) -> Option<&StreamGeometry> {
        self.geometry.as_ref()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: BufRead> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames until the stream ends cleanly.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(err) if err.is_end_of_stream() => None,
            other => Some(other),
        }
    }
}
