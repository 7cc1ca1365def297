use crate::header::HeaderError;

/// Errors that can occur while decoding or encoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The textual header is malformed.
    #[error("header parse error: {0}")]
    Header(#[from] HeaderError),

    /// The header declares more pixel data than the configured maximum.
    #[error("frame data too large ({size} bytes, max {max})")]
    DataTooLarge { size: usize, max: usize },

    /// A pixel buffer does not match the size its header declares.
    #[error("frame data size mismatch (expected {expected} bytes, got {actual})")]
    SizeMismatch { expected: usize, actual: usize },

    /// The stream ended before a complete frame was read.
    #[error("end of stream (incomplete frame)")]
    EndOfStream,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Whether the stream ended, as opposed to failing.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
