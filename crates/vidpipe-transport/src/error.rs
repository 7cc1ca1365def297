use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while opening or reading the pipe device.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// The gateway is missing configuration, or a collaborator is not ready.
    #[error("pipe is not properly initialized: {0}")]
    InitFail(String),

    /// The device could not be opened.
    #[error("failed to open pipe {path}: {source}")]
    FdFail {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Waiting for read readiness failed.
    #[error("failed waiting for pipe to become readable: {0}")]
    SelectFail(std::io::Error),

    /// No writer appeared within the handshake window.
    #[error("no writer on {path} within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },

    /// The operation needs an open device.
    #[error("pipe is not open")]
    NotOpen,

    /// The device does not support repositioning (a real FIFO).
    #[error("pipe stream is not seekable")]
    NotSeekable,

    /// An I/O error occurred on the open device.
    #[error("pipe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handshake stage an open attempt failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    InitFail,
    FdFail,
    SelectFail,
    Timeout,
}

impl PipeError {
    /// Handshake stage this error belongs to.
    pub fn status(&self) -> OpenStatus {
        match self {
            Self::InitFail(_) => OpenStatus::InitFail,
            Self::FdFail { .. } | Self::NotOpen | Self::NotSeekable | Self::Io(_) => {
                OpenStatus::FdFail
            }
            Self::SelectFail(_) => OpenStatus::SelectFail,
            Self::Timeout { .. } => OpenStatus::Timeout,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipeError>;
