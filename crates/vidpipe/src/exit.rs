use std::fmt;
use std::io;

use vidpipe_frame::FrameError;
use vidpipe_player::PlayerError;
use vidpipe_transport::PipeError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => TRANSPORT_ERROR,
        io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn pipe_error(context: &str, err: PipeError) -> CliError {
    match err {
        PipeError::Io(source) => io_error(context, source),
        PipeError::FdFail { ref source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        PipeError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        PipeError::InitFail(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Header(_) | FrameError::DataTooLarge { .. } | FrameError::SizeMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::EndOfStream => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn player_error(context: &str, err: PlayerError) -> CliError {
    match err {
        PlayerError::Pipe(err) => pipe_error(context, err),
        PlayerError::GeometryUnknown
        | PlayerError::SeekOutOfRange { .. }
        | PlayerError::InvalidTime(_) => CliError::new(USAGE, format!("{context}: {err}")),
        PlayerError::WorkerSpawn(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use vidpipe_frame::{HeaderError, HeaderErrorKind};

    #[test]
    fn handshake_timeout_maps_to_timeout() {
        let err = PipeError::Timeout {
            path: PathBuf::from("/tmp/x.fifo"),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(pipe_error("open failed", err).code, TIMEOUT);
    }

    #[test]
    fn missing_device_maps_to_transport_error() {
        let err = PipeError::FdFail {
            path: PathBuf::from("/nope"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let cli = player_error("open failed", PlayerError::Pipe(err));
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("open failed: "));
    }

    #[test]
    fn malformed_header_maps_to_data_invalid() {
        let err = FrameError::Header(HeaderError::new(HeaderErrorKind::BadMagic, "bad magic"));
        assert_eq!(frame_error("decode failed", err).code, DATA_INVALID);
    }

    #[test]
    fn bad_scrub_target_is_usage() {
        let err = PlayerError::SeekOutOfRange {
            index: 9,
            position: 900,
            max: Some(100),
        };
        assert_eq!(player_error("seek failed", err).code, USAGE);
    }
}
