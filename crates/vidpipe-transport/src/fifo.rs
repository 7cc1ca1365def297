use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::error::{PipeError, Result};
use crate::stream::{PipeStream, DEFAULT_BUFFER_CAPACITY};

/// Default bound on the readiness wait during open.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the pipe gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// How long to wait for a writer before giving up. Default: 1 second.
    pub handshake_timeout: Duration,
    /// Read buffer capacity of the opened stream. Default: 64 KiB.
    pub buffer_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Lifecycle state of the gateway's device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeState {
    Closed,
    Open,
}

/// Owns the pipe device and the handshake that opens it.
///
/// `open` is idempotent and never blocks longer than the handshake timeout,
/// even when no writer is attached to the FIFO yet. A regular file passes the
/// handshake immediately, which makes recorded streams scrubbable.
#[derive(Debug, Default)]
pub struct PipeGateway {
    config: GatewayConfig,
    path: Option<PathBuf>,
    stream: Option<PipeStream>,
}

impl PipeGateway {
    /// Create a closed gateway with default configuration.
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    /// Create a closed gateway with explicit configuration.
    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            config,
            path: None,
            stream: None,
        }
    }

    /// Open the device at `path`, waiting for a writer within the handshake window.
    ///
    /// Returns `Ok(())` immediately if the gateway is already open.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            error!("could not open pipe because it is not properly initialized");
            return Err(PipeError::InitFail("no pipe path configured".to_string()));
        }

        let file = handshake(path, self.config.handshake_timeout)?;
        let stream = PipeStream::from_file(file, self.config.buffer_capacity);
        info!(?path, len = ?stream.len(), "pipe open");

        self.path = Some(path.to_path_buf());
        self.stream = Some(stream);
        Ok(())
    }

    /// Close the device. Safe to call when already closed.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!(path = ?self.path, "pipe closed");
        }
    }

    pub fn state(&self) -> PipeState {
        if self.stream.is_some() {
            PipeState::Open
        } else {
            PipeState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == PipeState::Open
    }

    /// Path of the most recently opened device.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Mutably borrow the open stream.
    pub fn stream_mut(&mut self) -> Result<&mut PipeStream> {
        self.stream.as_mut().ok_or(PipeError::NotOpen)
    }

    /// Total byte length of the open device, when discoverable.
    pub fn len(&self) -> Option<u64> {
        self.stream.as_ref().and_then(PipeStream::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Cursor position of the open device.
    pub fn position(&self) -> Option<u64> {
        self.stream.as_ref().map(PipeStream::position)
    }

    /// Reposition the open device's cursor.
    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.stream_mut()?.seek_to(pos)
    }
}

/// Run the readiness handshake and return the device opened for blocking reads.
///
/// The probe descriptor is always closed before returning. The returned
/// handle is opened while the probe is still alive so bytes already queued in
/// the FIFO survive the hand-over.
fn handshake(path: &Path, timeout: Duration) -> Result<File> {
    let probe = open_nonblocking(path).map_err(|source| {
        error!(?path, %source, "error opening pipe");
        PipeError::FdFail {
            path: path.to_path_buf(),
            source,
        }
    })?;

    wait_fd_readable(&probe, path, timeout)?;

    let file = open_blocking(path).map_err(|source| PipeError::FdFail {
        path: path.to_path_buf(),
        source,
    })?;
    drop(probe);
    Ok(file)
}

#[cfg(unix)]
fn open_nonblocking(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

#[cfg(not(unix))]
fn open_nonblocking(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().read(true).open(path)
}

#[cfg(unix)]
fn open_blocking(path: &Path) -> std::io::Result<File> {
    use std::os::fd::AsRawFd;

    // Opening a FIFO in blocking mode waits for a writer; open non-blocking
    // and clear the flag instead.
    let file = open_nonblocking(path)?;
    let fd = file.as_raw_fd();

    // SAFETY: `fd` is an open descriptor owned by `file` for the duration of both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: as above; only the O_NONBLOCK status flag is changed.
    let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(file)
}

#[cfg(not(unix))]
fn open_blocking(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(unix)]
fn wait_fd_readable(probe: &File, path: &Path, timeout: Duration) -> Result<()> {
    use std::os::fd::AsRawFd;

    let deadline = Instant::now() + timeout;
    let mut pfd = libc::pollfd {
        fd: probe.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let timeout_ms = remaining.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: `pfd` is a valid pollfd for one descriptor owned by `probe`.
        let ready = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };

        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            error!(?path, %err, "error waiting for pipe to be ready for reading");
            return Err(PipeError::SelectFail(err));
        }

        // A bare hang-up means a previous writer left and nobody replaced it.
        if ready == 0 || pfd.revents & libc::POLLIN == 0 {
            debug!(?path, ?timeout, "no writer within handshake window");
            return Err(PipeError::Timeout {
                path: path.to_path_buf(),
                timeout,
            });
        }

        return Ok(());
    }
}

#[cfg(not(unix))]
fn wait_fd_readable(_probe: &File, path: &Path, _timeout: Duration) -> Result<()> {
    Err(PipeError::FdFail {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "vidpipe requires unix named pipes",
        ),
    })
}
