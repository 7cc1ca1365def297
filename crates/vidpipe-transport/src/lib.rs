//! FIFO device access for vidpipe.
//!
//! Opening a named pipe for reading blocks until a writer shows up. This
//! crate avoids that with a readiness handshake:
//! - open the path with `O_NONBLOCK` and wait (bounded) for it to become readable
//! - reopen in blocking, buffered mode, then close the probe descriptor
//! - discover the stream length with an end-seek and rewind
//!
//! This is the lowest layer of vidpipe. Everything else reads through the
//! [`PipeStream`] provided by a [`PipeGateway`].

pub mod error;
pub mod fifo;
pub mod stream;

pub use error::{OpenStatus, PipeError, Result};
pub use fifo::{GatewayConfig, PipeGateway, PipeState};
pub use stream::PipeStream;
