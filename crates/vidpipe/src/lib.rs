//! Raw video frames over a named pipe.
//!
//! vidpipe decodes a stream of binary PPM (`P6`) frames written into a FIFO
//! by another process and hands them out as ready-to-render pixel buffers,
//! paced to a target frame rate and seekable when the stream is recorded to
//! a regular file.
//!
//! # Crate Structure
//!
//! - [`transport`]: FIFO handshake and position-tracking device stream
//! - [`frame`]: PPM header parsing, frame codec and stream geometry
//! - [`player`]: Producer/consumer playback engine (behind `player` feature)

/// Re-export transport types.
pub mod transport {
    pub use vidpipe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use vidpipe_frame::*;
}

/// Re-export player types (requires `player` feature).
#[cfg(feature = "player")]
pub mod player {
    pub use vidpipe_player::*;
}
