//! Self-describing raw image frames over an unbounded byte stream.
//!
//! Every frame on the wire is a binary PPM image:
//! - a magic line `P6`
//! - a `width height` line
//! - a max-sample-value line
//! - `width * height * 3` raw interleaved RGB bytes
//!
//! There is no delimiter between frames. Stream geometry (frame size, frame
//! count, duration) is measured once from the first frame and frozen.

pub mod codec;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod header;
pub mod reader;
pub mod writer;

pub use codec::{encode_frame, read_frame, FrameConfig, DEFAULT_MAX_DATA_SIZE};
pub use error::{FrameError, Result};
pub use frame::{Frame, Pixels};
pub use geometry::StreamGeometry;
pub use header::{parse_header, FrameHeader, HeaderError, HeaderErrorKind, CHANNELS, MAGIC};
pub use reader::FrameReader;
pub use writer::FrameWriter;
