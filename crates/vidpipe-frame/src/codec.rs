use std::io::{BufRead, ErrorKind};

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::header::{parse_header, FrameHeader, CHANNELS, MAGIC};

/// Default maximum pixel payload per frame: 256 MiB.
pub const DEFAULT_MAX_DATA_SIZE: usize = 256 * 1024 * 1024;

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest pixel payload a header may declare. Default: 256 MiB.
    pub max_data_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_data_size: DEFAULT_MAX_DATA_SIZE,
        }
    }
}

/// Decode one complete frame from the stream (blocking).
///
/// Parses the header, then reads exactly `width * height * 3` bytes. Either a
/// whole frame is returned or an error; partial frames never escape.
pub fn read_frame<R: BufRead>(src: &mut R, config: &FrameConfig) -> Result<Frame> {
    let header = parse_header(src)?;

    let size = checked_data_size(&header).ok_or(FrameError::DataTooLarge {
        size: usize::MAX,
        max: config.max_data_size,
    })?;
    if size > config.max_data_size {
        return Err(FrameError::DataTooLarge {
            size,
            max: config.max_data_size,
        });
    }

    let mut data = BytesMut::zeroed(size);
    match src.read_exact(&mut data) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Err(FrameError::EndOfStream),
        Err(err) => return Err(FrameError::Io(err)),
    }

    Frame::new(header, data.freeze())
}

fn checked_data_size(header: &FrameHeader) -> Option<usize> {
    header
        .width
        .checked_mul(header.height)?
        .checked_mul(header.channels)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// P6\n
/// <width> <height>\n
/// <depth>\n
/// <width * height * 3 raw RGB bytes>
/// ```
pub fn encode_frame(
    width: usize,
    height: usize,
    depth: u32,
    data: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let expected = width.saturating_mul(height).saturating_mul(CHANNELS);
    if data.len() != expected {
        return Err(FrameError::SizeMismatch {
            expected,
            actual: data.len(),
        });
    }

    let header = format!("{MAGIC}\n{width} {height}\n{depth}\n");
    dst.reserve(header.len() + data.len());
    dst.put_slice(header.as_bytes());
    dst.put_slice(data);
    Ok(())
}
