use std::io::BufRead;

use crate::error::{FrameError, Result};

/// Magic tag on the first header line (binary PPM).
pub const MAGIC: &str = "P6";

/// Samples per pixel (interleaved RGB).
pub const CHANNELS: usize = 3;

/// What was wrong with a rejected header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderErrorKind {
    BadMagic,
    InvalidDimensions,
    InvalidDepth,
}

/// A structured header parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HeaderError {
    pub kind: HeaderErrorKind,
    pub message: String,
}

impl HeaderError {
    pub fn new(kind: HeaderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Geometry and format of one frame, as declared by its textual header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Magic tag as read from the stream.
    pub magic: String,
    pub width: usize,
    pub height: usize,
    /// Samples per pixel. Always [`CHANNELS`].
    pub channels: usize,
    /// Maximum sample value. Informational only.
    pub depth: u32,
    /// Bytes consumed by the three header lines, terminators included.
    pub header_size: usize,
    /// Set when the header was rejected.
    pub error: Option<HeaderError>,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            magic: String::new(),
            width: 0,
            height: 0,
            channels: CHANNELS,
            depth: 0,
            header_size: 0,
            error: None,
        }
    }
}

impl FrameHeader {
    /// A header carrying only a parse failure.
    pub fn rejected(error: HeaderError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Raw pixel bytes that follow this header on the wire.
    pub fn data_size(&self) -> usize {
        self.width
            .saturating_mul(self.height)
            .saturating_mul(self.channels)
    }

    /// True when no parse error is attached.
    pub fn good(&self) -> bool {
        self.error.is_none()
    }

    /// Human-readable error text, empty for a good header.
    pub fn errors(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Parse the three-line textual header from the stream.
///
/// Consumes exactly the header bytes; the cursor is left on the first pixel
/// byte. A stream that ends inside the header yields
/// [`FrameError::EndOfStream`].
pub fn parse_header<R: BufRead>(src: &mut R) -> Result<FrameHeader> {
    let mut header = FrameHeader::default();

    let (magic, n) = read_header_line(src)?;
    header.header_size += n;
    if magic != MAGIC {
        return Err(HeaderError::new(
            HeaderErrorKind::BadMagic,
            format!("bad magic {magic:?} (PPM type identifier {MAGIC:?} not found in header)"),
        )
        .into());
    }
    header.magic = magic;

    let (dimensions, n) = read_header_line(src)?;
    header.header_size += n;
    let (width, height) = parse_dimensions(&dimensions).ok_or_else(|| {
        HeaderError::new(
            HeaderErrorKind::InvalidDimensions,
            format!("invalid dimensions {dimensions:?}"),
        )
    })?;
    header.width = width;
    header.height = height;

    let (depth, n) = read_header_line(src)?;
    header.header_size += n;
    header.depth = depth.trim().parse().map_err(|_| {
        HeaderError::new(
            HeaderErrorKind::InvalidDepth,
            format!("invalid max sample value {depth:?}"),
        )
    })?;

    Ok(header)
}

/// Width and height, both at least one.
fn parse_dimensions(line: &str) -> Option<(usize, usize)> {
    let mut fields = line.split_whitespace();
    let width: i64 = fields.next()?.parse().ok()?;
    let height: i64 = fields.next()?.parse().ok()?;
    if width < 1 || height < 1 {
        return None;
    }
    Some((usize::try_from(width).ok()?, usize::try_from(height).ok()?))
}

/// Read one newline-terminated line, returning its text and consumed byte count.
fn read_header_line<R: BufRead>(src: &mut R) -> Result<(String, usize)> {
    let mut raw = Vec::new();
    let n = src.read_until(b'\n', &mut raw)?;
    if n == 0 || raw.last() != Some(&b'\n') {
        return Err(FrameError::EndOfStream);
    }
    raw.pop();
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    Ok((String::from_utf8_lossy(&raw).into_owned(), n))
}
