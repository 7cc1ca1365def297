use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::header::{FrameHeader, HeaderError};

/// One decoded frame: its header plus exactly `data_size` raw pixel bytes.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    header: FrameHeader,
    data: Bytes,
}

impl Frame {
    /// Build a frame, checking the buffer against the header's declared size.
    pub fn new(header: FrameHeader, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.len() != header.data_size() {
            return Err(FrameError::SizeMismatch {
                expected: header.data_size(),
                actual: data.len(),
            });
        }
        Ok(Self { header, data })
    }

    /// A frame that carries only a header parse failure.
    pub fn rejected(error: HeaderError) -> Self {
        Self {
            header: FrameHeader::rejected(error),
            data: Bytes::new(),
        }
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Raw interleaved pixel bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.header.width
    }

    pub fn height(&self) -> usize {
        self.header.height
    }

    pub fn channels(&self) -> usize {
        self.header.channels
    }

    pub fn data_size(&self) -> usize {
        self.header.data_size()
    }

    /// Header plus data bytes as laid out on the wire.
    pub fn wire_size(&self) -> usize {
        self.header.header_size + self.data.len()
    }

    pub fn good(&self) -> bool {
        self.header.good()
    }

    pub fn errors(&self) -> String {
        self.header.errors()
    }

    /// Drop header and data, returning to the empty default.
    pub fn reset(&mut self) {
        self.header.reset();
        self.data = Bytes::new();
    }

    /// Copy this frame's pixels into `pixels`.
    ///
    /// Returns false and leaves `pixels` untouched unless both dimensions are
    /// at least one.
    pub fn write_to(&self, pixels: &mut Pixels) -> bool {
        if self.width() < 1 || self.height() < 1 {
            return false;
        }
        pixels.set_from(&self.data, self.width(), self.height(), self.channels());
        true
    }
}

/// A consumer-owned, ready-to-render pixel buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pixels {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Pixels {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer of the given size filled with zeros.
    pub fn allocate(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0; width * height * channels],
        }
    }

    /// Replace contents, reusing the existing allocation where possible.
    pub fn set_from(&mut self, data: &[u8], width: usize, height: usize, channels: usize) {
        self.data.clear();
        self.data.extend_from_slice(data);
        self.width = width;
        self.height = height;
        self.channels = channels;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
