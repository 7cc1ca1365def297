use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use tracing::debug;

use crate::error::{PipeError, Result};

/// Default read buffer capacity for an opened device.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// A buffered, blocking read stream over an opened pipe device.
///
/// Tracks the cursor by counting consumed bytes, so the position stays
/// meaningful on a real FIFO where `lseek` is not available. Regular files
/// additionally report their total length and can be repositioned.
pub struct PipeStream {
    inner: BufReader<File>,
    position: u64,
    len: Option<u64>,
}

impl PipeStream {
    /// Wrap an opened device, discovering its length with an end-seek and rewind.
    pub fn from_file(mut file: File, capacity: usize) -> Self {
        let len = discover_len(&mut file);
        match len {
            Some(len) => debug!(len, "discovered stream length"),
            None => debug!("stream length unavailable (unseekable device)"),
        }
        Self {
            inner: BufReader::with_capacity(capacity, file),
            position: 0,
            len,
        }
    }

    /// Total byte length of the device, if it could be discovered.
    pub fn len(&self) -> Option<u64> {
        self.len
    }

    /// Whether the device reported a zero length.
    pub fn is_empty(&self) -> bool {
        self.len == Some(0)
    }

    /// Whether the cursor can be repositioned.
    pub fn is_seekable(&self) -> bool {
        self.len.is_some()
    }

    /// Current cursor position in bytes from the start of the stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reposition the cursor to an absolute byte offset.
    ///
    /// Buffered bytes are discarded; the next read starts at `pos`.
    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        if !self.is_seekable() {
            return Err(PipeError::NotSeekable);
        }
        let landed = self.inner.seek(SeekFrom::Start(pos))?;
        self.position = landed;
        Ok(())
    }

    /// Borrow the underlying device handle.
    pub fn get_ref(&self) -> &File {
        self.inner.get_ref()
    }
}

fn discover_len(file: &mut File) -> Option<u64> {
    let end = file.seek(SeekFrom::End(0)).ok()?;
    file.seek(SeekFrom::Start(0)).ok()?;
    Some(end)
}

impl Read for PipeStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl BufRead for PipeStream {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
        self.position += amt as u64;
    }
}

impl std::fmt::Debug for PipeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeStream")
            .field("position", &self.position)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(tag: &str, contents: &[u8]) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("vidpipe-stream-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stream.bin");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn regular_file_reports_length_and_starts_at_zero() {
        let path = temp_file("len", b"0123456789");
        let stream = PipeStream::from_file(File::open(&path).unwrap(), 4);

        assert_eq!(stream.len(), Some(10));
        assert!(stream.is_seekable());
        assert_eq!(stream.position(), 0);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn position_counts_read_and_consumed_bytes() {
        let path = temp_file("pos", b"P6\n4 2\n255\nrest");
        let mut stream = PipeStream::from_file(File::open(&path).unwrap(), 4);

        let mut line = Vec::new();
        stream.read_until(b'\n', &mut line).unwrap();
        assert_eq!(line, b"P6\n");
        assert_eq!(stream.position(), 3);

        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"4 2\n");
        assert_eq!(stream.position(), 7);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn seek_to_discards_buffer_and_moves_cursor() {
        let path = temp_file("seek", b"abcdefghij");
        let mut stream = PipeStream::from_file(File::open(&path).unwrap(), 16);

        let mut buf = [0u8; 2];
        stream.read_exact(&mut buf).unwrap();
        stream.seek_to(6).unwrap();
        assert_eq!(stream.position(), 6);

        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"gh");
        assert_eq!(stream.position(), 8);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn anonymous_pipe_is_not_seekable() {
        use std::io::Write;
        use std::os::fd::FromRawFd;

        let mut fds = [0 as libc::c_int; 2];
        // SAFETY: `fds` is a valid two-element array for pipe(2) to fill.
        let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(rc, 0);
        // SAFETY: both descriptors were just created by pipe(2) and are owned here.
        let (reader, mut writer) =
            unsafe { (File::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) };

        writer.write_all(b"xyz").unwrap();
        drop(writer);

        let mut stream = PipeStream::from_file(reader, 8);
        assert_eq!(stream.len(), None);
        assert!(matches!(stream.seek_to(0), Err(PipeError::NotSeekable)));

        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"xyz");
        assert_eq!(stream.position(), 3);
    }
}
