use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};
use vidpipe_frame::{read_frame, Frame, FrameConfig, FrameError};
use vidpipe_transport::PipeGateway;

use crate::pacer::{paced_wait, Pacer};
use crate::slot::{lock, SharedFrameSlot};

/// Pause after an iteration that made no progress.
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Outcome of one producer iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// A frame was stored in the slot; `index` is the updated frame index.
    Decoded { index: u64 },
    /// The pipe could not be opened this time around.
    NotOpen,
    /// The header or declared size was invalid; the slot is untouched.
    Rejected,
    /// The writer went away. The pipe was closed and will be reopened.
    PipeClosed,
    /// Reading failed for some other reason; the pipe stays open.
    ReadFailed,
}

impl Iteration {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded { .. })
    }

    fn made_progress(&self) -> bool {
        matches!(self, Self::Decoded { .. } | Self::Rejected)
    }
}

/// Decodes frames off the pipe into the shared slot, one per iteration.
///
/// The gateway lock is held across the blocking read; the slot lock only
/// across the store.
#[derive(Debug)]
pub struct Producer {
    gateway: Arc<Mutex<PipeGateway>>,
    slot: Arc<SharedFrameSlot>,
    pacer: Arc<Mutex<Pacer>>,
    path: PathBuf,
    config: FrameConfig,
    scratch: Frame,
}

impl Producer {
    pub fn new(
        gateway: Arc<Mutex<PipeGateway>>,
        slot: Arc<SharedFrameSlot>,
        pacer: Arc<Mutex<Pacer>>,
        path: impl Into<PathBuf>,
        config: FrameConfig,
    ) -> Self {
        Self {
            gateway,
            slot,
            pacer,
            path: path.into(),
            config,
            scratch: Frame::default(),
        }
    }

    /// Run one open-decode-store cycle.
    ///
    /// Failures are logged and reported through the returned [`Iteration`];
    /// none of them stop the producer.
    pub fn iterate(&mut self) -> Iteration {
        let mut gateway = lock(&self.gateway);
        if let Err(err) = gateway.open(&self.path) {
            debug!(
                path = ?self.path,
                status = ?err.status(),
                error = %err,
                "pipe not open, skipping iteration"
            );
            return Iteration::NotOpen;
        }

        self.scratch.reset();
        let total_len = gateway.len();
        let stream = match gateway.stream_mut() {
            Ok(stream) => stream,
            Err(_) => return Iteration::NotOpen,
        };

        match read_frame(stream, &self.config) {
            Ok(frame) => {
                let position = stream.position();
                drop(gateway);

                let seconds_per_frame = lock(&self.pacer).seconds_per_frame();
                let index = self.slot.store(frame, position, total_len, seconds_per_frame);
                Iteration::Decoded { index }
            }
            Err(FrameError::EndOfStream) => {
                gateway.close();
                warn!(path = ?self.path, "pipe closed, will attempt reopen");
                Iteration::PipeClosed
            }
            Err(FrameError::Header(err)) => {
                warn!(kind = ?err.kind, message = %err.message, "frame header rejected");
                self.scratch = Frame::rejected(err);
                Iteration::Rejected
            }
            Err(err @ (FrameError::DataTooLarge { .. } | FrameError::SizeMismatch { .. })) => {
                warn!(error = %err, "frame rejected");
                Iteration::Rejected
            }
            Err(FrameError::Io(err)) => {
                error!(path = ?self.path, error = %err, "read failed");
                Iteration::ReadFailed
            }
        }
    }

    /// The frame being decoded, or the last rejected header.
    pub fn scratch(&self) -> &Frame {
        &self.scratch
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pacer(&self) -> &Arc<Mutex<Pacer>> {
        &self.pacer
    }
}

/// A background thread running a [`Producer`] until stopped.
#[derive(Debug)]
pub struct Worker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<Producer>,
}

impl Worker {
    /// Start the producer loop on a named thread, paced by the producer's pacer.
    pub fn spawn(mut producer: Producer) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let pacer = Arc::clone(producer.pacer());

        let handle = thread::Builder::new()
            .name("vidpipe-producer".to_string())
            .spawn(move || {
                info!(path = ?producer.path(), "producer worker started");
                while flag.load(Ordering::Acquire) {
                    paced_wait(&pacer);
                    if !flag.load(Ordering::Acquire) {
                        break;
                    }
                    if !producer.iterate().made_progress() {
                        thread::sleep(RETRY_BACKOFF);
                    }
                }
                info!(path = ?producer.path(), "producer worker stopped");
                producer
            })?;

        Ok(Self { running, handle })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.handle.is_finished()
    }

    /// Signal the loop to stop and wait for the in-flight iteration.
    ///
    /// Returns `None` if the worker panicked.
    pub fn stop(self) -> Option<Producer> {
        self.running.store(false, Ordering::Release);
        match self.handle.join() {
            Ok(producer) => Some(producer),
            Err(_) => {
                error!("producer worker panicked");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use vidpipe_frame::encode_frame;

    fn temp_stream(tag: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "vidpipe-producer-{tag}-{}.ppm",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn wire(fills: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for &fill in fills {
            encode_frame(4, 2, 255, &[fill; 24], &mut buf).unwrap();
        }
        buf.to_vec()
    }

    fn producer(path: &Path) -> (Producer, Arc<SharedFrameSlot>) {
        let slot = Arc::new(SharedFrameSlot::new());
        let producer = Producer::new(
            Arc::new(Mutex::new(PipeGateway::new())),
            Arc::clone(&slot),
            Arc::new(Mutex::new(Pacer::new(0.0))),
            path,
            FrameConfig::default(),
        );
        (producer, slot)
    }

    #[test]
    fn decodes_then_reopens_at_end_of_stream() {
        let path = temp_stream("eof", &wire(&[1, 2, 3]));
        let (mut producer, slot) = producer(&path);

        assert_eq!(producer.iterate(), Iteration::Decoded { index: 1 });
        assert_eq!(producer.iterate(), Iteration::Decoded { index: 2 });
        assert_eq!(producer.iterate(), Iteration::Decoded { index: 3 });
        assert_eq!(slot.total_frames(), 3);

        assert_eq!(producer.iterate(), Iteration::PipeClosed);
        assert!(!lock(&producer.gateway).is_open());

        assert_eq!(producer.iterate(), Iteration::Decoded { index: 1 });
        assert_eq!(slot.take_if_dirty(|f| f.data()[0]), Some(1));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejected_header_leaves_slot_untouched() {
        let path = temp_stream("p5", b"P5\n4 2\n255\n");
        let (mut producer, slot) = producer(&path);

        assert_eq!(producer.iterate(), Iteration::Rejected);
        assert!(!producer.scratch().good());
        assert!(producer.scratch().errors().contains("bad magic"));
        assert!(!slot.is_dirty());
        assert!(slot.geometry().is_none());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_device_is_not_fatal() {
        let (mut producer, slot) = producer(Path::new("/nonexistent/vidpipe/stream.fifo"));
        assert_eq!(producer.iterate(), Iteration::NotOpen);
        assert_eq!(producer.iterate(), Iteration::NotOpen);
        assert!(!slot.is_dirty());
    }

    #[cfg(unix)]
    #[test]
    fn read_fault_keeps_pipe_open() {
        let dir = std::env::temp_dir().join(format!("vidpipe-producer-dir-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let (mut producer, slot) = producer(&dir);

        // Reading a directory fails with EISDIR rather than end of stream.
        assert_eq!(producer.iterate(), Iteration::ReadFailed);
        assert!(lock(&producer.gateway).is_open());
        assert!(!slot.is_dirty());

        std::fs::remove_dir(dir).ok();
    }

    #[test]
    fn worker_fills_slot_and_returns_producer() {
        let path = temp_stream("worker", &wire(&[7, 8]));
        let (producer, slot) = producer(&path);

        let worker = Worker::spawn(producer).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !slot.is_dirty() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(worker.is_running());

        let producer = worker.stop().unwrap();
        assert_eq!(producer.path(), path.as_path());
        assert!(slot.is_dirty());
        assert!(slot.geometry().is_some());

        std::fs::remove_file(path).ok();
    }
}
