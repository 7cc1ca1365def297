use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use vidpipe_transport::PipeGateway;

use crate::error::{PlayerError, Result};
use crate::slot::{lock, SharedFrameSlot};

/// Repositions the stream cursor to a frame index or playback time.
///
/// Nothing is decoded here; the next producer iteration reads from the new
/// position. Offsets come from the frozen geometry, so a scrub is only
/// possible after the first frame and only on a stream with a known length.
#[derive(Debug, Clone)]
pub struct Scrubber {
    gateway: Arc<Mutex<PipeGateway>>,
    slot: Arc<SharedFrameSlot>,
    path: PathBuf,
}

impl Scrubber {
    pub fn new(
        gateway: Arc<Mutex<PipeGateway>>,
        slot: Arc<SharedFrameSlot>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gateway,
            slot,
            path: path.into(),
        }
    }

    /// Move the cursor to the start of frame `index`. Returns the byte offset.
    pub fn set_frame(&self, index: u64) -> Result<u64> {
        let geometry = self.slot.geometry().ok_or_else(|| {
            warn!(index, "cannot seek before the first frame is decoded");
            PlayerError::GeometryUnknown
        })?;

        let position = geometry.offset_for_frame(index).ok_or_else(|| {
            let position = index.saturating_mul(geometry.frame_size);
            let max = geometry.max_offset();
            warn!(index, position, ?max, "seek target out of range, ignoring");
            PlayerError::SeekOutOfRange {
                index,
                position,
                max,
            }
        })?;

        let mut gateway = lock(&self.gateway);
        gateway.open(&self.path)?;
        gateway.seek_to(position)?;
        debug!(index, position, "stream repositioned");
        Ok(position)
    }

    /// Move the cursor to the frame shown at playback time `t` (seconds).
    ///
    /// `t` wraps modulo the stream duration, so negative and overlong times
    /// land inside the stream.
    pub fn set_frame_for_time(&self, t: f64) -> Result<u64> {
        let geometry = self.slot.geometry().ok_or(PlayerError::GeometryUnknown)?;
        let index = geometry.frame_index_for_time(t).ok_or_else(|| {
            warn!(t, duration = geometry.duration, "cannot map time to a frame");
            PlayerError::InvalidTime(t)
        })?;
        self.set_frame(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacer::Pacer;
    use crate::producer::{Iteration, Producer};
    use bytes::BytesMut;
    use vidpipe_frame::{encode_frame, FrameConfig};

    struct Rig {
        producer: Producer,
        scrubber: Scrubber,
        slot: Arc<SharedFrameSlot>,
        path: PathBuf,
    }

    impl Drop for Rig {
        fn drop(&mut self) {
            std::fs::remove_file(&self.path).ok();
        }
    }

    fn rig(tag: &str, frames: u8, fps: f64) -> Rig {
        let path = std::env::temp_dir().join(format!(
            "vidpipe-scrub-{tag}-{}.ppm",
            std::process::id()
        ));
        let mut buf = BytesMut::new();
        for fill in 0..frames {
            encode_frame(4, 2, 255, &[fill; 24], &mut buf).unwrap();
        }
        std::fs::write(&path, &buf).unwrap();

        let gateway = Arc::new(Mutex::new(PipeGateway::new()));
        let slot = Arc::new(SharedFrameSlot::new());
        let producer = Producer::new(
            Arc::clone(&gateway),
            Arc::clone(&slot),
            Arc::new(Mutex::new(Pacer::new(fps))),
            &path,
            FrameConfig::default(),
        );
        let scrubber = Scrubber::new(gateway, Arc::clone(&slot), &path);
        Rig {
            producer,
            scrubber,
            slot,
            path,
        }
    }

    fn decoded_fill(rig: &mut Rig) -> u8 {
        assert!(rig.producer.iterate().is_decoded());
        rig.slot.take_if_dirty(|f| f.data()[0]).unwrap()
    }

    #[test]
    fn seek_before_first_frame_is_rejected() {
        let rig = rig("early", 4, 0.0);
        assert!(matches!(
            rig.scrubber.set_frame(0),
            Err(PlayerError::GeometryUnknown)
        ));
    }

    #[test]
    fn set_frame_repositions_next_decode() {
        let mut rig = rig("index", 4, 0.0);
        assert_eq!(decoded_fill(&mut rig), 0);

        assert_eq!(rig.scrubber.set_frame(2).unwrap(), 70);
        assert_eq!(decoded_fill(&mut rig), 2);
        assert_eq!(rig.slot.current_index(), 3);

        assert_eq!(rig.scrubber.set_frame(3).unwrap(), 105);
        assert_eq!(decoded_fill(&mut rig), 3);
    }

    #[test]
    fn out_of_range_seek_is_a_logged_no_op() {
        let mut rig = rig("range", 4, 0.0);
        decoded_fill(&mut rig);

        let err = rig.scrubber.set_frame(4).unwrap_err();
        assert!(matches!(
            err,
            PlayerError::SeekOutOfRange {
                index: 4,
                position: 140,
                max: Some(105)
            }
        ));
        assert_eq!(decoded_fill(&mut rig), 1);
    }

    #[test]
    fn time_maps_through_frame_duration() {
        let mut rig = rig("time", 4, 10.0);
        decoded_fill(&mut rig);

        assert_eq!(rig.scrubber.set_frame_for_time(0.25).unwrap(), 70);
        assert_eq!(decoded_fill(&mut rig), 2);

        // 0.65 wraps to 0.25 in a 0.4 second stream.
        assert_eq!(rig.scrubber.set_frame_for_time(0.65).unwrap(), 70);
        assert_eq!(rig.scrubber.set_frame_for_time(-0.05).unwrap(), 105);
        assert_eq!(rig.scrubber.set_frame_for_time(-1e-20).unwrap(), 105);
        assert_eq!(decoded_fill(&mut rig), 3);
    }

    #[test]
    fn time_needs_a_frame_rate() {
        let mut rig = rig("norate", 4, 0.0);
        decoded_fill(&mut rig);
        assert!(matches!(
            rig.scrubber.set_frame_for_time(1.0),
            Err(PlayerError::InvalidTime(_))
        ));
    }

    #[test]
    fn repeated_decode_at_same_offset_is_identical() {
        let mut rig = rig("repeat", 4, 0.0);
        decoded_fill(&mut rig);

        rig.scrubber.set_frame(1).unwrap();
        assert_eq!(rig.producer.iterate(), Iteration::Decoded { index: 2 });
        let first = rig.slot.take_if_dirty(|f| (f.width(), f.height(), f.data().clone()));

        rig.scrubber.set_frame(1).unwrap();
        rig.producer.iterate();
        let second = rig.slot.take_if_dirty(|f| (f.width(), f.height(), f.data().clone()));

        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
