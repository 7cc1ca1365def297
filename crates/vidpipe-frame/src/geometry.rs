use tracing::info;

use crate::header::FrameHeader;

/// Size and duration constants of a stream, measured from its first frame.
///
/// Computed once and never re-validated: if the writer changes resolution
/// mid-stream, index and duration arithmetic silently drifts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamGeometry {
    pub header_size: u64,
    pub data_size: u64,
    /// `header_size + data_size`; never zero.
    pub frame_size: u64,
    /// Total stream bytes, when the device reports a length.
    pub total_len: Option<u64>,
    /// `total_len / frame_size`, or zero for an unbounded stream.
    pub total_frames: u64,
    /// Playback time per frame at the moment geometry was frozen.
    pub seconds_per_frame: f64,
    /// `total_frames * seconds_per_frame`.
    pub duration: f64,
}

impl StreamGeometry {
    /// Freeze geometry from the first successfully decoded header.
    pub fn from_first_frame(
        header: &FrameHeader,
        total_len: Option<u64>,
        seconds_per_frame: f64,
    ) -> Self {
        let header_size = header.header_size as u64;
        let data_size = header.data_size() as u64;
        let frame_size = (header_size + data_size).max(1);
        let total_frames = total_len.map_or(0, |len| len / frame_size);
        let duration = total_frames as f64 * seconds_per_frame;

        info!(
            header_size,
            data_size,
            frame_size,
            total_frames,
            duration,
            "stream geometry frozen"
        );

        Self {
            header_size,
            data_size,
            frame_size,
            total_len,
            total_frames,
            seconds_per_frame,
            duration,
        }
    }

    /// Index of the frame that starts at or before `position`.
    pub fn frame_index_at(&self, position: u64) -> u64 {
        position / self.frame_size
    }

    /// Byte offset of frame `index`, if a whole frame fits there.
    ///
    /// Valid offsets lie in `[0, total_len - frame_size]`.
    pub fn offset_for_frame(&self, index: u64) -> Option<u64> {
        let position = index.checked_mul(self.frame_size)?;
        let last = self.total_len?.checked_sub(self.frame_size)?;
        (position <= last).then_some(position)
    }

    /// Frame index for playback time `t`, wrapped into `[0, duration)`.
    pub fn frame_index_for_time(&self, t: f64) -> Option<u64> {
        if !t.is_finite() || self.duration <= 0.0 || self.seconds_per_frame <= 0.0 {
            return None;
        }
        // rem_euclid can round up to exactly `duration` for tiny negative t.
        let wrapped = t.rem_euclid(self.duration);
        let index = (wrapped / self.seconds_per_frame).floor() as u64;
        Some(index.min(self.total_frames.saturating_sub(1)))
    }

    /// Largest valid scrub offset, if the stream is bounded.
    pub fn max_offset(&self) -> Option<u64> {
        self.total_len?.checked_sub(self.frame_size)
    }
}
