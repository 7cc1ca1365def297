use std::sync::{Mutex, MutexGuard, PoisonError};

use vidpipe_frame::{Frame, StreamGeometry};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct SlotState {
    frame: Frame,
    dirty: bool,
    current_index: u64,
    geometry: Option<StreamGeometry>,
}

/// The single hand-off point between producer and consumer.
///
/// Holds the latest decoded frame, a dirty flag, the running frame index and
/// the frozen stream geometry behind one lock. Neither side holds the lock
/// across blocking I/O.
#[derive(Debug, Default)]
pub struct SharedFrameSlot {
    state: Mutex<SlotState>,
}

impl SharedFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a freshly decoded frame.
    ///
    /// `position` is the stream cursor right after the frame. The first frame
    /// stored since the last [`reset`](Self::reset) freezes the geometry.
    /// Returns the updated frame index.
    pub fn store(
        &self,
        frame: Frame,
        position: u64,
        total_len: Option<u64>,
        seconds_per_frame: f64,
    ) -> u64 {
        let mut state = lock(&self.state);

        if state.geometry.is_none() {
            state.geometry = Some(StreamGeometry::from_first_frame(
                frame.header(),
                total_len,
                seconds_per_frame,
            ));
        }
        if let Some(geometry) = &state.geometry {
            state.current_index = geometry.frame_index_at(position);
        }

        state.frame = frame;
        state.dirty = true;
        state.current_index
    }

    /// Run `f` on the pending frame and clear the dirty flag.
    ///
    /// Returns `None` without calling `f` when nothing new was stored since
    /// the previous call.
    pub fn take_if_dirty<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        let mut state = lock(&self.state);
        if !state.dirty {
            return None;
        }
        let out = f(&state.frame);
        state.dirty = false;
        Some(out)
    }

    pub fn is_dirty(&self) -> bool {
        lock(&self.state).dirty
    }

    /// `stream position / frame size` as of the last stored frame.
    pub fn current_index(&self) -> u64 {
        lock(&self.state).current_index
    }

    pub fn geometry(&self) -> Option<StreamGeometry> {
        lock(&self.state).geometry
    }

    pub fn total_frames(&self) -> u64 {
        lock(&self.state).geometry.map_or(0, |g| g.total_frames)
    }

    /// Forget the stored frame, index and geometry.
    pub fn reset(&self) {
        *lock(&self.state) = SlotState::default();
    }
}
