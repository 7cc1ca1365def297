use tracing::trace;
use vidpipe_frame::Pixels;

use crate::events::{SizeChanged, SizeChangedRegistry};
use crate::slot::SharedFrameSlot;
use crate::surface::RenderSurface;

/// Foreground side of the hand-off: owns the ready-to-render pixels.
#[derive(Debug, Default)]
pub struct Consumer {
    pixels: Pixels,
    frame_is_new: bool,
    events: SizeChangedRegistry,
}

impl Consumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up the pending frame, if any. Never blocks on I/O.
    ///
    /// The slot is locked only for the dirty check and the copy. A size
    /// change is announced to subscribers and reallocates `surface`, which
    /// then receives every new frame. Returns whether a new frame arrived.
    pub fn update(
        &mut self,
        slot: &SharedFrameSlot,
        surface: Option<&mut dyn RenderSurface>,
    ) -> bool {
        let previous = (self.pixels.width(), self.pixels.height());
        let pixels = &mut self.pixels;
        let copied = slot.take_if_dirty(|frame| frame.write_to(pixels));

        self.frame_is_new = copied == Some(true);
        if !self.frame_is_new {
            return false;
        }

        let current = (self.pixels.width(), self.pixels.height());
        let resized = current != previous;
        if resized {
            self.events.notify(SizeChanged {
                width: current.0,
                height: current.1,
            });
        }

        if let Some(surface) = surface {
            if resized || !surface.is_ready() {
                surface.allocate(current.0, current.1, self.pixels.channels());
            }
            surface.upload(&self.pixels);
        }

        trace!(width = current.0, height = current.1, "new frame picked up");
        true
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// Whether the last [`update`](Self::update) picked up a frame.
    pub fn is_frame_new(&self) -> bool {
        self.frame_is_new
    }

    pub fn events(&mut self) -> &mut SizeChangedRegistry {
        &mut self.events
    }
}
