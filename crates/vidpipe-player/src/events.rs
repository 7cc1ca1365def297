use std::sync::mpsc;

use tracing::debug;

/// New frame dimensions, emitted when a decoded frame changes size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChanged {
    pub width: usize,
    pub height: usize,
}

/// Handle returned by [`SizeChangedRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(SizeChanged) + Send>;

/// Callback registry for size-changed notifications.
#[derive(Default)]
pub struct SizeChangedRegistry {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl SizeChangedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(SizeChanged) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    /// Subscribe an outbound channel the caller can poll.
    pub fn channel(&mut self) -> mpsc::Receiver<SizeChanged> {
        let (tx, rx) = mpsc::channel();
        self.subscribe(move |event| {
            // A dropped receiver just stops listening.
            let _ = tx.send(event);
        });
        rx
    }

    pub fn notify(&mut self, event: SizeChanged) {
        debug!(width = event.width, height = event.height, "frame size changed");
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for SizeChangedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeChangedRegistry")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}
