use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};
use vidpipe_frame::{Pixels, StreamGeometry};
use vidpipe_transport::{PipeError, PipeGateway};

use crate::config::{PlayerConfig, ScheduleMode};
use crate::consumer::Consumer;
use crate::error::{PlayerError, Result};
use crate::events::{SizeChanged, SubscriptionId};
use crate::pacer::Pacer;
use crate::producer::{Iteration, Producer, Worker};
use crate::resolve::{IdentityResolver, PathResolver};
use crate::scrub::Scrubber;
use crate::slot::{lock, SharedFrameSlot};
use crate::surface::{NullSurface, RenderSurface};

/// A video stream read frame by frame from a named pipe.
///
/// Call [`open`](Self::open) once, then [`update`](Self::update) once per
/// consumer tick. In [`ScheduleMode::Inline`] also call
/// [`step`](Self::step) each tick to decode. Consumer-side calls never wait on
/// the pipe, with two exceptions: scrubbing waits for an in-flight read to
/// finish, and [`close`](Self::close) waits for the worker to exit.
pub struct VideoPipe {
    config: PlayerConfig,
    gateway: Arc<Mutex<PipeGateway>>,
    slot: Arc<SharedFrameSlot>,
    pacer: Arc<Mutex<Pacer>>,
    consumer: Consumer,
    surface: Box<dyn RenderSurface>,
    resolver: Box<dyn PathResolver>,
    scrubber: Option<Scrubber>,
    path: Option<PathBuf>,
    worker: Option<Worker>,
    inline: Option<Producer>,
}

impl VideoPipe {
    pub fn new(config: PlayerConfig) -> Self {
        let gateway = PipeGateway::with_config(config.gateway.clone());
        let pacer = Pacer::new(config.frame_rate);
        Self {
            config,
            gateway: Arc::new(Mutex::new(gateway)),
            slot: Arc::new(SharedFrameSlot::new()),
            pacer: Arc::new(Mutex::new(pacer)),
            consumer: Consumer::new(),
            surface: Box::new(NullSurface::new()),
            resolver: Box::new(IdentityResolver),
            scrubber: None,
            path: None,
            worker: None,
            inline: None,
        }
    }

    /// Render decoded frames to `surface` instead of discarding them.
    pub fn with_surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    /// Resolve names passed to [`open`](Self::open) with `resolver`.
    pub fn with_resolver(mut self, resolver: impl PathResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Start consuming the pipe called `name`.
    ///
    /// Returns `Ok(())` without doing anything if playback is already active.
    /// Nothing starts unless the handshake succeeds; the caller decides when
    /// to retry. In inline mode one frame is decoded right away.
    pub fn open(&mut self, name: &str) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        let path = self.resolver.resolve(name);
        if self.config.use_texture {
            self.surface.allocate(1, 1, 3);
            if !self.surface.is_ready() {
                error!(?path, "render surface is not ready, cannot open pipe");
                return Err(PipeError::InitFail("render surface not ready".to_string()).into());
            }
        }

        lock(&self.gateway).open(&path)?;

        match self.config.mode {
            ScheduleMode::Background => {
                let worker =
                    Worker::spawn(self.producer(path.clone())).map_err(PlayerError::WorkerSpawn)?;
                self.worker = Some(worker);
            }
            ScheduleMode::Inline => {
                let mut producer = self.producer(path.clone());
                producer.iterate();
                self.inline = Some(producer);
            }
        }

        self.scrubber = Some(Scrubber::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.slot),
            &path,
        ));
        self.path = Some(path.clone());

        info!(?path, mode = ?self.config.mode, "video pipe open");
        Ok(())
    }

    fn producer(&self, path: PathBuf) -> Producer {
        Producer::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.slot),
            Arc::clone(&self.pacer),
            path,
            self.config.frame.clone(),
        )
    }

    /// Run one producer iteration in inline mode.
    ///
    /// Returns `None` in background mode or before [`open`](Self::open).
    pub fn step(&mut self) -> Option<Iteration> {
        self.inline.as_mut().map(Producer::iterate)
    }

    /// Pick up the latest decoded frame. Returns whether one was new.
    pub fn update(&mut self) -> bool {
        let surface: Option<&mut dyn RenderSurface> = if self.config.use_texture {
            Some(&mut *self.surface)
        } else {
            None
        };
        self.consumer.update(&self.slot, surface)
    }

    /// Stop the worker, close the pipe and forget the stream geometry.
    pub fn close(&mut self) {
        let was_open = self.is_open();
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
        self.inline = None;
        self.scrubber = None;
        self.path = None;
        lock(&self.gateway).close();
        self.slot.reset();
        if was_open {
            info!("video pipe closed");
        }
    }

    /// Whether playback is active, between [`open`](Self::open) and
    /// [`close`](Self::close).
    pub fn is_open(&self) -> bool {
        self.worker.is_some() || self.inline.is_some()
    }

    /// Target decode rate in frames per second; `0` removes all pacing.
    pub fn set_frame_rate(&mut self, fps: f64) {
        lock(&self.pacer).set_rate(fps);
        self.config.frame_rate = lock(&self.pacer).rate();
        debug!(fps = self.config.frame_rate, "frame rate set");
    }

    pub fn frame_rate(&self) -> f64 {
        lock(&self.pacer).rate()
    }

    /// A shared handle to the pacer, for callers pacing inline mode.
    pub fn pacer(&self) -> Arc<Mutex<Pacer>> {
        Arc::clone(&self.pacer)
    }

    /// Toggle forwarding frames to the render surface.
    pub fn set_use_texture(&mut self, enabled: bool) {
        self.config.use_texture = enabled;
    }

    pub fn use_texture(&self) -> bool {
        self.config.use_texture
    }

    /// Producer scheduling for the next [`open`](Self::open).
    pub fn set_schedule_mode(&mut self, mode: ScheduleMode) {
        self.config.mode = mode;
    }

    pub fn schedule_mode(&self) -> ScheduleMode {
        self.config.mode
    }

    /// Reposition so the next decode reads frame `index`.
    ///
    /// Out-of-range targets are logged and leave the cursor where it was.
    pub fn set_frame(&mut self, index: u64) -> Result<u64> {
        self.scrubber()?.set_frame(index)
    }

    /// Reposition so the next decode reads the frame shown at `t` seconds.
    pub fn set_frame_for_time(&mut self, t: f64) -> Result<u64> {
        self.scrubber()?.set_frame_for_time(t)
    }

    fn scrubber(&self) -> Result<&Scrubber> {
        self.scrubber
            .as_ref()
            .ok_or(PlayerError::Pipe(PipeError::NotOpen))
    }

    pub fn width(&self) -> usize {
        self.consumer.width()
    }

    pub fn height(&self) -> usize {
        self.consumer.height()
    }

    /// The most recently picked-up frame.
    pub fn pixels(&self) -> &Pixels {
        self.consumer.pixels()
    }

    /// Whether the last [`update`](Self::update) picked up a new frame.
    pub fn is_frame_new(&self) -> bool {
        self.consumer.is_frame_new()
    }

    /// Stream position divided by frame size, as of the last decode.
    pub fn current_frame(&self) -> u64 {
        self.slot.current_index()
    }

    /// Whole frames in the stream; zero for an unbounded FIFO.
    pub fn total_frames(&self) -> u64 {
        self.slot.total_frames()
    }

    pub fn geometry(&self) -> Option<StreamGeometry> {
        self.slot.geometry()
    }

    /// Path of the pipe being consumed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn draw(&mut self, x: f32, y: f32) {
        if self.config.use_texture && self.surface.is_ready() {
            self.surface.draw(x, y);
        }
    }

    pub fn draw_scaled(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if self.config.use_texture && self.surface.is_ready() {
            self.surface.draw_scaled(x, y, width, height);
        }
    }

    /// Call `callback` whenever decoded frames change size.
    pub fn subscribe_size_changed(
        &mut self,
        callback: impl FnMut(SizeChanged) + Send + 'static,
    ) -> SubscriptionId {
        self.consumer.events().subscribe(callback)
    }

    pub fn unsubscribe_size_changed(&mut self, id: SubscriptionId) -> bool {
        self.consumer.events().unsubscribe(id)
    }

    /// Size changes as a channel the caller can poll.
    pub fn size_changed_channel(&mut self) -> mpsc::Receiver<SizeChanged> {
        self.consumer.events().channel()
    }
}

impl Default for VideoPipe {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl Drop for VideoPipe {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for VideoPipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPipe")
            .field("config", &self.config)
            .field("open", &self.is_open())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("current_frame", &self.current_frame())
            .finish_non_exhaustive()
    }
}
