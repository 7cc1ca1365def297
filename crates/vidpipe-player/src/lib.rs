//! Playback engine for frames arriving over a FIFO.
//!
//! A producer decodes frames off the pipe and parks the latest one in a
//! [`SharedFrameSlot`]; the consumer picks it up once per tick with
//! [`VideoPipe::update`]. The producer runs either on its own worker thread
//! or inline inside the consumer's tick, throttled by a [`Pacer`].

pub mod config;
pub mod consumer;
pub mod error;
pub mod events;
pub mod pacer;
pub mod pipe;
pub mod producer;
pub mod resolve;
pub mod scrub;
pub mod slot;
pub mod surface;

pub use config::{PlayerConfig, ScheduleMode};
pub use consumer::Consumer;
pub use error::{PlayerError, Result};
pub use events::{SizeChanged, SizeChangedRegistry, SubscriptionId};
pub use pacer::Pacer;
pub use pipe::VideoPipe;
pub use producer::{Iteration, Producer, Worker};
pub use resolve::{DataDirResolver, IdentityResolver, PathResolver};
pub use scrub::Scrubber;
pub use slot::SharedFrameSlot;
pub use surface::{NullSurface, RenderSurface};
