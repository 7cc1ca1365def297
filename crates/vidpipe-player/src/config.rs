use vidpipe_frame::FrameConfig;
use vidpipe_transport::GatewayConfig;

/// Where the producer loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleMode {
    /// A dedicated worker thread decodes continuously, paced internally.
    #[default]
    Background,
    /// One decode runs inside each consumer tick; the caller paces.
    Inline,
}

/// Configuration for a [`crate::VideoPipe`].
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Producer scheduling. Default: background worker.
    pub mode: ScheduleMode,
    /// Target frames per second. `0` disables pacing. Default: 0.
    pub frame_rate: f64,
    /// Forward decoded frames to the render surface. Default: true.
    pub use_texture: bool,
    /// Pipe handshake settings.
    pub gateway: GatewayConfig,
    /// Frame codec limits.
    pub frame: FrameConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::default(),
            frame_rate: 0.0,
            use_texture: true,
            gateway: GatewayConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}
