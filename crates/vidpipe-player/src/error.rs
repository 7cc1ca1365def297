/// Errors surfaced by the playback engine.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Opening, reading or repositioning the pipe failed.
    #[error("pipe error: {0}")]
    Pipe(#[from] vidpipe_transport::PipeError),

    /// No frame has been decoded yet, so byte offsets are unknown.
    #[error("stream geometry unknown (no frame decoded yet)")]
    GeometryUnknown,

    /// The requested frame does not lie wholly inside the stream.
    #[error("frame {index} out of range (offset {position}, max {max:?})")]
    SeekOutOfRange {
        index: u64,
        position: u64,
        max: Option<u64>,
    },

    /// The requested time cannot be mapped onto a frame.
    #[error("cannot map time {0}s to a frame")]
    InvalidTime(f64),

    /// The background producer could not be started.
    #[error("failed to spawn producer worker: {0}")]
    WorkerSpawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
