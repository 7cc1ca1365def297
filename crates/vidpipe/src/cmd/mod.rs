use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use vidpipe_player::{DataDirResolver, IdentityResolver, PathResolver};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod feed;
pub mod play;
pub mod probe;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode the first frames of a stream and print its geometry.
    Probe(ProbeArgs),
    /// Play a stream, printing one line per new frame.
    Play(PlayArgs),
    /// Write synthetic frames into a pipe or file.
    Feed(FeedArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub data_dir: Option<PathBuf>,
}

impl Context {
    /// Map a stream name to a path, honoring `--data-dir`.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.resolver().resolve(name)
    }

    pub fn resolver(&self) -> Box<dyn PathResolver> {
        match &self.data_dir {
            Some(dir) => Box::new(DataDirResolver::new(dir)),
            None => Box::new(IdentityResolver),
        }
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Probe(args) => probe::run(args, ctx),
        Command::Play(args) => play::run(args, ctx),
        Command::Feed(args) => feed::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Stream to probe (FIFO or recorded file).
    pub path: String,
    /// Number of frames to decode.
    #[arg(long, default_value = "1")]
    pub frames: u64,
    /// Frame rate used to compute the stream duration.
    #[arg(long, default_value = "0")]
    pub rate: f64,
    /// How long to wait for a writer (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Stream to play (FIFO or recorded file).
    pub path: String,
    /// Target decode rate in frames per second; 0 is unthrottled.
    #[arg(long, default_value = "30")]
    pub rate: f64,
    /// Decode on the consumer tick instead of a worker thread.
    #[arg(long)]
    pub inline: bool,
    /// Exit after N new frames.
    #[arg(long)]
    pub count: Option<u64>,
    /// Start playback at this frame index (recorded streams only).
    #[arg(long, conflicts_with = "seek_time")]
    pub seek_frame: Option<u64>,
    /// Start playback at this time in seconds (recorded streams only).
    #[arg(long, allow_negative_numbers = true)]
    pub seek_time: Option<f64>,
    /// How long to wait for a writer (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Pipe or file to write.
    pub path: String,
    /// Frame width in pixels.
    #[arg(long, default_value = "64")]
    pub width: usize,
    /// Frame height in pixels.
    #[arg(long, default_value = "48")]
    pub height: usize,
    /// Number of frames to write.
    #[arg(long, default_value = "30")]
    pub count: u64,
    /// Frames per second; 0 writes as fast as the reader drains.
    #[arg(long, default_value = "0")]
    pub rate: f64,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}

pub fn check_rate(rate: f64) -> CliResult<f64> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(CliError::new(USAGE, format!("invalid frame rate: {rate}")))
    }
}
