use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use vidpipe_frame::StreamGeometry;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy)]
pub struct GeometryOutput {
    pub header_size: u64,
    pub data_size: u64,
    pub frame_size: u64,
    pub total_len: Option<u64>,
    pub total_frames: u64,
    pub seconds_per_frame: f64,
    pub duration: f64,
}

impl From<StreamGeometry> for GeometryOutput {
    fn from(g: StreamGeometry) -> Self {
        Self {
            header_size: g.header_size,
            data_size: g.data_size,
            frame_size: g.frame_size,
            total_len: g.total_len,
            total_frames: g.total_frames,
            seconds_per_frame: g.seconds_per_frame,
            duration: g.duration,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct FrameSummary {
    pub index: u64,
    pub offset: u64,
    pub width: usize,
    pub height: usize,
    pub depth: u32,
    pub header_size: usize,
    pub data_size: usize,
}

#[derive(Serialize, Debug)]
pub struct ProbeOutput {
    pub path: String,
    pub seekable: bool,
    pub geometry: Option<GeometryOutput>,
    pub frames: Vec<FrameSummary>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayEvent {
    Frame {
        frame: u64,
        total_frames: u64,
        width: usize,
        height: usize,
        first_pixel: Vec<u8>,
    },
    SizeChanged {
        width: usize,
        height: usize,
    },
}

#[derive(Serialize, Debug)]
pub struct FeedOutput {
    pub path: String,
    pub frames: u64,
    pub width: usize,
    pub height: usize,
    pub bytes: u64,
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn opt(value: Option<u64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

pub fn print_probe(out: &ProbeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            if let Some(g) = &out.geometry {
                let mut table = new_table(vec!["FIELD", "VALUE"]);
                table
                    .add_row(vec!["path".to_string(), out.path.clone()])
                    .add_row(vec!["seekable".to_string(), out.seekable.to_string()])
                    .add_row(vec!["header size".to_string(), g.header_size.to_string()])
                    .add_row(vec!["data size".to_string(), g.data_size.to_string()])
                    .add_row(vec!["frame size".to_string(), g.frame_size.to_string()])
                    .add_row(vec!["stream bytes".to_string(), opt(g.total_len)])
                    .add_row(vec!["total frames".to_string(), g.total_frames.to_string()])
                    .add_row(vec!["duration (s)".to_string(), format!("{:.3}", g.duration)]);
                println!("{table}");
            }

            let mut frames = new_table(vec!["INDEX", "OFFSET", "SIZE", "DEPTH", "HEADER", "DATA"]);
            for f in &out.frames {
                frames.add_row(vec![
                    f.index.to_string(),
                    f.offset.to_string(),
                    format!("{}x{}", f.width, f.height),
                    f.depth.to_string(),
                    f.header_size.to_string(),
                    f.data_size.to_string(),
                ]);
            }
            println!("{frames}");
        }
        OutputFormat::Pretty => {
            println!("Stream: {}", out.path);
            println!("  Seekable:      {}", out.seekable);
            match &out.geometry {
                Some(g) => {
                    println!("  Header size:   {}", g.header_size);
                    println!("  Data size:     {}", g.data_size);
                    println!("  Frame size:    {}", g.frame_size);
                    println!("  Stream bytes:  {}", opt(g.total_len));
                    println!("  Total frames:  {}", g.total_frames);
                    println!("  Duration:      {:.3}s", g.duration);
                }
                None => println!("  Geometry:      unknown"),
            }
            for f in &out.frames {
                println!(
                    "  frame {} @{}: {}x{} depth={}",
                    f.index, f.offset, f.width, f.height, f.depth
                );
            }
        }
    }
}

pub fn print_event(event: &PlayEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(event),
        OutputFormat::Table => {
            let mut table = new_table(vec!["EVENT", "FRAME", "SIZE"]);
            match event {
                PlayEvent::Frame {
                    frame,
                    total_frames,
                    width,
                    height,
                    ..
                } => table.add_row(vec![
                    "frame".to_string(),
                    format!("{frame}/{total_frames}"),
                    format!("{width}x{height}"),
                ]),
                PlayEvent::SizeChanged { width, height } => table.add_row(vec![
                    "size_changed".to_string(),
                    "-".to_string(),
                    format!("{width}x{height}"),
                ]),
            };
            println!("{table}");
        }
        OutputFormat::Pretty => match event {
            PlayEvent::Frame {
                frame,
                total_frames,
                width,
                height,
                first_pixel,
            } => println!(
                "frame={frame}/{total_frames} size={width}x{height} first_pixel={first_pixel:?}"
            ),
            PlayEvent::SizeChanged { width, height } => {
                println!("size changed to {width}x{height}")
            }
        },
    }
}

pub fn print_feed(out: &FeedOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PATH", "FRAMES", "SIZE", "BYTES"]);
            table.add_row(vec![
                out.path.clone(),
                out.frames.to_string(),
                format!("{}x{}", out.width, out.height),
                out.bytes.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "wrote {} frames ({}x{}, {} bytes) to {}",
            out.frames, out.width, out.height, out.bytes, out.path
        ),
    }
}
