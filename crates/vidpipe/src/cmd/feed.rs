use std::fs::OpenOptions;

use tracing::info;
use vidpipe_frame::{FrameWriter, CHANNELS};
use vidpipe_player::Pacer;

use crate::cmd::{check_rate, Context, FeedArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_feed, FeedOutput};

const DEPTH: u32 = 255;

pub fn run(args: FeedArgs, ctx: &Context) -> CliResult<i32> {
    let rate = check_rate(args.rate)?;
    if args.width == 0 || args.height == 0 {
        return Err(CliError::new(USAGE, "width and height must be at least 1"));
    }
    let data_size = args
        .width
        .checked_mul(args.height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| CliError::new(USAGE, "frame dimensions overflow"))?;

    let path = ctx.resolve(&args.path);
    // Blocks until a reader attaches when `path` is a FIFO.
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;

    let mut writer = FrameWriter::new(file);
    let mut pacer = Pacer::new(rate);
    let mut data = vec![0u8; data_size];
    let frame_bytes = (wire_header(args.width, args.height).len() + data_size) as u64;

    let mut written = 0u64;
    for index in 0..args.count {
        pacer.tick();
        fill_gradient(&mut data, args.width, index);
        writer
            .send(args.width, args.height, DEPTH, &data)
            .map_err(|err| frame_error("write failed", err))?;
        written += 1;
    }
    info!(frames = written, path = %path.display(), "feed complete");

    let out = FeedOutput {
        path: path.display().to_string(),
        frames: written,
        width: args.width,
        height: args.height,
        bytes: written * frame_bytes,
    };
    print_feed(&out, ctx.format);
    Ok(SUCCESS)
}

fn wire_header(width: usize, height: usize) -> String {
    format!("P6\n{width} {height}\n{DEPTH}\n")
}

/// A gradient that shifts by one step per frame; pixel (0, 0) of frame `i`
/// is `[i, i, i]` modulo 256.
fn fill_gradient(data: &mut [u8], width: usize, index: u64) {
    let shift = (index % 256) as usize;
    for (i, px) in data.chunks_exact_mut(CHANNELS).enumerate() {
        let (x, y) = (i % width, i / width);
        px[0] = ((x + shift) % 256) as u8;
        px[1] = ((y + shift) % 256) as u8;
        px[2] = shift as u8;
    }
}
