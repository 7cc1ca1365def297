use vidpipe_frame::FrameReader;
use vidpipe_player::Pacer;
use vidpipe_transport::{GatewayConfig, PipeGateway};

use crate::cmd::{check_rate, parse_duration, Context, ProbeArgs};
use crate::exit::{frame_error, pipe_error, CliResult, SUCCESS};
use crate::output::{print_probe, FrameSummary, ProbeOutput};

pub fn run(args: ProbeArgs, ctx: &Context) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let seconds_per_frame = Pacer::new(check_rate(args.rate)?).seconds_per_frame();
    let path = ctx.resolve(&args.path);

    let mut gateway = PipeGateway::with_config(GatewayConfig {
        handshake_timeout: timeout,
        ..GatewayConfig::default()
    });
    gateway
        .open(&path)
        .map_err(|err| pipe_error("open failed", err))?;

    let total_len = gateway.len();
    let stream = gateway
        .stream_mut()
        .map_err(|err| pipe_error("open failed", err))?;
    let mut reader = FrameReader::new(stream).with_stream_info(total_len, seconds_per_frame);

    let mut frames = Vec::new();
    while (frames.len() as u64) < args.frames {
        let offset = reader.get_ref().position();
        match reader.read_frame() {
            Ok(frame) => frames.push(FrameSummary {
                index: frames.len() as u64,
                offset,
                width: frame.width(),
                height: frame.height(),
                depth: frame.header().depth,
                header_size: frame.header().header_size,
                data_size: frame.data_size(),
            }),
            // Fewer frames than asked for is fine once one decoded.
            Err(err) if err.is_end_of_stream() && !frames.is_empty() => break,
            Err(err) => return Err(frame_error("decode failed", err)),
        }
    }

    let out = ProbeOutput {
        path: path.display().to_string(),
        seekable: total_len.is_some(),
        geometry: reader.geometry().copied().map(Into::into),
        frames,
    };
    print_probe(&out, ctx.format);
    Ok(SUCCESS)
}
