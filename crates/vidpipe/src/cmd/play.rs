use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use vidpipe_frame::FrameConfig;
use vidpipe_player::pacer::paced_wait;
use vidpipe_player::{PlayerConfig, ScheduleMode, SizeChanged, VideoPipe};
use vidpipe_transport::GatewayConfig;

use crate::cmd::{check_rate, parse_duration, Context, PlayArgs};
use crate::exit::{player_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_event, PlayEvent};

/// Consumer tick in background mode.
const CONSUMER_TICK: Duration = Duration::from_millis(5);

pub fn run(args: PlayArgs, ctx: &Context) -> CliResult<i32> {
    let config = PlayerConfig {
        mode: if args.inline {
            ScheduleMode::Inline
        } else {
            ScheduleMode::Background
        },
        frame_rate: check_rate(args.rate)?,
        use_texture: false,
        gateway: GatewayConfig {
            handshake_timeout: parse_duration(&args.timeout)?,
            ..GatewayConfig::default()
        },
        frame: FrameConfig::default(),
    };

    let mut pipe = VideoPipe::new(config).with_resolver(ctx.resolver());
    let sizes = pipe.size_changed_channel();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    pipe.open(&args.path)
        .map_err(|err| player_error("open failed", err))?;

    if args.seek_frame.is_some() || args.seek_time.is_some() {
        if !wait_for_geometry(&mut pipe, &running) {
            return Ok(SUCCESS);
        }
        // Drop the frame decoded before the seek, but keep its size event.
        pipe.update();
        print_size_changes(&sizes, ctx);

        let seeked = match (args.seek_frame, args.seek_time) {
            (Some(index), _) => pipe.set_frame(index),
            (None, Some(t)) => pipe.set_frame_for_time(t),
            (None, None) => Ok(0),
        };
        seeked.map_err(|err| player_error("seek failed", err))?;
    }

    let pacer = pipe.pacer();
    let mut shown = 0u64;
    while running.load(Ordering::SeqCst) {
        if pipe.update() {
            print_size_changes(&sizes, ctx);

            let pixels = pipe.pixels();
            let channels = pixels.channels().min(pixels.data().len());
            print_event(
                &PlayEvent::Frame {
                    frame: pipe.current_frame(),
                    total_frames: pipe.total_frames(),
                    width: pipe.width(),
                    height: pipe.height(),
                    first_pixel: pixels.data()[..channels].to_vec(),
                },
                ctx.format,
            );

            shown += 1;
            if args.count.is_some_and(|count| shown >= count) {
                break;
            }
        }

        if args.inline {
            paced_wait(&pacer);
            pipe.step();
        } else {
            std::thread::sleep(CONSUMER_TICK);
        }
    }

    pipe.close();
    Ok(SUCCESS)
}

fn print_size_changes(sizes: &Receiver<SizeChanged>, ctx: &Context) {
    for size in sizes.try_iter() {
        print_event(
            &PlayEvent::SizeChanged {
                width: size.width,
                height: size.height,
            },
            ctx.format,
        );
    }
}

/// Decode until the stream geometry is known. False if interrupted first.
fn wait_for_geometry(pipe: &mut VideoPipe, running: &AtomicBool) -> bool {
    while pipe.geometry().is_none() {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        if pipe.step().is_none() {
            std::thread::sleep(CONSUMER_TICK);
        }
    }
    true
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
