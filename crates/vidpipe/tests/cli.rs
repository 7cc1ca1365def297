#![cfg(all(unix, feature = "cli"))]

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use vidpipe_frame::FrameWriter;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "vidpipe-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn record(path: &Path, fills: &[u8]) {
    let file = std::fs::File::create(path).expect("stream file should be creatable");
    let mut writer = FrameWriter::new(file);
    for &fill in fills {
        writer.send(4, 2, 255, &[fill; 24]).expect("frame should write");
    }
}

fn vidpipe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vidpipe"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .env_remove("VIDPIPE_DATA_DIR")
        .output()
        .expect("vidpipe should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout should be json lines"))
        .collect()
}

#[test]
fn version_prints_package_version() {
    let output = vidpipe(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("vidpipe {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn probe_reports_geometry_of_recorded_stream() {
    let dir = unique_temp_dir("probe");
    let path = dir.join("clip.ppm");
    record(&path, &[0, 1, 2, 3, 4]);

    let output = vidpipe(&["probe", path.to_str().unwrap(), "--frames", "2", "--rate", "10"]);
    assert!(output.status.success(), "{output:?}");

    let out = &json_lines(&output)[0];
    assert_eq!(out["seekable"], true);
    assert_eq!(out["geometry"]["header_size"], 11);
    assert_eq!(out["geometry"]["data_size"], 24);
    assert_eq!(out["geometry"]["frame_size"], 35);
    assert_eq!(out["geometry"]["total_frames"], 5);
    assert_eq!(out["frames"].as_array().unwrap().len(), 2);
    assert_eq!(out["frames"][1]["offset"], 35);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn probe_resolves_names_under_data_dir() {
    let dir = unique_temp_dir("datadir");
    record(&dir.join("clip.ppm"), &[9]);

    let output = Command::new(env!("CARGO_BIN_EXE_vidpipe"))
        .args(["--log-level", "error", "--format", "json", "probe", "clip.ppm"])
        .env("VIDPIPE_DATA_DIR", &dir)
        .output()
        .expect("vidpipe should run");
    assert!(output.status.success(), "{output:?}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn probe_rejects_bad_magic_with_data_invalid() {
    let dir = unique_temp_dir("magic");
    let path = dir.join("gray.pgm");
    std::fs::write(&path, b"P5\n4 2\n255\n").unwrap();

    let output = vidpipe(&["probe", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad magic"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn probe_missing_device_is_transport_error() {
    let output = vidpipe(&["probe", "/nonexistent/vidpipe/clip.fifo"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn probe_fifo_without_writer_times_out() {
    let dir = unique_temp_dir("timeout");
    let path = dir.join("idle.fifo");
    let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
    // SAFETY: `c_path` is a valid NUL-terminated path string.
    assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) }, 0);

    let output = vidpipe(&["probe", path.to_str().unwrap(), "--timeout", "200ms"]);
    assert_eq!(output.status.code(), Some(124));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn feed_into_fifo_plays_back() {
    let dir = unique_temp_dir("feed");
    let path = dir.join("live.fifo");
    let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
    // SAFETY: `c_path` is a valid NUL-terminated path string.
    assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) }, 0);

    let feeder = Command::new(env!("CARGO_BIN_EXE_vidpipe"))
        .args(["--log-level", "error", "--format", "json", "feed"])
        .arg(&path)
        .args(["--width", "4", "--height", "2", "--count", "3", "--rate", "20"])
        .stdout(Stdio::piped())
        .spawn()
        .expect("feed should start");

    let output = vidpipe(&[
        "play",
        path.to_str().unwrap(),
        "--rate",
        "0",
        "--count",
        "3",
        "--timeout",
        "5s",
    ]);
    assert!(output.status.success(), "{output:?}");

    let events = json_lines(&output);
    assert_eq!(events[0]["event"], "size_changed");
    assert_eq!(events[0]["width"], 4);
    let frames: Vec<_> = events.iter().filter(|e| e["event"] == "frame").collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["total_frames"], 0);
    assert_eq!(frames[2]["first_pixel"], serde_json::json!([2, 2, 2]));

    let fed = feeder.wait_with_output().expect("feed should finish");
    assert!(fed.status.success());
    let summary = &json_lines(&fed)[0];
    assert_eq!(summary["frames"], 3);
    assert_eq!(summary["bytes"], 3 * 35);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn play_inline_seeks_recorded_stream() {
    let dir = unique_temp_dir("seek");
    let path = dir.join("clip.ppm");
    record(&path, &[10, 11, 12, 13, 14]);

    let output = vidpipe(&[
        "play",
        path.to_str().unwrap(),
        "--inline",
        "--rate",
        "0",
        "--seek-frame",
        "3",
        "--count",
        "2",
    ]);
    assert!(output.status.success(), "{output:?}");

    let events = json_lines(&output);
    assert_eq!(events[0]["event"], "size_changed");
    assert_eq!((events[0]["width"].as_u64(), events[0]["height"].as_u64()), (Some(4), Some(2)));

    let frames: Vec<_> = events
        .into_iter()
        .filter(|e| e["event"] == "frame")
        .collect();
    assert_eq!(frames[0]["first_pixel"], serde_json::json!([13, 13, 13]));
    assert_eq!(frames[0]["frame"], 4);
    assert_eq!(frames[1]["first_pixel"], serde_json::json!([14, 14, 14]));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn play_rejects_out_of_range_seek() {
    let dir = unique_temp_dir("range");
    let path = dir.join("clip.ppm");
    record(&path, &[1, 2]);

    let output = vidpipe(&[
        "play",
        path.to_str().unwrap(),
        "--inline",
        "--seek-frame",
        "7",
    ]);
    assert_eq!(output.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn feed_rejects_zero_dimensions() {
    let output = vidpipe(&["feed", "/tmp/unused.ppm", "--width", "0"]);
    assert_eq!(output.status.code(), Some(64));
}
