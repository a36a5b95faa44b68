use crate::foundation::core::Fps;

use super::*;

fn sink_cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30000, 1001).unwrap(),
    }
}

#[test]
fn args_describe_raw_rgb_input_and_h264_output() {
    let args = encoder_args(
        &sink_cfg(640, 360),
        &EncoderConfig::default(),
        Path::new("out/clip_cartoon.mp4"),
    );
    let args: Vec<String> = args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let joined = args.join(" ");

    assert_eq!(args[0], "-y");
    assert!(joined.contains("-f rawvideo -pix_fmt rgb24 -s 640x360 -r 30000/1001 -i pipe:0"));
    assert!(joined.contains("-an -c:v libx264 -crf 18 -preset fast -pix_fmt yuv420p"));
    assert!(joined.contains("-maxrate 12M -bufsize 24M -movflags +faststart"));
    assert_eq!(args.last().map(String::as_str), Some("out/clip_cartoon.mp4"));
}

#[test]
fn no_overwrite_uses_dash_n() {
    let enc = EncoderConfig {
        overwrite: false,
        ..EncoderConfig::default()
    };
    let args = encoder_args(&sink_cfg(2, 2), &enc, Path::new("o.mp4"));
    assert_eq!(args[0], OsString::from("-n"));
}

#[test]
fn begin_rejects_odd_or_empty_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("o.mp4")));
    assert!(matches!(
        sink.begin(sink_cfg(3, 2)),
        Err(MediaFilterError::Validation(_))
    ));
    assert!(matches!(
        sink.begin(sink_cfg(0, 2)),
        Err(MediaFilterError::Validation(_))
    ));
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("o.mp4");
    std::fs::write(&out, b"keep").unwrap();
    let mut opts = FfmpegSinkOpts::new(&out);
    opts.encoder.overwrite = false;
    let mut sink = FfmpegSink::new(opts);
    assert!(sink.begin(sink_cfg(2, 2)).is_err());
    assert_eq!(std::fs::read(&out).unwrap(), b"keep");
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let f = Frame::new(2, 2);
    assert!(matches!(
        sink.push_frame(&f),
        Err(MediaFilterError::Encode(_))
    ));
    assert!(sink.end().is_err());
}

#[test]
fn abort_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial.mp4");
    std::fs::write(&out, b"half-written").unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.abort();
    assert!(!out.exists());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a/b/c.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}
