use std::ffi::OsString;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::EncoderConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::Frame;
use crate::foundation::error::{MediaFilterError, MediaResult};

const EXIT_POLL: Duration = Duration::from_millis(20);

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Codec, rate control and process settings.
    pub encoder: EncoderConfig,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path` with default encoder settings.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            encoder: EncoderConfig::default(),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw `rgb24` frames to its stdin.
///
/// Output never carries audio. A failed or aborted stream removes whatever `ffmpeg` wrote.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
        }
    }

    /// Destination file.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn join_stderr(&mut self) -> Vec<u8> {
        match self.stderr_drain.take() {
            Some(handle) => match handle.join() {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => format!("<stderr read failed: {e}>").into_bytes(),
                Err(_) => b"<stderr drain thread panicked>".to_vec(),
            },
            None => Vec::new(),
        }
    }

    fn wait_bounded(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let Some(secs) = self.opts.encoder.exit_timeout_secs else {
            return child.wait().map_err(|e| {
                MediaFilterError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
            });
        };
        let deadline = Instant::now() + Duration::from_secs(secs);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(MediaFilterError::encode(format!(
                        "ffmpeg did not exit within {secs}s and was killed"
                    )));
                }
                Ok(None) => std::thread::sleep(EXIT_POLL),
                Err(e) => {
                    return Err(MediaFilterError::encode(format!(
                        "failed to poll ffmpeg exit status: {e}"
                    )));
                }
            }
        }
    }

    fn remove_partial_output(&self) {
        let path = &self.opts.out_path;
        if path.exists() {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output")
                }
            }
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> MediaResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(MediaFilterError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(MediaFilterError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(MediaFilterError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.encoder.overwrite && self.opts.out_path.exists() {
            return Err(MediaFilterError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(MediaFilterError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(encoder_args(&cfg, &self.opts.encoder, &self.opts.out_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                MediaFilterError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaFilterError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaFilterError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = %cfg.fps,
            out = %self.opts.out_path.display(),
            "ffmpeg encoder started"
        );
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> MediaResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| MediaFilterError::encode("ffmpeg sink not started"))?;
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(MediaFilterError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(MediaFilterError::encode("ffmpeg sink is already finalized"));
        };
        stdin.write_all(frame.as_raw()).map_err(|e| {
            MediaFilterError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> MediaResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| MediaFilterError::encode("ffmpeg sink not started"))?;
        self.cfg = None;

        let waited = self.wait_bounded(&mut child);
        let stderr_bytes = self.join_stderr();
        let status = match waited {
            Ok(status) => status,
            Err(e) => {
                self.remove_partial_output();
                return Err(e);
            }
        };

        if !status.success() {
            self.remove_partial_output();
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(MediaFilterError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_stderr();
        self.cfg = None;
        self.remove_partial_output();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// Full `ffmpeg` argument list for a raw `rgb24` stream on stdin.
pub fn encoder_args(cfg: &SinkConfig, enc: &EncoderConfig, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(OsString::from(s));

    push(if enc.overwrite { "-y" } else { "-n" });
    for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s"] {
        push(a);
    }
    push(&format!("{}x{}", cfg.width, cfg.height));
    // For rawvideo input, `-r` before `-i` sets the input frame rate.
    push("-r");
    push(&cfg.fps.to_string());
    for a in ["-i", "pipe:0", "-an", "-c:v"] {
        push(a);
    }
    push(&enc.codec);
    push("-crf");
    push(&enc.crf.to_string());
    push("-preset");
    push(&enc.preset);
    push("-pix_fmt");
    push(&enc.pix_fmt);
    push("-maxrate");
    push(&enc.max_bitrate);
    push("-bufsize");
    push(&enc.buffer_size);
    push("-movflags");
    push("+faststart");
    args.push(out.as_os_str().to_owned());
    args
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MediaResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    probe_tool("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    probe_tool("ffprobe")
}

fn probe_tool(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
