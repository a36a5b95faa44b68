use std::collections::VecDeque;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::{MediaFilterError, MediaResult};

/// Geometry and nominal rate of a video stream.
///
/// Sizes are display sizes: a stream stored with a quarter-turn rotation reports its coded
/// width and height swapped, matching the upright frames the decoder emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Nominal frame rate; `None` when the container does not report one.
    pub fps: Option<Fps>,
}

/// Pull-based stream of decoded frames.
pub trait FrameSource {
    /// Stream geometry and rate.
    fn info(&self) -> &VideoInfo;
    /// Next frame in presentation order, or `None` at end of stream.
    fn next_frame(&mut self) -> MediaResult<Option<Frame>>;
    /// Release decoder resources. Frames left unread are discarded.
    fn finish(&mut self) -> MediaResult<()>;
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Default, serde::Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    /// Display rotation in degrees, normalized to `[0, 360)`.
    fn rotation(&self) -> u32 {
        let degrees = self
            .side_data_list
            .iter()
            .find_map(|d| d.rotation)
            .or_else(|| {
                self.tags
                    .rotate
                    .as_deref()
                    .and_then(|r| r.trim().parse::<f64>().ok())
            })
            .unwrap_or(0.0);
        (degrees.round() as i64).rem_euclid(360) as u32
    }
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
}

/// Probe the first video stream of `source_path` through `ffprobe`.
pub fn probe_video(source_path: &Path) -> MediaResult<VideoInfo> {
    if !source_path.is_file() {
        return Err(MediaFilterError::decode(format!(
            "video source '{}' does not exist",
            source_path.display()
        )));
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| MediaFilterError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(MediaFilterError::decode(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe(&out.stdout)
}

fn parse_probe(json: &[u8]) -> MediaResult<VideoInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| MediaFilterError::decode(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaFilterError::decode("no video stream found"))?;
    let width = stream
        .width
        .filter(|&w| w > 0)
        .ok_or_else(|| MediaFilterError::decode("missing video width from ffprobe"))?;
    let height = stream
        .height
        .filter(|&h| h > 0)
        .ok_or_else(|| MediaFilterError::decode("missing video height from ffprobe"))?;
    let (width, height) = match stream.rotation() {
        90 | 270 => (height, width),
        _ => (width, height),
    };
    let fps = [&stream.avg_frame_rate, &stream.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|r| parse_ff_ratio(r).and_then(|(n, d)| Fps::new(n, d).ok()));

    Ok(VideoInfo { width, height, fps })
}

/// Parse an ffmpeg rational such as `30000/1001`.
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.trim().parse::<u32>().ok()?;
    let b = match parts.next() {
        Some(b) => b.trim().parse::<u32>().ok()?,
        None => 1,
    };
    if b == 0 {
        return None;
    }
    Some((a, b))
}

/// Frames streamed as raw `rgb24` from an `ffmpeg` child process.
pub struct FfmpegFrameSource {
    path: PathBuf,
    info: VideoInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
    eof: bool,
}

impl FfmpegFrameSource {
    /// Probe `path` and start decoding. Frames come out upright when the stream carries a
    /// display rotation.
    pub fn open(path: &Path) -> MediaResult<Self> {
        let info = probe_video(path)?;
        let frame_len = info.width as usize * info.height as usize * 3;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-an", "-sn", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MediaFilterError::decode(format!("failed to spawn ffmpeg decoder: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaFilterError::decode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaFilterError::decode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            path: path.to_path_buf(),
            info,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            frame_len,
            eof: false,
        })
    }

    fn stderr_text(&mut self) -> String {
        match self.stderr_drain.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_string(),
            _ => String::new(),
        }
    }
}

impl FrameSource for FfmpegFrameSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
        if self.eof {
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0;
        while filled < buf.len() {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(MediaFilterError::decode(format!(
                        "failed to read frame from ffmpeg: {e}"
                    )));
                }
            }
        }
        if filled == 0 {
            self.eof = true;
            return Ok(None);
        }
        if filled < buf.len() {
            self.eof = true;
            return Err(MediaFilterError::decode(format!(
                "truncated frame from '{}': got {filled} of {} bytes",
                self.path.display(),
                buf.len()
            )));
        }

        Frame::from_raw(self.info.width, self.info.height, buf)
            .map(Some)
            .ok_or_else(|| MediaFilterError::decode("decoded frame buffer size mismatch"))
    }

    fn finish(&mut self) -> MediaResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if !self.eof {
            let _ = child.kill();
            let _ = child.wait();
            let _ = self.stderr_text();
            return Ok(());
        }

        let status = child
            .wait()
            .map_err(|e| MediaFilterError::decode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = self.stderr_text();
        if !status.success() {
            return Err(MediaFilterError::decode(format!(
                "ffmpeg decoder exited with status {status} for '{}': {stderr}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// In-memory frame source for tests and synthetic streams.
#[derive(Debug)]
pub struct VecFrameSource {
    info: VideoInfo,
    frames: VecDeque<Frame>,
}

impl VecFrameSource {
    /// Wrap prepared frames; every frame must match `info`'s size.
    pub fn new(info: VideoInfo, frames: Vec<Frame>) -> Self {
        Self {
            info,
            frames: frames.into(),
        }
    }

    /// Frames not yet pulled.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for VecFrameSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }

    fn finish(&mut self) -> MediaResult<()> {
        self.frames.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/video.rs"]
mod tests;
