use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{FilterConfig, VideoJobConfig};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::filters::scale::{resize_area, scale_side};
use crate::foundation::core::{Filter, Fps, Frame, MediaKind};
use crate::foundation::error::{MediaFilterError, MediaResult};
use crate::job::output::output_path;
use crate::media::video::{FfmpegFrameSource, FrameSource, VideoInfo};
use crate::session::Session;

/// Output geometry and timing derived from a probed source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoPlan {
    /// Source frame size.
    pub source_width: u32,
    /// Source frame size.
    pub source_height: u32,
    /// Encoded frame width (even).
    pub width: u32,
    /// Encoded frame height (even).
    pub height: u32,
    /// Rate the source is read at (probed or fallback).
    pub source_fps: Fps,
    /// Rate the output is encoded at.
    pub output_fps: Fps,
}

impl VideoPlan {
    /// Source frames consumed per emitted frame (>= 1).
    pub fn interval(&self) -> f64 {
        self.source_fps.as_f64() / self.output_fps.as_f64()
    }

    /// `true` when frames must be resampled before rendering.
    pub fn needs_resize(&self) -> bool {
        (self.width, self.height) != (self.source_width, self.source_height)
    }

    fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            width: self.width,
            height: self.height,
            fps: self.output_fps,
        }
    }
}

/// Derive the output plan for `info` under `filter`'s rate cap.
pub fn plan(info: &VideoInfo, filter: Filter, cfg: &VideoJobConfig) -> MediaResult<VideoPlan> {
    if info.width == 0 || info.height == 0 {
        return Err(MediaFilterError::decode("video source has zero-sized frames"));
    }
    let kind = filter.kind();
    let source_fps = match info.fps {
        Some(fps) if fps.num > 0 => fps,
        _ => {
            let fallback = cfg.fallback_fps(kind);
            tracing::warn!(fallback, "source reports no frame rate; assuming fallback");
            Fps::new(fallback, 1)?
        }
    };
    let output_fps = source_fps.capped(cfg.fps_cap(kind));

    let (mut width, mut height) = (info.width, info.height);
    let longest = width.max(height);
    if longest > cfg.max_side {
        width = scale_side(width, cfg.max_side, longest);
        height = scale_side(height, cfg.max_side, longest);
    }
    let plan = VideoPlan {
        source_width: info.width,
        source_height: info.height,
        width: even_down(width),
        height: even_down(height),
        source_fps,
        output_fps,
    };
    tracing::debug!(?plan, "video plan");
    Ok(plan)
}

fn even_down(v: u32) -> u32 {
    (v - v % 2).max(2)
}

/// Decides which source frames are rendered when the output rate is lower than the source rate.
#[derive(Clone, Copy, Debug)]
pub struct FrameScheduler {
    interval: f64,
    next: f64,
    index: u64,
}

impl FrameScheduler {
    /// Schedule one emitted frame per `interval` source frames.
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(1.0),
            next: 0.0,
            index: 0,
        }
    }

    /// Consume one source frame; returns `true` when it should be emitted.
    pub fn admit(&mut self) -> bool {
        let take = self.index as f64 >= self.next;
        if take {
            self.next += self.interval;
        }
        self.index += 1;
        take
    }

    /// Source frames consumed so far.
    pub fn consumed(&self) -> u64 {
        self.index
    }
}

/// Counters reported by [`VideoSession::process`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoStats {
    /// Frames pulled from the source.
    pub frames_decoded: u64,
    /// Frames rendered and pushed to the sink.
    pub frames_written: u64,
}

/// Video stylization job: decode, schedule, render with a fresh [`Session`], encode.
#[derive(Clone, Debug)]
pub struct VideoSession {
    cfg: FilterConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl VideoSession {
    /// Build a job after validating `cfg`.
    pub fn new(cfg: FilterConfig) -> MediaResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg, cancel: None })
    }

    /// Abort between frames once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Stylize the video at `source` into `out_dir`, returning the written path.
    #[tracing::instrument(skip(self, source), fields(source = %source.display()))]
    pub fn run(&self, source: &Path, out_dir: &Path, filter: Filter) -> MediaResult<PathBuf> {
        let mut frames = FfmpegFrameSource::open(source)?;
        let plan = plan(frames.info(), filter, &self.cfg.video)?;
        let out = output_path(source, out_dir, filter, MediaKind::Video);
        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: out.clone(),
            encoder: self.cfg.encoder.clone(),
        });

        let stats = self.process(&mut frames, &mut sink, &plan, filter)?;
        tracing::info!(
            out = %out.display(),
            decoded = stats.frames_decoded,
            written = stats.frames_written,
            fps = %plan.output_fps,
            "video written"
        );
        Ok(out)
    }

    /// Drive `source` through a fresh session into `sink`.
    ///
    /// On any error after the sink has started, the sink is aborted before the error returns.
    pub fn process<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        plan: &VideoPlan,
        filter: Filter,
    ) -> MediaResult<VideoStats>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let first = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                let _ = source.finish();
                return Err(MediaFilterError::decode("video source yielded no frames"));
            }
            Err(e) => {
                let _ = source.finish();
                return Err(e);
            }
        };

        if let Err(e) = sink.begin(plan.sink_config()) {
            sink.abort();
            let _ = source.finish();
            return Err(e);
        }

        let mut session = Session::new(&self.cfg);
        let result = self.stream(first, source, sink, plan, filter, &mut session);
        session.reset();

        match result {
            Ok(stats) => {
                if let Err(e) = source.finish() {
                    sink.abort();
                    return Err(e);
                }
                sink.end()?;
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!(error = %e, "video job failed; aborting encoder");
                sink.abort();
                let _ = source.finish();
                Err(e)
            }
        }
    }

    fn stream<S, K>(
        &self,
        first: Frame,
        source: &mut S,
        sink: &mut K,
        plan: &VideoPlan,
        filter: Filter,
        session: &mut Session,
    ) -> MediaResult<VideoStats>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let mut stats = VideoStats::default();
        let mut scheduler = FrameScheduler::new(plan.interval());
        let mut next = Some(first);

        while let Some(frame) = next {
            if self.is_cancelled() {
                return Err(MediaFilterError::Cancelled);
            }
            stats.frames_decoded += 1;

            if scheduler.admit() {
                let frame = if plan.needs_resize() {
                    resize_area(&frame, plan.width, plan.height)
                } else {
                    frame
                };
                let rendered = session.render(filter, &frame, stats.frames_written)?;
                sink.push_frame(&rendered)?;
                stats.frames_written += 1;
            }
            next = source.next_frame()?;
        }
        Ok(stats)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/video.rs"]
mod tests;
