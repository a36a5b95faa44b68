//! mediafilter turns photos and videos into sketches or cartoons.
//!
//! - [`ImageJob`] stylizes one still image with no state carried between calls
//! - [`VideoSession`] streams a video through a per-stream [`Session`] into a [`FrameSink`]
//! - [`FilterConfig`] holds every tunable constant and can be loaded from JSON
//!
//! Edge detection adapts its blur and thresholds to each frame's statistics. The cartoon palette
//! is learned by mini-batch k-means with an automatically chosen cluster count and, in video,
//! updated incrementally between periodic retrains.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Tunable parameters.
pub mod config;
/// Encoding sinks.
pub mod encode;
/// Per-frame image operators.
pub mod filters;
/// Image and video jobs.
pub mod job;
/// Source decoding.
pub mod media;
/// Filter renderers.
pub mod render;
/// Per-stream state.
pub mod session;

pub use crate::config::FilterConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path, is_ffprobe_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::foundation::core::{
    Background, EdgeMask, Filter, FilterKind, Fps, Frame, MediaKind, RenderMode,
};
pub use crate::foundation::error::{MediaFilterError, MediaResult};
pub use crate::job::{ImageJob, VideoPlan, VideoSession, VideoStats, output_path, plan};
pub use crate::media::{FfmpegFrameSource, FrameSource, VecFrameSource, VideoInfo};
pub use crate::session::Session;
