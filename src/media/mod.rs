//! Source decoding: still images through `image`, video through system `ffprobe`/`ffmpeg`.

/// Still image read and write.
pub mod still;
/// Video probing and frame streaming.
pub mod video;

pub use still::{decode_image, write_image};
pub use video::{FfmpegFrameSource, FrameSource, VecFrameSource, VideoInfo, probe_video};
