//! End-to-end jobs: one source file in, one stylized file out.

/// Output file naming.
pub mod output;
/// Still-image jobs.
pub mod still;
/// Video sessions.
pub mod video;

pub use self::output::output_path;
pub use self::still::ImageJob;
pub use self::video::{FrameScheduler, VideoPlan, VideoSession, VideoStats, plan};
