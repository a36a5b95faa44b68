//! Encoding sinks.
//!
//! Sinks consume rendered frames in stream order and are driven by `VideoSession::process`.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
