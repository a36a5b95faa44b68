use crate::foundation::core::{Fps, Frame};
use crate::foundation::error::{MediaFilterError, MediaResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames in stream order.
///
/// A sink sees `begin`, any number of `push_frame` calls, then exactly one of `end` (success) or
/// `abort` (the job failed or was cancelled).
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MediaResult<()>;
    /// Push one frame; its size must match the configured size.
    fn push_frame(&mut self, frame: &Frame) -> MediaResult<()>;
    /// Finish the stream and report whether the output is complete.
    fn end(&mut self) -> MediaResult<()>;
    /// Tear down after a failure, discarding any partial output. Never fails.
    fn abort(&mut self);
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Frame>,
    ended: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// `true` once `end` succeeded.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// `true` once `abort` was called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MediaResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> MediaResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MediaFilterError::encode("in-memory sink not started"))?;
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(MediaFilterError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> MediaResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.frames.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
