//! Per-stream mutable state.
//!
//! A [`Session`] owns the edge history and the palette model for exactly one video. It is not
//! `Clone`, and renderers only ever see it through `&mut`, so two streams can never share either.

use crate::config::FilterConfig;
use crate::filters::palette::PaletteQuantizer;
use crate::filters::temporal::TemporalSmoother;
use crate::foundation::core::{Filter, Frame, RenderMode};
use crate::foundation::error::MediaResult;
use crate::render::{CartoonRenderer, SketchRenderer};

/// Stateful video renderer: one smoother and one quantizer, both empty until the first frame.
#[derive(Debug)]
pub struct Session {
    cfg: FilterConfig,
    smoother: TemporalSmoother,
    quantizer: PaletteQuantizer,
}

impl Session {
    /// Build a fresh session.
    pub fn new(cfg: &FilterConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            smoother: TemporalSmoother::new(&cfg.smoothing),
            quantizer: PaletteQuantizer::new(&cfg.palette),
        }
    }

    /// Render frame `frame_index` of the stream in video mode.
    pub fn render(&mut self, filter: Filter, frame: &Frame, frame_index: u64) -> MediaResult<Frame> {
        match filter {
            Filter::Sketch(bg) => SketchRenderer::new(&self.cfg).render(
                frame,
                bg,
                RenderMode::Video,
                Some(&mut self.smoother),
            ),
            Filter::Cartoon => CartoonRenderer::new(&self.cfg).render(
                frame,
                &mut self.quantizer,
                frame_index,
                RenderMode::Video,
                Some(&mut self.smoother),
            ),
        }
    }

    /// Clear edge history and palette.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.quantizer.reset();
    }

    /// Edge history accumulated so far.
    pub fn smoother(&self) -> &TemporalSmoother {
        &self.smoother
    }

    /// Palette state accumulated so far.
    pub fn quantizer(&self) -> &PaletteQuantizer {
        &self.quantizer
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
