use image::Rgb;

use crate::config::FilterConfig;
use crate::filters::edges::{EdgeField, to_gray};
use crate::filters::temporal::TemporalSmoother;
use crate::foundation::core::{Background, FilterKind, Frame, RenderMode};
use crate::foundation::error::MediaResult;

/// Line-art renderer: source colors along detected edges over a flat background.
#[derive(Clone, Copy, Debug)]
pub struct SketchRenderer<'a> {
    cfg: &'a FilterConfig,
}

impl<'a> SketchRenderer<'a> {
    /// Create a renderer over shared configuration.
    pub fn new(cfg: &'a FilterConfig) -> Self {
        Self { cfg }
    }

    /// Render one frame.
    ///
    /// `smoother` is only passed for video frames; it stabilizes the mask across the session.
    pub fn render(
        &self,
        frame: &Frame,
        background: Background,
        mode: RenderMode,
        smoother: Option<&mut TemporalSmoother>,
    ) -> MediaResult<Frame> {
        let profile = self.cfg.edge_profile(FilterKind::Sketch, mode);
        let gray = to_gray(frame);
        let mut mask = EdgeField::new(&self.cfg.edges).detect(&gray, &profile)?;
        if let Some(smoother) = smoother {
            mask = smoother.smooth(mask);
        }

        let fill = background.fill_value();
        let (w, h) = frame.dimensions();
        let mut out = Frame::from_pixel(w, h, Rgb([fill; 3]));
        for ((dst, src), m) in out.pixels_mut().zip(frame.pixels()).zip(mask.pixels()) {
            if m.0[0] != 0 {
                *dst = *src;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sketch.rs"]
mod tests;
