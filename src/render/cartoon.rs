use crate::config::FilterConfig;
use crate::filters::edges::{EdgeField, dilate, to_gray};
use crate::filters::palette::PaletteQuantizer;
use crate::filters::temporal::TemporalSmoother;
use crate::foundation::core::{FilterKind, Frame, RenderMode};
use crate::foundation::error::MediaResult;

/// Posterizing renderer: a learned palette with darkened, thickened outlines.
#[derive(Clone, Copy, Debug)]
pub struct CartoonRenderer<'a> {
    cfg: &'a FilterConfig,
}

impl<'a> CartoonRenderer<'a> {
    /// Create a renderer over shared configuration.
    pub fn new(cfg: &'a FilterConfig) -> Self {
        Self { cfg }
    }

    /// Render one frame, learning or updating the palette held by `quantizer`.
    pub fn render(
        &self,
        frame: &Frame,
        quantizer: &mut PaletteQuantizer,
        frame_index: u64,
        mode: RenderMode,
        smoother: Option<&mut TemporalSmoother>,
    ) -> MediaResult<Frame> {
        let mut out = quantizer.quantize(frame, frame_index, mode)?;

        // Outlines come from the unsmoothed source so they stay crisp.
        let profile = self.cfg.edge_profile(FilterKind::Cartoon, mode);
        let gray = to_gray(frame);
        let edges = EdgeField::new(&self.cfg.edges).detect(&gray, &profile)?;
        let mut mask = dilate(&edges, self.cfg.cartoon.dilate_size);
        if let Some(smoother) = smoother {
            mask = smoother.smooth(mask);
        }

        let darken = self.cfg.cartoon.darken_factor;
        for (px, m) in out.pixels_mut().zip(mask.pixels()) {
            if m.0[0] != 0 {
                for c in px.0.iter_mut() {
                    *c = (f32::from(*c) * darken).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cartoon.rs"]
mod tests;
