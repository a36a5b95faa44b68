//! Frame renderers for each filter family.

/// Posterized palette with inked outlines.
pub mod cartoon;
/// Line art over a flat background.
pub mod sketch;

use crate::config::FilterConfig;
use crate::filters::palette::PaletteQuantizer;
use crate::foundation::core::{Filter, Frame, RenderMode};
use crate::foundation::error::MediaResult;

pub use cartoon::CartoonRenderer;
pub use sketch::SketchRenderer;

/// Render a single still frame. Every call starts from a cold palette and no edge history.
pub fn render_still(cfg: &FilterConfig, filter: Filter, frame: &Frame) -> MediaResult<Frame> {
    match filter {
        Filter::Sketch(bg) => SketchRenderer::new(cfg).render(frame, bg, RenderMode::Still, None),
        Filter::Cartoon => {
            let mut quantizer = PaletteQuantizer::new(&cfg.palette);
            CartoonRenderer::new(cfg).render(frame, &mut quantizer, 0, RenderMode::Still, None)
        }
    }
}
