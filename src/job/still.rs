use std::path::{Path, PathBuf};

use crate::config::FilterConfig;
use crate::filters::scale::normalize;
use crate::foundation::core::{Filter, Frame, MediaKind};
use crate::foundation::error::MediaResult;
use crate::job::output::output_path;
use crate::media::still::{decode_image, write_image};
use crate::render::render_still;

/// Single-image stylization. Holds no state between runs.
#[derive(Clone, Debug)]
pub struct ImageJob {
    cfg: FilterConfig,
}

impl ImageJob {
    /// Build a job after validating `cfg`.
    pub fn new(cfg: FilterConfig) -> MediaResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Decode `source`, stylize it and write the result into `out_dir`.
    #[tracing::instrument(skip(self, source), fields(source = %source.display()))]
    pub fn run(&self, source: &Path, out_dir: &Path, filter: Filter) -> MediaResult<PathBuf> {
        let frame = decode_image(source)?;
        let rendered = self.render(&frame, filter)?;
        let out = output_path(source, out_dir, filter, MediaKind::Image);
        write_image(&rendered, &out)?;
        tracing::info!(
            out = %out.display(),
            width = rendered.width(),
            height = rendered.height(),
            "image written"
        );
        Ok(out)
    }

    /// Bound the frame size and render it in still mode.
    pub fn render(&self, frame: &Frame, filter: Filter) -> MediaResult<Frame> {
        let frame = normalize(frame, self.cfg.image.max_side);
        render_still(&self.cfg, filter, &frame)
    }
}
