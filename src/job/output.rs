use std::path::{Path, PathBuf};

use crate::foundation::core::{Filter, MediaKind};

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Destination path: `<out_dir>/<stem>_<filter>[_<Background>].<ext>`.
///
/// Images keep their extension when it is a writable raster format and fall back to `png`;
/// video output is always `mp4`.
pub fn output_path(source: &Path, out_dir: &Path, filter: Filter, kind: MediaKind) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let mut name = format!("{stem}_{}", filter.kind().as_lower_str());
    if let Some(bg) = filter.background() {
        name.push('_');
        name.push_str(&bg.to_string());
    }

    let ext = match kind {
        MediaKind::Video => "mp4".to_string(),
        MediaKind::Image => source
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| RASTER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| "png".to_string()),
    };
    name.push('.');
    name.push_str(&ext);
    out_dir.join(name)
}

#[cfg(test)]
#[path = "../../tests/unit/job/output.rs"]
mod tests;
