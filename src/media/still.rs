use std::path::Path;

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::core::Frame;
use crate::foundation::error::{MediaFilterError, MediaResult};

/// Decode a still image from disk into an RGB frame. Alpha is dropped.
pub fn decode_image(path: &Path) -> MediaResult<Frame> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| MediaFilterError::decode(format!("open '{}': {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| MediaFilterError::decode(format!("sniff '{}': {e}", path.display())))?;
    let img = reader
        .decode()
        .map_err(|e| MediaFilterError::decode(format!("decode '{}': {e}", path.display())))?;
    let frame = img.into_rgb8();
    if frame.width() == 0 || frame.height() == 0 {
        return Err(MediaFilterError::decode(format!(
            "'{}' has no pixels",
            path.display()
        )));
    }
    Ok(frame)
}

/// Write `frame` to `path`; the format follows the extension.
pub fn write_image(frame: &Frame, path: &Path) -> MediaResult<()> {
    ensure_parent_dir(path)?;
    frame
        .save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/media/still.rs"]
mod tests;
