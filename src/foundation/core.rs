use std::fmt;
use std::path::Path;

use crate::foundation::error::{MediaFilterError, MediaResult};

/// A decoded color frame: row-major, tightly packed RGB8.
pub type Frame = image::RgbImage;

/// A binary edge mask with the same dimensions as its source frame. Pixels are 0 or 255.
pub type EdgeMask = image::GrayImage;

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> MediaResult<Self> {
        if den == 0 {
            return Err(MediaFilterError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MediaFilterError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Return the slower of `self` and an integral `cap`.
    pub fn capped(self, cap: u32) -> Self {
        if cap == 0 || self.as_f64() <= f64::from(cap) {
            self
        } else {
            Self { num: cap, den: 1 }
        }
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Solid background behind sketch line art.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Background {
    /// Every channel at full intensity.
    White,
    /// Every channel at zero.
    Black,
}

impl Background {
    /// Channel value used to fill the background.
    pub fn fill_value(self) -> u8 {
        match self {
            Background::White => u8::MAX,
            Background::Black => 0,
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Background::White => "White",
            Background::Black => "Black",
        })
    }
}

/// Which stylization family a job uses, without its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FilterKind {
    /// Line art over a flat background.
    Sketch,
    /// Posterized regions with inked outlines.
    Cartoon,
}

impl FilterKind {
    /// Lowercase name used in output file names.
    pub fn as_lower_str(self) -> &'static str {
        match self {
            FilterKind::Sketch => "sketch",
            FilterKind::Cartoon => "cartoon",
        }
    }
}

/// A fully specified stylization: the sketch variant carries its background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Edges copied from the source over a solid background.
    Sketch(Background),
    /// Quantized palette with darkened outlines.
    Cartoon,
}

impl Filter {
    /// The filter family.
    pub fn kind(self) -> FilterKind {
        match self {
            Filter::Sketch(_) => FilterKind::Sketch,
            Filter::Cartoon => FilterKind::Cartoon,
        }
    }

    /// Background used by the sketch variant.
    pub fn background(self) -> Option<Background> {
        match self {
            Filter::Sketch(bg) => Some(bg),
            Filter::Cartoon => None,
        }
    }
}

/// Whether a frame is rendered on its own or as part of a video session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Single image: clustering and smoothing start cold.
    Still,
    /// One frame of a stream: session state carries across frames.
    Video,
}

impl RenderMode {
    /// `true` for [`RenderMode::Video`].
    pub fn is_video(self) -> bool {
        matches!(self, RenderMode::Video)
    }
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "mkv", "avi", "webm"];

/// Kind of source media, detected from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// A still raster image.
    Image,
    /// A video container.
    Video,
}

impl MediaKind {
    /// Classify `path` by extension (case-insensitive). Unknown extensions are treated as images.
    pub fn from_path(path: &Path) -> Self {
        let is_video = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()));
        if is_video {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
