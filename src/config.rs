//! Tunable constants for every stage of the pipeline.
//!
//! All sections implement `Default` with the values the filters were tuned with, and every field
//! is `#[serde(default)]`, so a JSON override file only needs the fields it changes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{FilterKind, RenderMode};
use crate::foundation::error::{MediaFilterError, MediaResult};

/// Root configuration consumed by renderers and jobs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Shared edge-statistics parameters.
    pub edges: EdgeConfig,
    /// Sketch filter parameters.
    pub sketch: SketchConfig,
    /// Cartoon filter parameters.
    pub cartoon: CartoonConfig,
    /// Temporal edge smoothing (video only).
    pub smoothing: SmoothingConfig,
    /// Palette learning.
    pub palette: PaletteConfig,
    /// Still-image job parameters.
    pub image: ImageJobConfig,
    /// Video job parameters.
    pub video: VideoJobConfig,
    /// External encoder parameters.
    pub encoder: EncoderConfig,
}

impl FilterConfig {
    /// Read a JSON configuration file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: FilterConfig = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config JSON '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Edge profile for a filter family in a given mode.
    pub fn edge_profile(&self, kind: FilterKind, mode: RenderMode) -> EdgeProfile {
        let (image, video) = match kind {
            FilterKind::Sketch => (self.sketch.image, self.sketch.video),
            FilterKind::Cartoon => (self.cartoon.image, self.cartoon.video),
        };
        match mode {
            RenderMode::Still => image,
            RenderMode::Video => video,
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> MediaResult<()> {
        let e = &self.edges;
        if !(e.lower_ratio >= 0.0 && e.lower_ratio < e.upper_ratio) {
            return Err(MediaFilterError::validation(
                "edges.lower_ratio must be >= 0 and < edges.upper_ratio",
            ));
        }
        if e.fallback_increment == 0 {
            return Err(MediaFilterError::validation(
                "edges.fallback_increment must be > 0",
            ));
        }
        if !(e.sigma.base > 0.0 && e.sigma.medium_mult > 0.0 && e.sigma.high_mult > 0.0) {
            return Err(MediaFilterError::validation(
                "edges.sigma base and multipliers must be > 0",
            ));
        }
        for p in [
            self.sketch.image,
            self.sketch.video,
            self.cartoon.image,
            self.cartoon.video,
        ] {
            if !(p.lower_scale > 0.0 && p.upper_scale > 0.0) {
                return Err(MediaFilterError::validation(
                    "edge profile threshold scales must be > 0",
                ));
            }
        }
        if !(0.0..1.0).contains(&self.cartoon.darken_factor) {
            return Err(MediaFilterError::validation(
                "cartoon.darken_factor must be in [0, 1)",
            ));
        }
        if self.cartoon.dilate_size == 0 {
            return Err(MediaFilterError::validation(
                "cartoon.dilate_size must be > 0",
            ));
        }
        let s = &self.smoothing;
        if s.history_len == 0 {
            return Err(MediaFilterError::validation(
                "smoothing.history_len must be > 0",
            ));
        }
        if !(0.0 <= s.min_weight && s.min_weight <= s.max_weight && s.max_weight <= 1.0) {
            return Err(MediaFilterError::validation(
                "smoothing weights must satisfy 0 <= min_weight <= max_weight <= 1",
            ));
        }
        let p = &self.palette;
        if p.retrain_interval == 0 || p.sample_size == 0 || p.k_step == 0 {
            return Err(MediaFilterError::validation(
                "palette.retrain_interval, sample_size and k_step must be > 0",
            ));
        }
        if p.batch_size_image == 0 || p.batch_size_video == 0 || p.max_iter == 0 {
            return Err(MediaFilterError::validation(
                "palette batch sizes and max_iter must be > 0",
            ));
        }
        if !(p.bilateral.sigma_color > 0.0 && p.bilateral.sigma_space > 0.0) {
            return Err(MediaFilterError::validation(
                "palette.bilateral sigmas must be > 0",
            ));
        }
        if self.image.max_side == 0 || self.video.max_side < 2 {
            return Err(MediaFilterError::validation(
                "image.max_side must be > 0 and video.max_side >= 2",
            ));
        }
        let v = &self.video;
        if v.sketch_fps_cap == 0
            || v.cartoon_fps_cap == 0
            || v.sketch_fallback_fps == 0
            || v.cartoon_fallback_fps == 0
        {
            return Err(MediaFilterError::validation(
                "video fps caps and fallbacks must be > 0",
            ));
        }
        if self.encoder.codec.is_empty() || self.encoder.pix_fmt.is_empty() {
            return Err(MediaFilterError::validation(
                "encoder.codec and encoder.pix_fmt must be set",
            ));
        }
        Ok(())
    }
}

/// Gradient-threshold and blur-sigma statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Lower hysteresis threshold as a fraction of the median gradient magnitude.
    pub lower_ratio: f64,
    /// Upper hysteresis threshold as a fraction of the median gradient magnitude.
    pub upper_ratio: f64,
    /// Added to `lower` when the computed pair collapses.
    pub fallback_increment: u8,
    /// Smallest Gaussian kernel size; requested sizes are forced odd and at least this.
    pub min_kernel: u32,
    /// Sharpness tiers for the pre-blur sigma.
    pub sigma: SigmaConfig,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            lower_ratio: 0.66,
            upper_ratio: 1.33,
            fallback_increment: 20,
            min_kernel: 3,
            sigma: SigmaConfig::default(),
        }
    }
}

/// Three-tier sigma policy keyed on Laplacian variance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmaConfig {
    /// Sigma for soft sources.
    pub base: f32,
    /// Sharpness above which `medium_mult` applies.
    pub medium_threshold: f64,
    /// Multiplier for the medium tier.
    pub medium_mult: f32,
    /// Sharpness above which `high_mult` applies.
    pub high_threshold: f64,
    /// Multiplier for the high tier.
    pub high_mult: f32,
}

impl Default for SigmaConfig {
    fn default() -> Self {
        Self {
            base: 1.5,
            medium_threshold: 200.0,
            medium_mult: 1.5,
            high_threshold: 500.0,
            high_mult: 2.5,
        }
    }
}

/// Per-filter, per-mode edge extraction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeProfile {
    /// Gaussian kernel size before edge extraction.
    pub kernel_size: u32,
    /// Multiplier applied to the lower threshold ratio.
    pub lower_scale: f64,
    /// Multiplier applied to the upper threshold ratio.
    pub upper_scale: f64,
}

impl Default for EdgeProfile {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            lower_scale: 1.0,
            upper_scale: 1.0,
        }
    }
}

/// Sketch filter parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Edge profile for still images.
    pub image: EdgeProfile,
    /// Edge profile for video frames.
    pub video: EdgeProfile,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            image: EdgeProfile::default(),
            video: EdgeProfile {
                kernel_size: 5,
                lower_scale: 1.0,
                upper_scale: 1.1,
            },
        }
    }
}

/// Cartoon filter parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartoonConfig {
    /// Edge profile for still images.
    pub image: EdgeProfile,
    /// Edge profile for video frames.
    pub video: EdgeProfile,
    /// Side of the square dilation element used to thicken outlines.
    pub dilate_size: u32,
    /// Channel multiplier applied at edge pixels; must be in `[0, 1)`.
    pub darken_factor: f32,
}

impl Default for CartoonConfig {
    fn default() -> Self {
        Self {
            image: EdgeProfile {
                kernel_size: 3,
                lower_scale: 1.2,
                upper_scale: 1.2,
            },
            video: EdgeProfile {
                kernel_size: 5,
                lower_scale: 1.5,
                upper_scale: 1.5,
            },
            dilate_size: 2,
            darken_factor: 0.2,
        }
    }
}

/// Motion-adaptive edge history blending.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of masks kept in the history.
    pub history_len: usize,
    /// Weight of the newest mask when nothing moves.
    pub min_weight: f32,
    /// Weight of the newest mask when everything moves.
    pub max_weight: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            history_len: 2,
            min_weight: 0.4,
            max_weight: 0.9,
        }
    }
}

/// Edge-preserving smoothing applied before clustering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BilateralConfig {
    /// Neighbourhood diameter in pixels.
    pub diameter: u32,
    /// Color-distance falloff.
    pub sigma_color: f32,
    /// Spatial-distance falloff.
    pub sigma_space: f32,
}

impl Default for BilateralConfig {
    fn default() -> Self {
        Self {
            diameter: 9,
            sigma_color: 150.0,
            sigma_space: 75.0,
        }
    }
}

/// Palette learning parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Video frames between full retrains.
    pub retrain_interval: u64,
    /// Maximum number of pixels sampled for k selection and incremental updates.
    pub sample_size: usize,
    /// Step between candidate cluster counts.
    pub k_step: usize,
    /// Mini-batch size when fitting still images.
    pub batch_size_image: usize,
    /// Mini-batch size when fitting video frames.
    pub batch_size_video: usize,
    /// Maximum mini-batch steps per fit.
    pub max_iter: usize,
    /// Early-stop threshold on total squared centroid movement.
    pub tol: f32,
    /// Seed for sampling and centroid initialization.
    pub seed: u64,
    /// Pre-clustering smoothing.
    pub bilateral: BilateralConfig,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            retrain_interval: 15,
            sample_size: 10_000,
            k_step: 2,
            batch_size_image: 2048,
            batch_size_video: 1024,
            max_iter: 100,
            tol: 1e-3,
            seed: 0,
            bilateral: BilateralConfig::default(),
        }
    }
}

/// Still-image job parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageJobConfig {
    /// Largest allowed side before downscaling.
    pub max_side: u32,
}

impl Default for ImageJobConfig {
    fn default() -> Self {
        Self { max_side: 1024 }
    }
}

/// Video job parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoJobConfig {
    /// Largest allowed output side before downscaling.
    pub max_side: u32,
    /// Output frame-rate cap for sketch.
    pub sketch_fps_cap: u32,
    /// Output frame-rate cap for cartoon.
    pub cartoon_fps_cap: u32,
    /// Source rate assumed for sketch when the probe reports none.
    pub sketch_fallback_fps: u32,
    /// Source rate assumed for cartoon when the probe reports none.
    pub cartoon_fallback_fps: u32,
}

impl VideoJobConfig {
    /// Output frame-rate cap for a filter family.
    pub fn fps_cap(&self, kind: FilterKind) -> u32 {
        match kind {
            FilterKind::Sketch => self.sketch_fps_cap,
            FilterKind::Cartoon => self.cartoon_fps_cap,
        }
    }

    /// Fallback source frame rate for a filter family.
    pub fn fallback_fps(&self, kind: FilterKind) -> u32 {
        match kind {
            FilterKind::Sketch => self.sketch_fallback_fps,
            FilterKind::Cartoon => self.cartoon_fallback_fps,
        }
    }
}

impl Default for VideoJobConfig {
    fn default() -> Self {
        Self {
            max_side: 1280,
            sketch_fps_cap: 30,
            cartoon_fps_cap: 22,
            sketch_fallback_fps: 30,
            cartoon_fallback_fps: 22,
        }
    }
}

/// External encoder parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Video codec passed to `-c:v`.
    pub codec: String,
    /// Constant rate factor; lower is higher quality.
    pub crf: u8,
    /// Encoder speed preset.
    pub preset: String,
    /// Output pixel format.
    pub pix_fmt: String,
    /// Rate-control ceiling passed to `-maxrate`.
    pub max_bitrate: String,
    /// Rate-control buffer passed to `-bufsize`.
    pub buffer_size: String,
    /// Overwrite an existing output file.
    pub overwrite: bool,
    /// Upper bound on waiting for the encoder to exit; `None` waits indefinitely.
    pub exit_timeout_secs: Option<u64>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            crf: 18,
            preset: "fast".to_string(),
            pix_fmt: "yuv420p".to_string(),
            max_bitrate: "12M".to_string(),
            buffer_size: "24M".to_string(),
            overwrite: true,
            exit_timeout_secs: Some(600),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
