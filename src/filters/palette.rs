//! Session-scoped palette learning.
//!
//! A retrain picks the cluster count from the frame's chromatic complexity and the elbow of the
//! inertia curve; between retrains (video only) the learned centroids drift toward each new
//! frame through single mini-batch steps.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use rayon::prelude::*;

use crate::config::PaletteConfig;
use crate::filters::blur::bilateral_filter;
use crate::filters::kmeans::{ClusterModel, Color, KMeansParams};
use crate::filters::knee::find_knee;
use crate::foundation::core::{Frame, RenderMode};
use crate::foundation::error::{MediaFilterError, MediaResult};

const KNEE_SENSITIVITY: f64 = 1.0;

/// Inclusive search range for the cluster count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KRange {
    /// Smallest candidate k.
    pub min: usize,
    /// Largest candidate k.
    pub max: usize,
}

/// Incremental color-clustering model mapping every pixel to its nearest learned color.
#[derive(Debug)]
pub struct PaletteQuantizer {
    cfg: PaletteConfig,
    model: Option<ClusterModel>,
    rng: StdRng,
    last_range: Option<KRange>,
}

impl PaletteQuantizer {
    /// Create a quantizer with no learned model.
    pub fn new(cfg: &PaletteConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            model: None,
            rng: StdRng::seed_from_u64(cfg.seed),
            last_range: None,
        }
    }

    /// Forget the learned model and reseed sampling.
    pub fn reset(&mut self) {
        self.model = None;
        self.last_range = None;
        self.rng = StdRng::seed_from_u64(self.cfg.seed);
    }

    /// Cluster count of the current model.
    pub fn cluster_count(&self) -> Option<usize> {
        self.model.as_ref().map(ClusterModel::k)
    }

    /// Search range used by the most recent retrain.
    pub fn last_k_range(&self) -> Option<KRange> {
        self.last_range
    }

    /// Read-only view of the learned model.
    pub fn model(&self) -> Option<&ClusterModel> {
        self.model.as_ref()
    }

    /// Smooth, learn and map `frame` onto at most k colors.
    pub fn quantize(
        &mut self,
        frame: &Frame,
        frame_index: u64,
        mode: RenderMode,
    ) -> MediaResult<Frame> {
        let smoothed = bilateral_filter(frame, &self.cfg.bilateral)?;
        let pixels: Vec<Color> = smoothed
            .pixels()
            .map(|p| [f32::from(p.0[0]), f32::from(p.0[1]), f32::from(p.0[2])])
            .collect();
        if pixels.is_empty() {
            return Ok(smoothed);
        }

        let params = self.kmeans_params(mode);
        let retrain = self.model.is_none()
            || !mode.is_video()
            || frame_index % self.cfg.retrain_interval.max(1) == 0;
        if retrain {
            self.retrain(&pixels, &params)?;
        } else {
            let sample = sample_colors(&mut self.rng, &pixels, self.cfg.sample_size);
            if let Some(model) = self.model.as_mut() {
                model.partial_fit(&sample);
            }
        }

        let model = self
            .model
            .as_ref()
            .ok_or_else(|| MediaFilterError::validation("palette model missing after training"))?;
        let palette: Vec<[u8; 3]> = model
            .centroids()
            .iter()
            .map(|c| c.map(|v| v.round().clamp(0.0, 255.0) as u8))
            .collect();

        let (w, h) = smoothed.dimensions();
        let mut out = vec![0u8; pixels.len() * 3];
        out.par_chunks_mut(3)
            .zip(pixels.par_iter())
            .for_each(|(dst, p)| dst.copy_from_slice(&palette[model.predict(p)]));
        Frame::from_raw(w, h, out)
            .ok_or_else(|| MediaFilterError::validation("quantized buffer size mismatch"))
    }

    fn kmeans_params(&self, mode: RenderMode) -> KMeansParams {
        KMeansParams {
            batch_size: match mode {
                RenderMode::Still => self.cfg.batch_size_image,
                RenderMode::Video => self.cfg.batch_size_video,
            },
            max_iter: self.cfg.max_iter,
            tol: self.cfg.tol,
        }
    }

    fn retrain(&mut self, pixels: &[Color], params: &KMeansParams) -> MediaResult<()> {
        let sample = sample_colors(&mut self.rng, pixels, self.cfg.sample_size);
        let range = k_range(&sample);
        let ks: Vec<usize> = (range.min..=range.max).step_by(self.cfg.k_step.max(1)).collect();

        let mut inertias = Vec::with_capacity(ks.len());
        for &k in &ks {
            let mut fit_rng = StdRng::seed_from_u64(self.cfg.seed);
            let model = ClusterModel::fit(&sample, k, params, &mut fit_rng)?;
            inertias.push(model.inertia(&sample));
        }

        let xs: Vec<f64> = ks.iter().map(|&k| k as f64).collect();
        let k = match find_knee(&xs, &inertias, KNEE_SENSITIVITY) {
            Some(i) => ks[i],
            None => {
                tracing::warn!(?range, "no inertia knee; using range midpoint");
                ks[ks.len() / 2]
            }
        };

        let mut fit_rng = StdRng::seed_from_u64(self.cfg.seed);
        let model = ClusterModel::fit(pixels, k, params, &mut fit_rng)?;
        tracing::debug!(k, k_min = range.min, k_max = range.max, "palette retrained");
        self.model = Some(model);
        self.last_range = Some(range);
        Ok(())
    }
}

/// Draw up to `cap` colors without replacement.
fn sample_colors(rng: &mut StdRng, pixels: &[Color], cap: usize) -> Vec<Color> {
    let amount = cap.min(pixels.len());
    index::sample(rng, pixels.len(), amount)
        .into_iter()
        .map(|i| pixels[i])
        .collect()
}

/// Cluster-count search range from the sample's hue spread and saturation.
///
/// Bounds are clamped to the sample size so tiny frames never ask for more clusters than points.
pub fn k_range(sample: &[Color]) -> KRange {
    let (min, max) = if sample.is_empty() {
        (1, 1)
    } else {
        let stats = HsvStats::from_colors(sample);
        if stats.mean_saturation < 30.0 {
            (4, 8)
        } else if stats.hue_variance < 500.0 || stats.distinct_hues < 20 {
            (6, 10)
        } else if stats.hue_variance < 1500.0 {
            (8, 14)
        } else {
            (12, 24)
        }
    };
    let max = max.min(sample.len().max(1));
    KRange {
        min: min.min(max),
        max,
    }
}

#[derive(Clone, Copy, Debug)]
struct HsvStats {
    hue_variance: f64,
    mean_saturation: f64,
    distinct_hues: usize,
}

impl HsvStats {
    fn from_colors(colors: &[Color]) -> Self {
        let n = colors.len() as f64;
        let mut hues = Vec::with_capacity(colors.len());
        let mut sat_sum = 0.0f64;
        for c in colors {
            let (h, s) = hue_saturation_u8(c);
            hues.push(h);
            sat_sum += f64::from(s);
        }
        let mean_hue = hues.iter().map(|&h| f64::from(h)).sum::<f64>() / n;
        let hue_variance = hues
            .iter()
            .map(|&h| (f64::from(h) - mean_hue).powi(2))
            .sum::<f64>()
            / n;
        let distinct_hues = hues.iter().collect::<HashSet<_>>().len();
        Self {
            hue_variance,
            mean_saturation: sat_sum / n,
            distinct_hues,
        }
    }
}

/// 8-bit hue in `[0, 180)` and saturation in `[0, 255]`.
fn hue_saturation_u8(c: &Color) -> (u8, u8) {
    let [r, g, b] = c.map(|v| v.round().clamp(0.0, 255.0));
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;
    let s = if v > 0.0 { 255.0 * delta / v } else { 0.0 };
    let h = if delta <= 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / delta
    } else if v == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };
    let h8 = ((h / 2.0).round() as u32 % 180) as u8;
    (h8, s.round().clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/palette.rs"]
mod tests;
