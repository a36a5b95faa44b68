//! Adaptive edge extraction.
//!
//! Blur strength and hysteresis thresholds are derived from the frame itself: the median Sobel
//! magnitude sets the thresholds and the Laplacian variance (sharpness) picks the blur sigma.

use image::{GrayImage, Luma};

use crate::config::{EdgeConfig, EdgeProfile};
use crate::filters::blur::gaussian_blur_gray;
use crate::foundation::core::{EdgeMask, Frame};
use crate::foundation::error::MediaResult;

const EDGE: u8 = 255;

// tan(22.5deg) and tan(67.5deg): sector boundaries for gradient direction.
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Hysteresis threshold pair. Always `lower < upper`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeThresholds {
    /// Weak-edge threshold.
    pub lower: u8,
    /// Strong-edge threshold.
    pub upper: u8,
}

/// Convert a frame to BT.601 luma.
pub fn to_gray(frame: &Frame) -> GrayImage {
    let (w, h) = frame.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (dst, src) in gray.pixels_mut().zip(frame.pixels()) {
        let [r, g, b] = src.0;
        let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        *dst = Luma([luma.round().clamp(0.0, 255.0) as u8]);
    }
    gray
}

/// Statistics-driven edge detector.
#[derive(Clone, Copy, Debug)]
pub struct EdgeField<'a> {
    cfg: &'a EdgeConfig,
}

impl<'a> EdgeField<'a> {
    /// Create an edge field over shared edge parameters.
    pub fn new(cfg: &'a EdgeConfig) -> Self {
        Self { cfg }
    }

    /// Hysteresis thresholds from the median gradient magnitude, scaled by `profile`.
    pub fn thresholds(&self, gray: &GrayImage, profile: &EdgeProfile) -> EdgeThresholds {
        let (gx, gy) = sobel(gray);
        let mut mags: Vec<f32> = gx
            .iter()
            .zip(&gy)
            .map(|(&x, &y)| (x * x + y * y).sqrt())
            .collect();
        let med = f64::from(median(&mut mags));

        threshold_pair(
            med,
            self.cfg.lower_ratio * profile.lower_scale,
            self.cfg.upper_ratio * profile.upper_scale,
            self.cfg.fallback_increment,
        )
    }

    /// Pre-blur sigma from the sharpness (Laplacian variance) of `gray`.
    pub fn sigma(&self, gray: &GrayImage) -> f32 {
        let s = &self.cfg.sigma;
        let sharpness = laplacian_variance(gray);
        if sharpness > s.high_threshold {
            s.base * s.high_mult
        } else if sharpness > s.medium_threshold {
            s.base * s.medium_mult
        } else {
            s.base
        }
    }

    /// Blur and run hysteresis edge detection; the result only holds 0 and 255.
    pub fn extract(
        &self,
        gray: &GrayImage,
        kernel_size: u32,
        thresholds: EdgeThresholds,
        sigma: f32,
    ) -> MediaResult<EdgeMask> {
        let k = (kernel_size | 1).max(self.cfg.min_kernel | 1).max(3);
        let blurred = gaussian_blur_gray(gray, k, sigma)?;
        Ok(canny(&blurred, thresholds))
    }

    /// Thresholds, sigma and extraction in one call.
    pub fn detect(&self, gray: &GrayImage, profile: &EdgeProfile) -> MediaResult<EdgeMask> {
        let thresholds = self.thresholds(gray, profile);
        let sigma = self.sigma(gray);
        self.extract(gray, profile.kernel_size, thresholds, sigma)
    }
}

fn threshold_pair(median: f64, lower_ratio: f64, upper_ratio: f64, increment: u8) -> EdgeThresholds {
    let lower = (lower_ratio * median).clamp(0.0, 255.0).floor() as u8;
    let mut upper = (upper_ratio * median).clamp(0.0, 255.0).floor() as u8;
    if upper <= lower {
        upper = lower.saturating_add(increment.max(1));
    }
    let lower = if upper <= lower { upper - 1 } else { lower };
    EdgeThresholds { lower, upper }
}

/// Grow every edge pixel into a `size` x `size` square anchored at `(size / 2, size / 2)`.
pub fn dilate(mask: &EdgeMask, size: u32) -> EdgeMask {
    if size <= 1 {
        return mask.clone();
    }
    let (w, h) = mask.dimensions();
    let anchor = (size / 2) as i64;
    EdgeMask::from_fn(w, h, |x, y| {
        for j in 0..i64::from(size) {
            for i in 0..i64::from(size) {
                let sx = i64::from(x) + i - anchor;
                let sy = i64::from(y) + j - anchor;
                if sx < 0 || sy < 0 || sx >= i64::from(w) || sy >= i64::from(h) {
                    continue;
                }
                if mask.get_pixel(sx as u32, sy as u32).0[0] != 0 {
                    return Luma([EDGE]);
                }
            }
        }
        Luma([0])
    })
}

fn sobel(gray: &GrayImage) -> (Vec<f32>, Vec<f32>) {
    let (w, h) = (gray.width() as i32, gray.height() as i32);
    let n = (w * h) as usize;
    let mut gx = vec![0f32; n];
    let mut gy = vec![0f32; n];
    if n == 0 {
        return (gx, gy);
    }
    let raw = gray.as_raw();
    let at = |x: i32, y: i32| -> f32 {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        f32::from(raw[(y * w + x) as usize])
    };
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            gx[i] = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            gy[i] = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
        }
    }
    (gx, gy)
}

fn median(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    let (left, upper, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return upper;
    }
    let lower = left.iter().copied().fold(f32::MIN, f32::max);
    (lower + upper) / 2.0
}

fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as i32, gray.height() as i32);
    if w == 0 || h == 0 {
        return 0.0;
    }
    let raw = gray.as_raw();
    let at = |x: i32, y: i32| -> f64 {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        f64::from(raw[(y * w + x) as usize])
    };

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in 0..h {
        for x in 0..w {
            let lap = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }
    let n = f64::from(w) * f64::from(h);
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

fn canny(gray: &GrayImage, t: EdgeThresholds) -> EdgeMask {
    let (width, height) = gray.dimensions();
    let mut out = EdgeMask::new(width, height);
    if width < 3 || height < 3 {
        return out;
    }
    let (gx, gy) = sobel(gray);
    let w = width as usize;
    let h = height as usize;
    let mag: Vec<f32> = gx.iter().zip(&gy).map(|(x, y)| x.abs() + y.abs()).collect();
    let lower = f32::from(t.lower);
    let upper = f32::from(t.upper);

    // 0 = suppressed, 1 = weak candidate, 2 = strong seed.
    let mut class = vec![0u8; w * h];
    let mut stack = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = mag[i];
            if m <= 0.0 || m < lower {
                continue;
            }
            let ax = gx[i].abs();
            let ay = gy[i].abs();
            let (a, b) = if ay <= TAN_22_5 * ax {
                (i - 1, i + 1)
            } else if ay >= TAN_67_5 * ax {
                (i - w, i + w)
            } else if (gx[i] > 0.0) == (gy[i] > 0.0) {
                (i - w - 1, i + w + 1)
            } else {
                (i - w + 1, i + w - 1)
            };
            if !(m > mag[a] && m >= mag[b]) {
                continue;
            }
            if m >= upper {
                class[i] = 2;
                stack.push(i);
            } else {
                class[i] = 1;
            }
        }
    }

    let raw = &mut *out;
    while let Some(i) = stack.pop() {
        if raw[i] == EDGE {
            continue;
        }
        raw[i] = EDGE;
        let (x, y) = (i % w, i / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let j = ny * w + nx;
                if class[j] != 0 && raw[j] != EDGE {
                    stack.push(j);
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/filters/edges.rs"]
mod tests;
