use rayon::prelude::*;

use crate::config::BilateralConfig;
use crate::foundation::core::Frame;
use crate::foundation::error::{MediaFilterError, MediaResult};

/// Separable Gaussian blur of a single-channel image with replicated borders.
///
/// `kernel_size` is the full (odd) kernel width; `radius = kernel_size / 2`.
pub fn gaussian_blur_gray(
    src: &image::GrayImage,
    kernel_size: u32,
    sigma: f32,
) -> MediaResult<image::GrayImage> {
    let radius = kernel_size / 2;
    if radius == 0 || src.width() == 0 || src.height() == 0 {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let (width, height) = src.dimensions();
    let mut tmp = vec![0u8; src.as_raw().len()];
    let mut out = vec![0u8; src.as_raw().len()];

    horizontal_pass(src.as_raw(), &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    image::GrayImage::from_raw(width, height, out)
        .ok_or_else(|| MediaFilterError::validation("blurred buffer size mismatch"))
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> MediaResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(MediaFilterError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the center tap so the kernel sums to exactly 1.0 in q16.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                acc += u64::from(kw) * u64::from(src[(y * w + sx) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                acc += u64::from(kw) * u64::from(src[(sy * w + x) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

/// Edge-preserving bilateral smoothing of an RGB frame.
///
/// Neighbours inside a circular window of `diameter` are weighted by spatial distance and by the
/// L1 color distance to the center pixel. Borders are replicated. Rows are processed in parallel.
pub fn bilateral_filter(src: &Frame, cfg: &BilateralConfig) -> MediaResult<Frame> {
    if !(cfg.sigma_color > 0.0 && cfg.sigma_space > 0.0) {
        return Err(MediaFilterError::validation(
            "bilateral sigmas must be > 0",
        ));
    }
    let (width, height) = src.dimensions();
    let radius = (cfg.diameter / 2) as i32;
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.clone());
    }

    let space_coeff = -0.5 / f64::from(cfg.sigma_space).powi(2);
    let color_coeff = -0.5 / f64::from(cfg.sigma_color).powi(2);

    let mut taps = Vec::<(i32, i32, f32)>::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = dx * dx + dy * dy;
            if r2 > radius * radius {
                continue;
            }
            taps.push((dx, dy, (f64::from(r2) * space_coeff).exp() as f32));
        }
    }
    let color_lut: Vec<f32> = (0..3 * 256)
        .map(|d| ((d * d) as f64 * color_coeff).exp() as f32)
        .collect();

    let w = width as i32;
    let h = height as i32;
    let raw = src.as_raw();
    let mut out = vec![0u8; raw.len()];
    out.par_chunks_mut((width * 3) as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for x in 0..w {
                let ci = ((y * w + x) * 3) as usize;
                let center = [raw[ci], raw[ci + 1], raw[ci + 2]];
                let mut sum = [0f32; 3];
                let mut wsum = 0f32;
                for &(dx, dy, ws) in &taps {
                    let sx = (x + dx).clamp(0, w - 1);
                    let sy = (y + dy).clamp(0, h - 1);
                    let ni = ((sy * w + sx) * 3) as usize;
                    let n = [raw[ni], raw[ni + 1], raw[ni + 2]];
                    let dist: usize = (0..3).map(|c| n[c].abs_diff(center[c]) as usize).sum();
                    let wt = ws * color_lut[dist];
                    for c in 0..3 {
                        sum[c] += wt * f32::from(n[c]);
                    }
                    wsum += wt;
                }
                let oi = (x * 3) as usize;
                for c in 0..3 {
                    row[oi + c] = (sum[c] / wsum).round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Frame::from_raw(width, height, out)
        .ok_or_else(|| MediaFilterError::validation("bilateral buffer size mismatch"))
}

#[cfg(test)]
#[path = "../../tests/unit/filters/blur.rs"]
mod tests;
