use std::collections::VecDeque;

use image::Luma;

use crate::config::SmoothingConfig;
use crate::foundation::core::EdgeMask;

/// Motion-adaptive blending of recent edge masks, used to suppress flicker in video.
///
/// The newest mask gets a weight between `min_weight` (static scene, history dominates) and
/// `max_weight` (fast motion, current frame dominates); the rest is split evenly across the
/// older buffered masks.
#[derive(Debug)]
pub struct TemporalSmoother {
    history: VecDeque<EdgeMask>,
    capacity: usize,
    min_weight: f32,
    max_weight: f32,
}

impl TemporalSmoother {
    /// Create an empty smoother.
    pub fn new(cfg: &SmoothingConfig) -> Self {
        let capacity = cfg.history_len.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            min_weight: cfg.min_weight,
            max_weight: cfg.max_weight,
        }
    }

    /// Number of buffered masks.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// `true` before the first mask of a session.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drop all buffered masks.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Blend `current` with the buffered history and return a binary mask.
    pub fn smooth(&mut self, current: EdgeMask) -> EdgeMask {
        let Some(prev) = self.history.back() else {
            self.push(current.clone());
            return current;
        };
        if prev.dimensions() != current.dimensions() {
            tracing::debug!("edge history dimensions changed; restarting smoothing");
            self.reset();
            self.push(current.clone());
            return current;
        }

        let blend = self.blend_weight(motion(&current, prev));

        // Older masks that survive pushing `current`.
        let keep = (self.capacity - 1).min(self.history.len());
        if keep == 0 {
            self.push(current.clone());
            return current;
        }

        let rest = (1.0 - blend) / keep as f32;
        let mut acc: Vec<f32> = current
            .as_raw()
            .iter()
            .map(|&v| blend * f32::from(v))
            .collect();
        for mask in self.history.iter().skip(self.history.len() - keep) {
            for (a, &v) in acc.iter_mut().zip(mask.as_raw()) {
                *a += rest * f32::from(v);
            }
        }

        let (w, h) = current.dimensions();
        let mut out = EdgeMask::new(w, h);
        for (dst, a) in out.pixels_mut().zip(acc) {
            *dst = Luma([if a > 127.0 { 255 } else { 0 }]);
        }
        self.push(current);
        out
    }

    fn blend_weight(&self, motion: f32) -> f32 {
        self.min_weight + (self.max_weight - self.min_weight) * motion
    }

    fn push(&mut self, mask: EdgeMask) {
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(mask);
    }
}

/// Mean absolute difference between two masks, normalized to `[0, 1]`.
fn motion(a: &EdgeMask, b: &EdgeMask) -> f32 {
    let n = a.as_raw().len();
    if n == 0 {
        return 0.0;
    }
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    (total as f64 / n as f64 / 255.0) as f32
}

#[cfg(test)]
#[path = "../../tests/unit/filters/temporal.rs"]
mod tests;
