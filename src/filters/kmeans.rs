//! Mini-batch k-means over RGB color vectors.

use rand::Rng;
use rand::seq::index;

use crate::foundation::error::{MediaFilterError, MediaResult};

/// An RGB color as floating-point channels in `[0, 255]`.
pub type Color = [f32; 3];

/// Mini-batch fitting parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KMeansParams {
    /// Points drawn per update step.
    pub batch_size: usize,
    /// Maximum update steps per fit.
    pub max_iter: usize,
    /// Early-stop threshold on the total squared centroid shift of one step.
    pub tol: f32,
}

/// Learned color centroids plus the per-centroid sample counts that drive their learning rate.
#[derive(Clone, Debug)]
pub struct ClusterModel {
    centroids: Vec<Color>,
    counts: Vec<u64>,
    updates: u64,
}

impl ClusterModel {
    /// Fit `k` clusters to `points` (k is capped at the number of points).
    pub fn fit<R: Rng + ?Sized>(
        points: &[Color],
        k: usize,
        params: &KMeansParams,
        rng: &mut R,
    ) -> MediaResult<Self> {
        if points.is_empty() {
            return Err(MediaFilterError::validation(
                "cannot fit clusters to an empty point set",
            ));
        }
        if k == 0 {
            return Err(MediaFilterError::validation("cluster count must be > 0"));
        }
        let n = points.len();
        let k = k.min(n);
        let batch_size = params.batch_size.clamp(1, n);

        let init_size = (3 * batch_size).max(3 * k).min(n);
        let init: Vec<Color> = index::sample(rng, n, init_size)
            .into_iter()
            .map(|i| points[i])
            .collect();
        let mut model = Self {
            centroids: kmeans_plus_plus(&init, k, rng),
            counts: vec![0; k],
            updates: 0,
        };

        let mut batch = Vec::with_capacity(batch_size);
        for _ in 0..params.max_iter.max(1) {
            batch.clear();
            batch.extend(index::sample(rng, n, batch_size).into_iter().map(|i| points[i]));
            let shift = model.step(&batch);
            if shift < params.tol {
                break;
            }
        }
        Ok(model)
    }

    /// Centroids in cluster order.
    pub fn centroids(&self) -> &[Color] {
        &self.centroids
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Total update steps applied since the model was created.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Index of the centroid nearest to `p`.
    pub fn predict(&self, p: &Color) -> usize {
        nearest(&self.centroids, p).0
    }

    /// Sum of squared distances from each point to its nearest centroid.
    pub fn inertia(&self, points: &[Color]) -> f64 {
        points
            .iter()
            .map(|p| f64::from(nearest(&self.centroids, p).1))
            .sum()
    }

    /// Move centroids toward one new batch without changing k.
    pub(crate) fn partial_fit(&mut self, batch: &[Color]) {
        if !batch.is_empty() {
            self.step(batch);
        }
    }

    /// One mini-batch step; returns the total squared centroid shift.
    fn step(&mut self, batch: &[Color]) -> f32 {
        let k = self.centroids.len();
        let mut sums = vec![[0f64; 3]; k];
        let mut hits = vec![0u64; k];
        for p in batch {
            let (c, _) = nearest(&self.centroids, p);
            hits[c] += 1;
            for ch in 0..3 {
                sums[c][ch] += f64::from(p[ch]);
            }
        }

        let mut shift = 0f32;
        for c in 0..k {
            if hits[c] == 0 {
                continue;
            }
            let old_count = self.counts[c] as f64;
            let new_count = self.counts[c] + hits[c];
            let mut moved = [0f32; 3];
            for ch in 0..3 {
                let updated =
                    (f64::from(self.centroids[c][ch]) * old_count + sums[c][ch]) / new_count as f64;
                moved[ch] = updated as f32;
            }
            shift += dist2(&self.centroids[c], &moved);
            self.centroids[c] = moved;
            self.counts[c] = new_count;
        }
        self.updates += 1;
        shift
    }
}

fn kmeans_plus_plus<R: Rng + ?Sized>(points: &[Color], k: usize, rng: &mut R) -> Vec<Color> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);
    let mut d2: Vec<f32> = points.iter().map(|p| dist2(p, &centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = d2.iter().map(|&d| f64::from(d)).sum();
        let pick = if total <= 0.0 {
            rng.gen_range(0..points.len())
        } else {
            let mut target = rng.r#gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, &d) in d2.iter().enumerate() {
                target -= f64::from(d);
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        };
        let c = points[pick];
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(dist2(p, &c));
        }
        centroids.push(c);
    }
    centroids
}

fn nearest(centroids: &[Color], p: &Color) -> (usize, f32) {
    let mut best = (0usize, f32::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = dist2(p, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn dist2(a: &Color, b: &Color) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

#[cfg(test)]
#[path = "../../tests/unit/filters/kmeans.rs"]
mod tests;
