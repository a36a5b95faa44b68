//! Kneedle elbow detection for convex, decreasing curves such as k-means inertia.

/// Index of the knee of a convex decreasing curve `(x, y)`, or `None` when no knee stands out.
///
/// `x` must be strictly increasing. `sensitivity` is the Kneedle `S` parameter; `1.0` is the
/// usual choice.
pub fn find_knee(x: &[f64], y: &[f64], sensitivity: f64) -> Option<usize> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }
    let xn = normalize(x)?;
    let yn = normalize(y)?;

    // Flip the convex decreasing curve so the knee becomes a maximum of `y - x`.
    let y_max = yn.iter().copied().fold(f64::MIN, f64::max);
    let diff: Vec<f64> = yn
        .iter()
        .zip(&xn)
        .map(|(&yv, &xv)| (y_max - yv) - xv)
        .collect();

    let maxima = relative_extrema(&diff, |a, b| a >= b);
    let minima = relative_extrema(&diff, |a, b| a <= b);
    let first_max = *maxima.first()?;

    let mean_step = xn.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (n - 1) as f64;
    let tmx: Vec<f64> = maxima
        .iter()
        .map(|&i| diff[i] - sensitivity * mean_step.abs())
        .collect();

    let mut threshold = 0.0;
    let mut threshold_index = first_max;
    let mut maxima_seen = 0usize;
    for i in first_max..n {
        if xn[i] >= 1.0 || i + 1 >= n {
            break;
        }
        if maxima.contains(&i) {
            threshold = tmx[maxima_seen];
            threshold_index = i;
            maxima_seen += 1;
        }
        if minima.contains(&i) {
            threshold = 0.0;
        }
        if diff[i + 1] < threshold {
            return Some(threshold_index);
        }
    }
    None
}

fn normalize(v: &[f64]) -> Option<Vec<f64>> {
    let min = v.iter().copied().fold(f64::INFINITY, f64::min);
    let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return None;
    }
    Some(v.iter().map(|&a| (a - min) / range).collect())
}

/// Indices whose value compares true against both neighbours; endpoints compare against
/// themselves on the missing side.
fn relative_extrema(data: &[f64], cmp: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    let n = data.len();
    (0..n)
        .filter(|&i| {
            let left = data[i.saturating_sub(1)];
            let right = data[(i + 1).min(n - 1)];
            cmp(data[i], left) && cmp(data[i], right)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/filters/knee.rs"]
mod tests;
