//! Per-frame image operators shared by the renderers.

/// Gaussian and bilateral smoothing.
pub mod blur;
pub mod edges;
pub mod kmeans;
pub mod knee;
pub mod palette;
/// Frame size bounding and area resampling.
pub mod scale;
/// Motion-adaptive edge history.
pub mod temporal;
