use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

const PARAMS: KMeansParams = KMeansParams {
    batch_size: 64,
    max_iter: 50,
    tol: 1e-3,
};

fn two_blobs() -> Vec<Color> {
    let mut pts = Vec::new();
    for i in 0..100 {
        let j = (i % 5) as f32;
        pts.push([10.0 + j, 20.0, 30.0 - j]);
        pts.push([200.0 - j, 180.0 + j, 90.0]);
    }
    pts
}

#[test]
fn separates_two_blobs() {
    let mut rng = StdRng::seed_from_u64(0);
    let model = ClusterModel::fit(&two_blobs(), 2, &PARAMS, &mut rng).unwrap();
    assert_eq!(model.k(), 2);

    let a = model.predict(&[12.0, 20.0, 28.0]);
    let b = model.predict(&[198.0, 182.0, 90.0]);
    assert_ne!(a, b);
    assert!((model.centroids()[a][0] - 12.0).abs() < 3.0);
    assert!((model.centroids()[b][1] - 182.0).abs() < 3.0);
    assert!(model.updates() > 0);
}

#[test]
fn k_is_capped_at_point_count() {
    let mut rng = StdRng::seed_from_u64(0);
    let pts = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let model = ClusterModel::fit(&pts, 8, &PARAMS, &mut rng).unwrap();
    assert_eq!(model.k(), 2);
}

#[test]
fn empty_points_or_zero_k_are_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(ClusterModel::fit(&[], 3, &PARAMS, &mut rng).is_err());
    assert!(ClusterModel::fit(&two_blobs(), 0, &PARAMS, &mut rng).is_err());
}

#[test]
fn more_clusters_lower_inertia() {
    let pts = two_blobs();
    let one = ClusterModel::fit(&pts, 1, &PARAMS, &mut StdRng::seed_from_u64(0)).unwrap();
    let two = ClusterModel::fit(&pts, 2, &PARAMS, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(two.inertia(&pts) < one.inertia(&pts) / 10.0);
}

#[test]
fn identical_points_collapse_without_panicking() {
    let pts = vec![[50.0, 50.0, 50.0]; 40];
    let model = ClusterModel::fit(&pts, 4, &PARAMS, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(model.inertia(&pts), 0.0);
}

#[test]
fn partial_fit_moves_toward_batch_and_keeps_k() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut model = ClusterModel::fit(&two_blobs(), 2, &PARAMS, &mut rng).unwrap();
    let dark = model.predict(&[10.0, 20.0, 30.0]);
    let before = model.centroids()[dark];
    let updates = model.updates();

    let batch = vec![[40.0, 20.0, 30.0]; 500];
    model.partial_fit(&batch);

    assert_eq!(model.k(), 2);
    assert_eq!(model.updates(), updates + 1);
    assert!(model.centroids()[dark][0] > before[0]);
}
