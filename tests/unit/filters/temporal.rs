use super::*;

fn smoother(history_len: usize) -> TemporalSmoother {
    TemporalSmoother::new(&SmoothingConfig {
        history_len,
        min_weight: 0.4,
        max_weight: 0.9,
    })
}

fn mask_with(w: u32, h: u32, on: &[(u32, u32)]) -> EdgeMask {
    let mut m = EdgeMask::new(w, h);
    for &(x, y) in on {
        m.put_pixel(x, y, Luma([255]));
    }
    m
}

#[test]
fn first_call_is_cold_start() {
    let mut s = smoother(2);
    assert!(s.is_empty());
    let m = mask_with(8, 8, &[(1, 1), (4, 5)]);
    assert_eq!(s.smooth(m.clone()), m);
    assert_eq!(s.len(), 1);
}

#[test]
fn capacity_one_is_identity() {
    let mut s = smoother(1);
    let masks = [
        mask_with(6, 6, &[(0, 0)]),
        mask_with(6, 6, &[(5, 5), (2, 2)]),
        mask_with(6, 6, &[]),
        EdgeMask::from_pixel(6, 6, Luma([255])),
    ];
    for m in masks {
        assert_eq!(s.smooth(m.clone()), m);
        assert_eq!(s.len(), 1);
    }
}

#[test]
fn low_motion_output_follows_previous_mask() {
    let mut s = smoother(2);
    s.smooth(EdgeMask::new(100, 100));
    let flicker = mask_with(100, 100, &[(50, 50)]);
    let out = s.smooth(flicker);
    assert_eq!(out.get_pixel(50, 50).0[0], 0);

    // The one-frame edge surfaces a frame late, then clears.
    let out = s.smooth(EdgeMask::new(100, 100));
    assert_eq!(out.get_pixel(50, 50).0[0], 255);
    let out = s.smooth(EdgeMask::new(100, 100));
    assert_eq!(out.get_pixel(50, 50).0[0], 0);
}

#[test]
fn vanished_edge_in_static_scene_is_held() {
    let mut s = smoother(2);
    s.smooth(mask_with(100, 100, &[(10, 10)]));
    let out = s.smooth(EdgeMask::new(100, 100));
    assert_eq!(out.get_pixel(10, 10).0[0], 255);
}

#[test]
fn heavy_motion_trusts_current_frame() {
    let mut s = smoother(2);
    s.smooth(EdgeMask::new(10, 10));
    let full = EdgeMask::from_pixel(10, 10, Luma([255]));
    assert_eq!(s.smooth(full.clone()), full);
}

#[test]
fn output_is_binary_and_history_is_bounded() {
    let mut s = smoother(3);
    for i in 0..6u32 {
        let out = s.smooth(mask_with(12, 12, &[(i, i), (11 - i, i)]));
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(s.len() <= 3);
    }
    assert_eq!(s.len(), 3);
}

#[test]
fn resolution_change_restarts_history() {
    let mut s = smoother(2);
    s.smooth(mask_with(4, 4, &[(1, 1)]));
    let bigger = mask_with(8, 8, &[(7, 7)]);
    assert_eq!(s.smooth(bigger.clone()), bigger);
    assert_eq!(s.len(), 1);
}

#[test]
fn reset_clears_history() {
    let mut s = smoother(2);
    s.smooth(mask_with(4, 4, &[(1, 1)]));
    s.reset();
    assert!(s.is_empty());
    let m = mask_with(4, 4, &[(2, 2)]);
    assert_eq!(s.smooth(m.clone()), m);
}

#[test]
fn motion_is_normalized() {
    let a = EdgeMask::new(2, 2);
    let b = EdgeMask::from_pixel(2, 2, Luma([255]));
    assert_eq!(motion(&a, &a), 0.0);
    assert!((motion(&a, &b) - 1.0).abs() < 1e-6);
}
