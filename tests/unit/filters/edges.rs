use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

fn noise(w: u32, h: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(w, h, |_, _| Luma([rng.r#gen::<u8>()]))
}

fn vertical_step(w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, _| Luma([if x < w / 2 { 20 } else { 220 }]))
}

#[test]
fn thresholds_are_ordered_for_any_input() {
    let cfg = EdgeConfig::default();
    let field = EdgeField::new(&cfg);
    let profile = EdgeProfile::default();
    let inputs = [
        GrayImage::from_pixel(10, 10, Luma([128])),
        GrayImage::new(1, 1),
        GrayImage::new(0, 0),
        noise(32, 32, 1),
        noise(17, 9, 2),
        vertical_step(16, 16),
        GrayImage::from_fn(16, 16, |x, y| Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])),
    ];
    for gray in &inputs {
        let t = field.thresholds(gray, &profile);
        assert!(t.lower < t.upper, "{t:?}");
    }
}

#[test]
fn uniform_frame_uses_fallback_increment() {
    let cfg = EdgeConfig::default();
    let t = EdgeField::new(&cfg).thresholds(
        &GrayImage::from_pixel(8, 8, Luma([90])),
        &EdgeProfile::default(),
    );
    assert_eq!(t, EdgeThresholds { lower: 0, upper: 20 });
}

#[test]
fn saturated_thresholds_still_ordered() {
    let t = threshold_pair(1000.0, 0.66, 1.33, 20);
    assert_eq!(t, EdgeThresholds { lower: 254, upper: 255 });
    let t = threshold_pair(300.0, 0.66, 1.33, 20);
    assert_eq!(t.lower, 198);
    assert_eq!(t.upper, 255);
}

#[test]
fn median_averages_middle_pair() {
    assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    assert_eq!(median(&mut [5.0, 1.0, 3.0]), 3.0);
    assert_eq!(median(&mut []), 0.0);
}

#[test]
fn sigma_tiers_follow_sharpness() {
    let cfg = EdgeConfig::default();
    let field = EdgeField::new(&cfg);
    assert_eq!(field.sigma(&GrayImage::from_pixel(8, 8, Luma([10]))), 1.5);
    assert_eq!(field.sigma(&noise(32, 32, 7)), 1.5 * 2.5);
}

#[test]
fn extract_is_binary_and_finds_step() {
    let cfg = EdgeConfig::default();
    let field = EdgeField::new(&cfg);
    let gray = vertical_step(24, 12);
    let t = field.thresholds(&gray, &EdgeProfile::default());
    let mask = field.extract(&gray, 2, t, field.sigma(&gray)).unwrap();

    assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    let edge_cols: Vec<u32> = (0..24).filter(|&x| mask.get_pixel(x, 6).0[0] == 255).collect();
    assert!(!edge_cols.is_empty());
    assert!(edge_cols.iter().all(|&x| (10..=13).contains(&x)));
    // Far from the step there is nothing.
    assert_eq!(mask.get_pixel(2, 6).0[0], 0);
    assert_eq!(mask.get_pixel(21, 6).0[0], 0);
}

#[test]
fn extract_on_noise_is_binary() {
    let cfg = EdgeConfig::default();
    let field = EdgeField::new(&cfg);
    let gray = noise(40, 30, 3);
    let mask = field.detect(&gray, &EdgeProfile::default()).unwrap();
    assert_eq!(mask.dimensions(), (40, 30));
    assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
}

#[test]
fn uniform_frame_has_no_edges() {
    let cfg = EdgeConfig::default();
    let gray = GrayImage::from_pixel(20, 20, Luma([128]));
    let mask = EdgeField::new(&cfg)
        .detect(&gray, &EdgeProfile::default())
        .unwrap();
    assert!(mask.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn dilate_grows_toward_top_left() {
    let mut mask = EdgeMask::new(5, 5);
    mask.put_pixel(2, 2, Luma([255]));
    let out = dilate(&mask, 2);
    let on: Vec<(u32, u32)> = (0..5)
        .flat_map(|y| (0..5).map(move |x| (x, y)))
        .filter(|&(x, y)| out.get_pixel(x, y).0[0] == 255)
        .collect();
    assert_eq!(on, vec![(2, 2), (3, 2), (2, 3), (3, 3)]);
    assert_eq!(dilate(&mask, 1), mask);
}

#[test]
fn gray_uses_bt601_weights() {
    let frame = Frame::from_pixel(1, 1, image::Rgb([255, 0, 0]));
    assert_eq!(to_gray(&frame).get_pixel(0, 0).0[0], 76);
    let frame = Frame::from_pixel(1, 1, image::Rgb([255, 255, 255]));
    assert_eq!(to_gray(&frame).get_pixel(0, 0).0[0], 255);
}
