use std::collections::HashSet;

use image::Rgb;

use super::*;

fn rainbow(w: u32, h: u32) -> Frame {
    Frame::from_fn(w, h, |x, y| {
        let hue = x as f32 * 360.0 / w as f32;
        let sector = (hue / 60.0) as u32;
        let f = hue / 60.0 - sector as f32;
        let up = (255.0 * f) as u8;
        let down = (255.0 * (1.0 - f)) as u8;
        let v = 255 - (y * 4) as u8;
        let px = match sector {
            0 => [v, up, 0],
            1 => [down, v, 0],
            2 => [0, v, up],
            3 => [0, down, v],
            4 => [up, 0, v],
            _ => [v, 0, down],
        };
        Rgb(px)
    })
}

fn gray_noise(w: u32, h: u32) -> Frame {
    Frame::from_fn(w, h, |x, y| {
        let v = ((x * 37 + y * 91) % 200 + 20) as u8;
        Rgb([v, v, v])
    })
}

fn distinct(frame: &Frame) -> usize {
    frame.pixels().map(|p| p.0).collect::<HashSet<_>>().len()
}

#[test]
fn still_output_uses_at_most_k_colors() {
    let mut q = PaletteQuantizer::new(&PaletteConfig::default());
    let out = q.quantize(&rainbow(40, 12), 0, RenderMode::Still).unwrap();

    let k = q.cluster_count().unwrap();
    let range = q.last_k_range().unwrap();
    assert!(k >= range.min && k <= range.max);
    assert!(distinct(&out) <= k);
    assert_eq!(out.dimensions(), (40, 12));
}

#[test]
fn video_updates_incrementally_between_retrains() {
    let cfg = PaletteConfig {
        retrain_interval: 3,
        ..PaletteConfig::default()
    };
    let mut q = PaletteQuantizer::new(&cfg);
    q.quantize(&gray_noise(24, 24), 0, RenderMode::Video).unwrap();
    assert_eq!(q.last_k_range(), Some(KRange { min: 4, max: 8 }));
    let k = q.cluster_count().unwrap();
    let updates = q.model().unwrap().updates();

    // Colorful frames between retrains only nudge the existing centroids.
    q.quantize(&rainbow(24, 24), 1, RenderMode::Video).unwrap();
    q.quantize(&rainbow(24, 24), 2, RenderMode::Video).unwrap();
    assert_eq!(q.cluster_count(), Some(k));
    assert_eq!(q.model().unwrap().updates(), updates + 2);
    assert_eq!(q.last_k_range(), Some(KRange { min: 4, max: 8 }));

    q.quantize(&rainbow(24, 24), 3, RenderMode::Video).unwrap();
    assert_ne!(q.last_k_range(), Some(KRange { min: 4, max: 8 }));
}

#[test]
fn still_mode_always_retrains() {
    let mut q = PaletteQuantizer::new(&PaletteConfig::default());
    q.quantize(&gray_noise(16, 16), 5, RenderMode::Still).unwrap();
    assert_eq!(q.last_k_range(), Some(KRange { min: 4, max: 8 }));
    q.quantize(&rainbow(16, 16), 6, RenderMode::Still).unwrap();
    assert_ne!(q.last_k_range(), Some(KRange { min: 4, max: 8 }));
}

#[test]
fn undersized_frames_cap_k_at_pixel_count() {
    let mut q = PaletteQuantizer::new(&PaletteConfig::default());
    let one = Frame::from_pixel(1, 1, Rgb([10, 200, 30]));
    let out = q.quantize(&one, 0, RenderMode::Still).unwrap();
    assert_eq!(q.cluster_count(), Some(1));
    assert_eq!(out.get_pixel(0, 0).0, [10, 200, 30]);

    let two = Frame::from_fn(2, 1, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 0, 0]) });
    q.quantize(&two, 0, RenderMode::Still).unwrap();
    assert!(q.cluster_count().unwrap() <= 2);
}

#[test]
fn reset_drops_model_and_repeats_results() {
    let frame = rainbow(20, 10);
    let mut q = PaletteQuantizer::new(&PaletteConfig::default());
    let first = q.quantize(&frame, 0, RenderMode::Video).unwrap();
    q.reset();
    assert!(q.cluster_count().is_none());
    let again = q.quantize(&frame, 0, RenderMode::Video).unwrap();
    assert_eq!(first, again);
}

#[test]
fn k_range_tiers() {
    let gray = vec![[128.0, 128.0, 128.0]; 100];
    assert_eq!(k_range(&gray), KRange { min: 4, max: 8 });

    let red = vec![[250.0, 10.0, 10.0]; 100];
    assert_eq!(k_range(&red), KRange { min: 6, max: 10 });

    let few = vec![[250.0, 10.0, 10.0]; 3];
    assert_eq!(k_range(&few), KRange { min: 3, max: 3 });

    assert_eq!(k_range(&[]), KRange { min: 1, max: 1 });
}

#[test]
fn hsv_uses_half_degree_hue() {
    assert_eq!(hue_saturation_u8(&[255.0, 0.0, 0.0]), (0, 255));
    assert_eq!(hue_saturation_u8(&[0.0, 255.0, 0.0]), (60, 255));
    assert_eq!(hue_saturation_u8(&[0.0, 0.0, 255.0]), (120, 255));
    assert_eq!(hue_saturation_u8(&[90.0, 90.0, 90.0]), (0, 0));
}
