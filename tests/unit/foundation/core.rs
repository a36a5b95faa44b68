use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!((Fps::new(30000, 1001).unwrap().as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn fps_capped_keeps_slower_rate() {
    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(ntsc.capped(30), ntsc);
    assert_eq!(ntsc.capped(22), Fps { num: 22, den: 1 });
    assert_eq!(Fps::new(60, 1).unwrap().capped(30), Fps { num: 30, den: 1 });
}

#[test]
fn filter_carries_background_only_for_sketch() {
    assert_eq!(
        Filter::Sketch(Background::Black).background(),
        Some(Background::Black)
    );
    assert_eq!(Filter::Cartoon.background(), None);
    assert_eq!(Filter::Cartoon.kind().as_lower_str(), "cartoon");
    assert_eq!(Background::White.to_string(), "White");
    assert_eq!(Background::White.fill_value(), 255);
    assert_eq!(Background::Black.fill_value(), 0);
}

#[test]
fn media_kind_from_extension() {
    assert_eq!(MediaKind::from_path(Path::new("a/clip.MP4")), MediaKind::Video);
    assert_eq!(MediaKind::from_path(Path::new("clip.webm")), MediaKind::Video);
    assert_eq!(MediaKind::from_path(Path::new("photo.png")), MediaKind::Image);
    assert_eq!(MediaKind::from_path(Path::new("noext")), MediaKind::Image);
}
