use super::*;

#[test]
fn defaults_validate() {
    FilterConfig::default().validate().unwrap();
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let json = r#"{ "palette": { "retrain_interval": 5 }, "video": { "max_side": 720 } }"#;
    let cfg: FilterConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.palette.retrain_interval, 5);
    assert_eq!(cfg.palette.sample_size, 10_000);
    assert_eq!(cfg.video.max_side, 720);
    assert_eq!(cfg.video.sketch_fps_cap, 30);
    cfg.validate().unwrap();
}

#[test]
fn from_path_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{ "cartoon": { "darken_factor": 1.5 } }"#).unwrap();
    let err = FilterConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, MediaFilterError::Validation(_)));

    std::fs::write(&path, r#"{ "smoothing": { "history_len": 4 } }"#).unwrap();
    let cfg = FilterConfig::from_path(&path).unwrap();
    assert_eq!(cfg.smoothing.history_len, 4);

    assert!(FilterConfig::from_path(dir.path().join("missing.json")).is_err());
}

#[test]
fn validation_catches_bad_values() {
    let mut cfg = FilterConfig::default();
    cfg.edges.upper_ratio = 0.5;
    assert!(cfg.validate().is_err());

    let mut cfg = FilterConfig::default();
    cfg.smoothing.min_weight = 0.95;
    assert!(cfg.validate().is_err());

    let mut cfg = FilterConfig::default();
    cfg.palette.k_step = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = FilterConfig::default();
    cfg.video.cartoon_fps_cap = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn edge_profiles_differ_by_filter_and_mode() {
    let cfg = FilterConfig::default();
    let still = cfg.edge_profile(FilterKind::Cartoon, RenderMode::Still);
    let video = cfg.edge_profile(FilterKind::Cartoon, RenderMode::Video);
    assert_ne!(still, video);
    assert_eq!(
        cfg.edge_profile(FilterKind::Sketch, RenderMode::Still),
        cfg.sketch.image
    );
    assert_eq!(cfg.video.fps_cap(FilterKind::Cartoon), 22);
    assert_eq!(cfg.video.fallback_fps(FilterKind::Sketch), 30);
}
