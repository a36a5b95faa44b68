use super::*;
use crate::foundation::core::Background;

#[test]
fn names_follow_filter_and_background() {
    let out = Path::new("/out");
    assert_eq!(
        output_path(Path::new("/in/clip.mov"), out, Filter::Cartoon, MediaKind::Video),
        PathBuf::from("/out/clip_cartoon.mp4")
    );
    assert_eq!(
        output_path(
            Path::new("/in/photo.png"),
            out,
            Filter::Sketch(Background::Black),
            MediaKind::Image
        ),
        PathBuf::from("/out/photo_sketch_Black.png")
    );
    assert_eq!(
        output_path(
            Path::new("clip.mp4"),
            out,
            Filter::Sketch(Background::White),
            MediaKind::Video
        ),
        PathBuf::from("/out/clip_sketch_White.mp4")
    );
}

#[test]
fn image_extension_kept_only_for_raster_formats() {
    let out = Path::new("o");
    assert_eq!(
        output_path(Path::new("a.JPG"), out, Filter::Cartoon, MediaKind::Image),
        PathBuf::from("o/a_cartoon.JPG")
    );
    assert_eq!(
        output_path(Path::new("a.webp"), out, Filter::Cartoon, MediaKind::Image),
        PathBuf::from("o/a_cartoon.png")
    );
    assert_eq!(
        output_path(Path::new("noext"), out, Filter::Cartoon, MediaKind::Image),
        PathBuf::from("o/noext_cartoon.png")
    );
}

#[test]
fn dotted_stems_keep_inner_dots() {
    assert_eq!(
        output_path(
            Path::new("my.holiday.tiff"),
            Path::new("o"),
            Filter::Cartoon,
            MediaKind::Image
        ),
        PathBuf::from("o/my.holiday_cartoon.tiff")
    );
}
