use image::Rgb;

use super::*;

#[test]
fn png_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/frame.png");
    let frame = Frame::from_fn(5, 3, |x, y| Rgb([x as u8 * 40, y as u8 * 80, 7]));
    write_image(&frame, &path).unwrap();
    assert_eq!(decode_image(&path).unwrap(), frame);
}

#[test]
fn missing_and_garbage_files_are_decode_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        decode_image(&dir.path().join("nope.png")),
        Err(MediaFilterError::Decode(_))
    ));

    let junk = dir.path().join("junk.png");
    std::fs::write(&junk, b"definitely not a png").unwrap();
    assert!(matches!(
        decode_image(&junk),
        Err(MediaFilterError::Decode(_))
    ));
}
