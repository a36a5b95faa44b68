use image::imageops::{self, FilterType};

use crate::foundation::core::Frame;

/// Bound the larger side of `frame` to `max_side`, preserving aspect ratio.
///
/// Frames already within bounds are returned as an unchanged copy.
pub fn normalize(frame: &Frame, max_side: u32) -> Frame {
    let (w, h) = frame.dimensions();
    let longest = w.max(h);
    if longest <= max_side || max_side == 0 {
        return frame.clone();
    }
    let new_w = scale_side(w, max_side, longest);
    let new_h = scale_side(h, max_side, longest);
    resize_area(frame, new_w, new_h)
}

/// `floor(side * max_side / longest)`, at least 1.
pub fn scale_side(side: u32, max_side: u32, longest: u32) -> u32 {
    if longest == 0 {
        return side.max(1);
    }
    let scaled = u64::from(side) * u64::from(max_side) / u64::from(longest);
    (scaled as u32).max(1)
}

/// Resample `frame` to exactly `width` x `height` using area averaging when shrinking.
pub fn resize_area(frame: &Frame, width: u32, height: u32) -> Frame {
    let (w, h) = frame.dimensions();
    if (w, h) == (width, height) {
        return frame.clone();
    }
    if width <= w && height <= h {
        imageops::thumbnail(frame, width, height)
    } else {
        imageops::resize(frame, width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/scale.rs"]
mod tests;
