use image::{Rgba, RgbaImage};

use super::Origin;
use crate::packing::Rect;

/// Tight content bounds of `region` within `bitmap`.
///
/// A pixel counts as content when its alpha is non-zero and, if a color
/// key is given, its color differs from the key. Each side is scanned
/// inward until the first content row or column; a side whose scan
/// exhausts the region trims nothing, so a fully transparent or fully
/// keyed region keeps its original bounds with a zero offset and the
/// result can never have negative dimensions.
///
/// `region` must lie within the bitmap. The returned offset is the trim
/// taken off the left and top edges.
pub fn trim_rect(bitmap: &RgbaImage, region: Rect, color_key: Option<Rgba<u8>>) -> (Rect, Origin) {
    let left = trim_left(bitmap, &region, color_key);
    let rect = Rect::new(region.x + left, region.y, region.width - left, region.height);

    let right = trim_right(bitmap, &rect, color_key);
    let rect = Rect::new(rect.x, rect.y, rect.width - right, rect.height);

    let top = trim_top(bitmap, &rect, color_key);
    let rect = Rect::new(rect.x, rect.y + top, rect.width, rect.height - top);

    let bottom = trim_bottom(bitmap, &rect, color_key);
    let rect = Rect::new(rect.x, rect.y, rect.width, rect.height - bottom);

    (rect, Origin::new(left, top))
}

fn is_content(bitmap: &RgbaImage, x: i32, y: i32, color_key: Option<Rgba<u8>>) -> bool {
    #[expect(clippy::cast_sign_loss, reason = "the region lies within the bitmap")]
    let pixel = bitmap.get_pixel(x as u32, y as u32);
    pixel[3] != 0 && Some(*pixel) != color_key
}

fn trim_left(bitmap: &RgbaImage, rect: &Rect, color_key: Option<Rgba<u8>>) -> i32 {
    for x in rect.x..rect.right() {
        for y in rect.y..rect.bottom() {
            if is_content(bitmap, x, y, color_key) {
                return x - rect.x;
            }
        }
    }
    0
}

fn trim_right(bitmap: &RgbaImage, rect: &Rect, color_key: Option<Rgba<u8>>) -> i32 {
    for x in (rect.x..rect.right()).rev() {
        for y in rect.y..rect.bottom() {
            if is_content(bitmap, x, y, color_key) {
                return rect.right() - 1 - x;
            }
        }
    }
    0
}

fn trim_top(bitmap: &RgbaImage, rect: &Rect, color_key: Option<Rgba<u8>>) -> i32 {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            if is_content(bitmap, x, y, color_key) {
                return y - rect.y;
            }
        }
    }
    0
}

fn trim_bottom(bitmap: &RgbaImage, rect: &Rect, color_key: Option<Rgba<u8>>) -> i32 {
    for y in (rect.y..rect.bottom()).rev() {
        for x in rect.x..rect.right() {
            if is_content(bitmap, x, y, color_key) {
                return rect.bottom() - 1 - y;
            }
        }
    }
    0
}
