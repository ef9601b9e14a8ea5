use super::Rect;
use crate::config::PackConfig;

/// Starting bin size for a packing attempt.
///
/// Power-of-two estimate from the total item area, widened until the
/// largest single dimension fits. A bin more than 1.5x larger than the
/// items is narrowed, trading width for a taller final atlas. Both
/// dimensions are clamped to the configured maxima.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the square root of an i64 area fits i64, and the result is clamped to i32 maxima"
)]
pub fn starting_size(items: &[Rect], config: &PackConfig) -> (i32, i32) {
    let total_area: i64 = items.iter().map(Rect::area).sum();
    let side = (total_area as f64).sqrt().ceil() as i64;
    let largest = i64::from(
        items
            .iter()
            .map(|rect| rect.width.max(rect.height))
            .max()
            .unwrap_or(0),
    );

    let mut width: i64 = 1;
    while width < largest || width < side {
        width <<= 1;
    }
    let mut height: i64 = 1;
    while height < side {
        height <<= 1;
    }

    if width * height * 2 > total_area * 3 {
        width >>= 1;
    }

    let width = width.clamp(1, i64::from(config.max_width_px()));
    let height = height.clamp(1, i64::from(config.max_height_px()));
    (width as i32, height as i32)
}
