//! Crop selection outline drawn while the user drags out a region.

use super::{Color, DirtyTracker, RasterBuffer};
use crate::util::Rect;

/// Draws a translucent frame just outside the rectangle spanned by `start` and `end`.
///
/// The four bands are `width` pixels thick: the top and left bands sit before the
/// start corner, the bottom and right bands after the end corner. Bands that are
/// empty (e.g. a zero-width drag) are skipped; the rest are clipped to the canvas.
pub fn draw_selection_outline(
    buffer: &mut RasterBuffer,
    dirty: &mut DirtyTracker,
    start: (i32, i32),
    end: (i32, i32),
    width: i32,
    color: Color,
) {
    let (sx, sy) = start;
    let (ex, ey) = end;
    let bands = [
        Rect::from_corners(sx, sy, ex, sy - width),
        Rect::from_corners(sx, ey, ex, ey + width),
        Rect::from_corners(sx, sy, sx - width, ey),
        Rect::from_corners(ex, sy, ex + width, ey),
    ];

    for band in bands.into_iter().flatten() {
        if let Some(painted) = buffer.blend_rect(band, color) {
            dirty.mark_rect(painted);
        }
    }
}
