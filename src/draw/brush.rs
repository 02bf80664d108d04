//! Square brush stroke rasterization.
//!
//! A stroke segment runs from the previous pointer sample to the current one.
//! Each axis is expanded with [`range`], the two sequences are equalized and
//! zipped, and a square brush tip is blended into the buffer at every point.

use super::interpolate::{EqualizeStrategy, equalize_length, range};
use super::{Color, DirtyTracker, RasterBuffer};
use crate::util::Rect;
use rand::Rng;

/// Brush parameters used for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    /// Side length of the square tip in pixels
    pub size: i32,
    /// Foreground color blended under the tip
    pub color: Color,
    pub strategy: EqualizeStrategy,
}

/// Result of rasterizing one stroke segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeOutcome {
    /// Every point of the segment was painted.
    Painted {
        points: usize,
        /// Bounding box of everything blended
        bounds: Option<Rect>,
    },
    /// A point produced an empty tip; the rest of the segment was skipped.
    Aborted {
        /// Points painted before the empty tip
        painted: usize,
        bounds: Option<Rect>,
    },
}

impl StrokeOutcome {
    /// Number of points blended into the buffer.
    pub fn painted(&self) -> usize {
        match self {
            StrokeOutcome::Painted { points, .. } => *points,
            StrokeOutcome::Aborted { painted, .. } => *painted,
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        match self {
            StrokeOutcome::Painted { bounds, .. } | StrokeOutcome::Aborted { bounds, .. } => {
                *bounds
            }
        }
    }
}

/// Square tip of side `size` centred (roughly) on `(x, y)`, clamped to the canvas.
///
/// Returns `None` when the clamped square contains no pixels.
pub fn tip_rect(x: i32, y: i32, size: i32, canvas_width: i32, canvas_height: i32) -> Option<Rect> {
    let x0 = x - size / 2;
    let y0 = y - size / 2;
    let clamp_x = |v: i32| v.clamp(0, canvas_width.max(0));
    let clamp_y = |v: i32| v.clamp(0, canvas_height.max(0));
    let (left, right) = (clamp_x(x0), clamp_x(x0 + size));
    let (top, bottom) = (clamp_y(y0), clamp_y(y0 + size));
    Rect::new(left, top, right - left, bottom - top)
}

/// Paints the segment `from -> to` into `buffer`.
///
/// Every blended tip is marked in `dirty`. If a tip clamps to an empty
/// rectangle (the pointer left the canvas far enough), processing of the
/// remaining points stops and [`StrokeOutcome::Aborted`] is returned.
pub fn paint_segment<R: Rng + ?Sized>(
    buffer: &mut RasterBuffer,
    dirty: &mut DirtyTracker,
    brush: &Brush,
    from: (i32, i32),
    to: (i32, i32),
    rng: &mut R,
) -> StrokeOutcome {
    let xs = range(from.0, to.0);
    let ys = range(from.1, to.1);
    let (xs, ys) = equalize_length(xs, ys, brush.strategy, rng);

    let (width, height) = (buffer.width(), buffer.height());
    let mut painted = 0;
    let mut bounds: Option<Rect> = None;

    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let Some(tip) = tip_rect(x, y, brush.size, width, height) else {
            log::trace!(
                "Empty brush tip at ({x}, {y}); skipping rest of segment after {painted} points"
            );
            return StrokeOutcome::Aborted { painted, bounds };
        };
        if let Some(rect) = buffer.blend_rect(tip, brush.color) {
            dirty.mark_rect(rect);
            bounds = Some(bounds.map_or(rect, |b| b.union(&rect)));
        }
        painted += 1;
    }

    StrokeOutcome::Painted {
        points: painted,
        bounds,
    }
}
