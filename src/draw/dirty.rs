//! Repaint bookkeeping for the annotated capture.
//!
//! A stroke marks one small square per brush tip, and consecutive tips
//! overlap almost completely. Overlapping marks are folded into one
//! rectangle so a segment reports a handful of regions instead of one per
//! point.

use crate::util::Rect;

/// Past this many disjoint regions a single full repaint is cheaper.
const MAX_REGIONS: usize = 32;

/// Tracks dirty rectangles accumulated between repaints.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    regions: Vec<Rect>,
    force_full: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the entire surface as dirty. Clears any accumulated rectangles.
    pub fn mark_full(&mut self) {
        self.force_full = true;
        self.regions.clear();
    }

    /// Adds a dirty rectangle, merging it with every region it overlaps.
    pub fn mark_rect(&mut self, rect: Rect) {
        if !rect.is_valid() || self.force_full {
            return;
        }
        let mut merged = rect;
        self.regions.retain(|existing| {
            if overlaps(existing, &merged) {
                merged = merged.union(existing);
                false
            } else {
                true
            }
        });
        self.regions.push(merged);
        if self.regions.len() > MAX_REGIONS {
            log::trace!("More than {MAX_REGIONS} dirty regions, repainting everything");
            self.mark_full();
        }
    }

    pub fn is_clean(&self) -> bool {
        !self.force_full && self.regions.is_empty()
    }

    /// Drains the regions gathered so far; a full mark yields one rectangle
    /// covering `width` x `height`.
    pub fn take_regions(&mut self, width: i32, height: i32) -> Vec<Rect> {
        if std::mem::take(&mut self.force_full) {
            self.regions.clear();
            return Rect::new(0, 0, width, height).into_iter().collect();
        }
        std::mem::take(&mut self.regions)
    }
}

/// Shares at least one pixel; rectangles that only touch do not count.
fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}
