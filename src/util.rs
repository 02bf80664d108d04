//! Geometry helpers shared by the rasterizer, dirty tracking and crop export.
//!
//! This module provides:
//! - [`Rect`], an axis-aligned pixel rectangle with clamping helpers
//! - Color name lookup used by the configuration layer

use crate::draw::{Color, color::*};

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

// ============================================================================
// Geometry Utilities
// ============================================================================

/// Axis-aligned rectangle in canvas pixel coordinates.
///
/// `x`/`y` is the top-left corner; the rectangle covers
/// `x..x + width` horizontally and `y..y + height` vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle, returning `None` when it would contain no pixels.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Builds a rectangle from two corners given in any order.
    ///
    /// The corners are treated as half-open bounds (`min..max`), so two equal
    /// coordinates on an axis produce an empty rectangle.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Returns `true` if the rectangle covers at least one pixel.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Intersects the rectangle with the canvas `0..width` x `0..height`.
    pub fn clip_to(&self, width: i32, height: i32) -> Option<Self> {
        let x0 = self.x.clamp(0, width.max(0));
        let y0 = self.y.clamp(0, height.max(0));
        let x1 = self.right().clamp(0, width.max(0));
        let y1 = self.bottom().clamp(0, height.max(0));
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}
