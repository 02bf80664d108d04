//! Raster primitives for freehand annotation.
//!
//! This module defines the core drawing types used on the captured image:
//! - [`Color`]: 8-bit BGRA color with straight alpha blending
//! - [`RasterBuffer`]: the mutable BGRA image the brush paints into
//! - [`brush`]: square-tip stroke rasterization
//! - [`interpolate`]: integer ranges and length equalization for strokes
//! - [`DirtyTracker`]: rectangles that need repainting

pub mod brush;
pub mod color;
pub mod dirty;
pub mod interpolate;
pub mod outline;
pub mod raster;

// Re-export commonly used types at module level
pub use brush::{Brush, StrokeOutcome, paint_segment};
pub use color::Color;
pub use dirty::DirtyTracker;
pub use interpolate::{EqualizeStrategy, equalize_length, range};
pub use outline::draw_selection_outline;
pub use raster::{Dimensions, RasterBuffer};
