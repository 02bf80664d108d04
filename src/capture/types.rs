//! Data types for crop export.

use crate::util::Rect;
use thiserror::Error;

/// Errors that can occur while exporting a cropped region.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The drag did not enclose any canvas pixels.
    #[error("Crop region from {start:?} to {end:?} contains no pixels")]
    EmptyRegion { start: (i32, i32), end: (i32, i32) },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// A finished crop export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Canvas region that was encoded
    pub region: Rect,
    /// Encoded PNG bytes
    pub image_data: Vec<u8>,
}
