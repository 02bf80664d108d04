//! Crop export for the clipboard.
//!
//! Turns a dragged rectangle on the annotated capture into PNG bytes that
//! become the clipboard payload.

pub mod export;
pub mod types;

pub use export::{crop_region, export_region};
pub use types::{ExportError, ExportResult};
