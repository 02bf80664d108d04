//! Encoding a cropped canvas region for the clipboard.

use super::types::{ExportError, ExportResult};
use crate::draw::RasterBuffer;
use crate::util::Rect;
use std::io;

/// Normalizes the drag from `start` to `end` and clips it to the canvas.
pub fn crop_region(buffer: &RasterBuffer, start: (i32, i32), end: (i32, i32)) -> Option<Rect> {
    Rect::from_corners(start.0, start.1, end.0, end.1)?.clip_to(buffer.width(), buffer.height())
}

/// Encodes the region spanned by `start` and `end` as PNG.
///
/// The drag may go in any direction; parts outside the canvas are dropped.
pub fn export_region(
    buffer: &RasterBuffer,
    start: (i32, i32),
    end: (i32, i32),
) -> Result<ExportResult, ExportError> {
    let region = crop_region(buffer, start, end).ok_or(ExportError::EmptyRegion { start, end })?;
    let rgba = buffer.region_rgba(region);

    let mut image_data = Vec::new();
    write_png(&mut image_data, region.width as u32, region.height as u32, &rgba)?;
    log::debug!(
        "Encoded {}x{} crop at ({}, {}) as {} bytes of PNG",
        region.width,
        region.height,
        region.x,
        region.y,
        image_data.len()
    );

    Ok(ExportResult { region, image_data })
}

fn write_png<W: io::Write>(
    w: W,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)
}
