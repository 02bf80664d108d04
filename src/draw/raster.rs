//! BGRA raster buffer holding the captured (and annotated) screen image.

use super::Color;
use crate::util::Rect;

/// Bytes per BGRA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Width, height and row stride of a raster buffer.
///
/// Two buffers with equal dimensions can be copied into one another byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
    /// Bytes per row (at least `width * 4`)
    pub stride: usize,
}

/// Mutable BGRA image the brush paints into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    dims: Dimensions,
    pix: Vec<u8>,
}

impl RasterBuffer {
    /// Creates a tightly packed buffer filled with `fill`.
    pub fn new(width: i32, height: i32, fill: Color) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let stride = width as usize * BYTES_PER_PIXEL;
        let mut pix = vec![0; stride * height as usize];
        for px in pix.chunks_exact_mut(BYTES_PER_PIXEL) {
            fill.write_bgra(px);
        }
        Self {
            dims: Dimensions {
                width,
                height,
                stride,
            },
            pix,
        }
    }

    /// Wraps existing BGRA bytes, e.g. the pixels of a screen grab.
    ///
    /// Returns `None` when the byte count does not match `stride * height` or
    /// the stride is too small to hold a row.
    pub fn from_bgra(width: i32, height: i32, stride: usize, pix: Vec<u8>) -> Option<Self> {
        if width < 0 || height < 0 {
            return None;
        }
        if stride < width as usize * BYTES_PER_PIXEL || pix.len() != stride * height as usize {
            return None;
        }
        Some(Self {
            dims: Dimensions {
                width,
                height,
                stride,
            },
            pix,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> i32 {
        self.dims.width
    }

    pub fn height(&self) -> i32 {
        self.dims.height
    }

    /// Raw BGRA bytes, row-major with `stride` bytes per row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pix
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pix
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        Some(y as usize * self.dims.stride + x as usize * BYTES_PER_PIXEL)
    }

    /// Reads a pixel; `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.offset(x, y)
            .map(|at| Color::from_bgra(&self.pix[at..at + BYTES_PER_PIXEL]))
    }

    /// Alpha-blends `color` over every pixel of `rect`.
    ///
    /// The rectangle is clipped to the canvas first, so out-of-bounds pixels are
    /// never touched. Returns the clipped rectangle that was actually painted.
    pub fn blend_rect(&mut self, rect: Rect, color: Color) -> Option<Rect> {
        let clipped = rect.clip_to(self.dims.width, self.dims.height)?;
        let stride = self.dims.stride;
        let row_start = clipped.x as usize * BYTES_PER_PIXEL;
        let row_end = clipped.right() as usize * BYTES_PER_PIXEL;
        for y in clipped.y..clipped.bottom() {
            let base = y as usize * stride;
            let row = &mut self.pix[base + row_start..base + row_end];
            for px in row.chunks_exact_mut(BYTES_PER_PIXEL) {
                Color::from_bgra(px).blend(color).write_bgra(px);
            }
        }
        Some(clipped)
    }

    /// Copies the pixels of `rect` out as tightly packed RGBA rows.
    ///
    /// The rectangle must lie inside the canvas; callers clip it beforehand.
    pub fn region_rgba(&self, rect: Rect) -> Vec<u8> {
        let mut out = Vec::with_capacity(rect.width as usize * rect.height as usize * 4);
        for y in rect.y..rect.bottom() {
            let base = y as usize * self.dims.stride;
            let start = base + rect.x as usize * BYTES_PER_PIXEL;
            let end = base + rect.right() as usize * BYTES_PER_PIXEL;
            for px in self.pix[start..end].chunks_exact(BYTES_PER_PIXEL) {
                out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        out
    }
}
