//! 8-bit color type, predefined constants and straight alpha blending.

/// Represents an 8-bit-per-channel color with straight (non-premultiplied) alpha.
///
/// Channels are stored in the same order the raster buffer uses (B, G, R, A).
///
/// # Examples
///
/// ```
/// use snipmark::draw::Color;
/// let red = Color::rgba(255, 0, 0, 255);
/// let translucent_green = Color::rgba(0, 255, 0, 125);
/// assert_eq!(red.r, 255);
/// assert_eq!(translucent_green.a, 125);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    /// Alpha (0 = fully transparent, 255 = fully opaque)
    pub a: u8,
}

impl Color {
    /// Creates a color from RGBA components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Returns the same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Reads a pixel from a BGRA byte quadruple.
    pub fn from_bgra(px: &[u8]) -> Self {
        Self {
            b: px[0],
            g: px[1],
            r: px[2],
            a: px[3],
        }
    }

    /// Writes the color into a BGRA byte quadruple.
    pub fn write_bgra(&self, px: &mut [u8]) {
        px[0] = self.b;
        px[1] = self.g;
        px[2] = self.r;
        px[3] = self.a;
    }

    /// Composites `src` over `self` using straight alpha.
    ///
    /// Each color channel becomes `src * α + dst * (1 - α)` with
    /// `α = src.a / 255`; the result is always fully opaque.
    pub fn blend(self, src: Color) -> Color {
        let alpha = src.a as f64 / 255.0;
        Color {
            b: blend_channel(self.b, src.b, alpha),
            g: blend_channel(self.g, src.g, alpha),
            r: blend_channel(self.r, src.r, alpha),
            a: 0xff,
        }
    }
}

#[inline]
fn blend_channel(dst: u8, src: u8, alpha: f64) -> u8 {
    (src as f64 * alpha + dst as f64 * (1.0 - alpha)) as u8
}

// ============================================================================
// Predefined Color Constants
// ============================================================================

pub const RED: Color = Color::rgba(255, 0, 0, 255);

pub const GREEN: Color = Color::rgba(0, 255, 0, 255);

pub const BLUE: Color = Color::rgba(0, 0, 255, 255);

pub const YELLOW: Color = Color::rgba(255, 255, 0, 255);

pub const ORANGE: Color = Color::rgba(255, 128, 0, 255);

/// Pink/magenta (R=255, G=0, B=255)
pub const PINK: Color = Color::rgba(255, 0, 255, 255);

pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
