//! Configuration type definitions.

use super::enums::{BusyPolicy, ColorSpec};
use crate::draw::EqualizeStrategy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Brush settings for freehand annotation.
///
/// `[` and `]` style commands adjust the size at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BrushConfig {
    /// Side of the square brush tip in pixels (valid range: 2 - 64)
    #[serde(default = "default_brush_size")]
    pub size: i32,

    /// Largest size reachable with the grow command (valid range: 2 - 256)
    #[serde(default = "default_brush_max_size")]
    pub max_size: i32,

    /// Brush color - either a named color or an RGB array like `[0, 0, 255]`
    #[serde(default = "default_brush_color")]
    pub color: ColorSpec,

    /// Brush opacity 0-255
    #[serde(default = "default_brush_opacity")]
    pub opacity: u8,

    /// How diagonal strokes are filled in ("random" or "even")
    #[serde(default)]
    pub interpolation: EqualizeStrategy,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: default_brush_size(),
            max_size: default_brush_max_size(),
            color: default_brush_color(),
            opacity: default_brush_opacity(),
            interpolation: EqualizeStrategy::default(),
        }
    }
}

/// Crop selection outline appearance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionConfig {
    #[serde(default = "default_outline_color")]
    pub outline_color: ColorSpec,

    /// Outline opacity 0-255
    #[serde(default = "default_outline_opacity")]
    pub outline_opacity: u8,

    /// Outline thickness in pixels (valid range: 1 - 16)
    #[serde(default = "default_outline_width")]
    pub outline_width: i32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            outline_color: default_outline_color(),
            outline_opacity: default_outline_opacity(),
            outline_width: default_outline_width(),
        }
    }
}

/// Clipboard transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransferConfig {
    /// Largest payload sent in one property, and the size of each chunk of a
    /// chunked transfer. Must stay below the server's maximum property size
    /// (roughly 250 kB), so it is clamped to 1 - 250000.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Type name advertised for the payload
    #[serde(default = "default_payload_type")]
    pub payload_type: String,

    /// Handling of requests that arrive during a chunked transfer
    #[serde(default)]
    pub busy_policy: BusyPolicy,

    /// Abort a chunked transfer after this many seconds without progress
    /// (0 disables the timeout)
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            payload_type: default_payload_type(),
            busy_policy: BusyPolicy::default(),
            stall_timeout_secs: default_stall_timeout_secs(),
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept, including the original capture.
    /// Each snapshot is a full copy of the screen; 0 keeps all of them.
    #[serde(default)]
    pub max_depth: usize,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_brush_size() -> i32 {
    2
}

fn default_brush_max_size() -> i32 {
    64
}

fn default_brush_color() -> ColorSpec {
    ColorSpec::Name("blue".to_string())
}

fn default_brush_opacity() -> u8 {
    255
}

fn default_outline_color() -> ColorSpec {
    ColorSpec::Name("green".to_string())
}

fn default_outline_opacity() -> u8 {
    125
}

fn default_outline_width() -> i32 {
    2
}

fn default_chunk_size() -> usize {
    200_000
}

fn default_payload_type() -> String {
    "image/png".to_string()
}

fn default_stall_timeout_secs() -> u64 {
    30
}
