//! Configuration file support for snipmark.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/snipmark/config.toml`. Settings include brush defaults,
//! the crop outline, clipboard transfer tuning, and undo history limits.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{BusyPolicy, ColorSpec};
pub use types::{BrushConfig, HistoryConfig, SelectionConfig, TransferConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound for `transfer.chunk_size`, kept below the server's maximum
/// property size.
pub const MAX_CHUNK_SIZE: usize = 250_000;

/// Smallest brush that is still visible.
pub const MIN_BRUSH_SIZE: i32 = 2;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [brush]
/// size = 4
/// color = "red"
/// interpolation = "even"
///
/// [selection]
/// outline_color = [0, 255, 0]
/// outline_opacity = 125
///
/// [transfer]
/// chunk_size = 200000
/// busy_policy = "queue"
/// stall_timeout_secs = 30
///
/// [history]
/// max_depth = 50
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, schemars::JsonSchema)]
pub struct Config {
    /// Freehand brush defaults
    #[serde(default)]
    pub brush: BrushConfig,

    /// Crop selection outline
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Clipboard transfer tuning
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Undo history limits
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `brush.max_size`: 2 - 256
    /// - `brush.size`: 2 - `brush.max_size`
    /// - `selection.outline_width`: 1 - 16
    /// - `transfer.chunk_size`: 1 - 250000
    fn validate_and_clamp(&mut self) {
        if !(MIN_BRUSH_SIZE..=256).contains(&self.brush.max_size) {
            log::warn!(
                "Invalid brush max_size {}, clamping to {}-256 range",
                self.brush.max_size,
                MIN_BRUSH_SIZE
            );
            self.brush.max_size = self.brush.max_size.clamp(MIN_BRUSH_SIZE, 256);
        }

        if !(MIN_BRUSH_SIZE..=self.brush.max_size).contains(&self.brush.size) {
            log::warn!(
                "Invalid brush size {}, clamping to {}-{} range",
                self.brush.size,
                MIN_BRUSH_SIZE,
                self.brush.max_size
            );
            self.brush.size = self.brush.size.clamp(MIN_BRUSH_SIZE, self.brush.max_size);
        }

        if !(1..=16).contains(&self.selection.outline_width) {
            log::warn!(
                "Invalid outline_width {}, clamping to 1-16 range",
                self.selection.outline_width
            );
            self.selection.outline_width = self.selection.outline_width.clamp(1, 16);
        }

        if !(1..=MAX_CHUNK_SIZE).contains(&self.transfer.chunk_size) {
            log::warn!(
                "Invalid chunk_size {}, clamping to 1-{} range",
                self.transfer.chunk_size,
                MAX_CHUNK_SIZE
            );
            self.transfer.chunk_size = self.transfer.chunk_size.clamp(1, MAX_CHUNK_SIZE);
        }

        if self.transfer.payload_type.trim().is_empty() {
            log::warn!("Empty payload_type, falling back to 'image/png'");
            self.transfer.payload_type = "image/png".to_string();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/snipmark/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("snipmark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains
    /// invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// JSON schema describing the config file, for editor integration.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
