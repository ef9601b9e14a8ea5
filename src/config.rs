use image::Rgba;
use serde::{Deserialize, Serialize};

/// Settings for one atlas build.
///
/// One explicit value is threaded through every operation of a build;
/// there are no processor-level defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Padding inflated around each trimmed sprite, in pixels
    pub padding: u32,
    /// Treat pixels matching `color_key` as empty when trimming
    pub color_key_enabled: bool,
    /// Key color as RGBA
    pub color_key: [u8; 4],
    /// Maximum atlas width in pixels
    pub max_width: u32,
    /// Maximum atlas height in pixels
    pub max_height: u32,
    /// Allow 90-degree rotated placements
    pub allow_flip: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            padding: 0,
            color_key_enabled: true,
            color_key: [255, 0, 255, 255],
            max_width: 4096,
            max_height: 4096,
            allow_flip: false,
        }
    }
}

impl PackConfig {
    /// The key color to trim against, or `None` when color keying is off
    pub(crate) fn key(&self) -> Option<Rgba<u8>> {
        self.color_key_enabled.then(|| Rgba(self.color_key))
    }

    pub(crate) fn max_width_px(&self) -> i32 {
        i32::try_from(self.max_width).unwrap_or(i32::MAX)
    }

    pub(crate) fn max_height_px(&self) -> i32 {
        i32::try_from(self.max_height).unwrap_or(i32::MAX)
    }
}
