//! Layout switches and unit ratios.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

/// Settings that affect where boxes and glyphs land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Round specified box widths and heights up to whole pixels.
    pub snap_boxes: bool,
    /// Use hinted whole-pixel advances and round the space width.
    pub snap_subpixel_horz_text: bool,
    pub enable_kerning: bool,
    pub enable_subpixel_text: bool,
    /// Largest font size, in pixels, rendered with subpixel glyphs.
    pub max_subpixel_glyph_size: u16,
    /// Round line heights up to whole pixels. Derived when unset.
    pub round_line_heights: Option<bool>,
    pub ep_to_pixel: f32,
    pub pt_to_pixel: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            snap_boxes: true,
            snap_subpixel_horz_text: true,
            enable_kerning: true,
            enable_subpixel_text: true,
            max_subpixel_glyph_size: 60,
            round_line_heights: None,
            ep_to_pixel: 1.0,
            pt_to_pixel: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Load from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid configuration object.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing layout configuration")
    }

    /// Line heights are rounded when glyphs are positioned at subpixel
    /// offsets or the display is low density, unless overridden.
    pub fn round_line_heights(&self) -> bool {
        self.round_line_heights
            .unwrap_or(self.enable_subpixel_text || self.ep_to_pixel < 2.0)
    }
}
