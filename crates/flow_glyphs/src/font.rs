//! Font metrics and the process-wide font store.

use flow_units::FontId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Scalable font metrics. Values suffixed `_x256` are per pixel of font size
/// in 1/256px, so multiplying by a font size in pixels gives a `Pos` raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub name: String,
    pub ascender_x256: i32,
    pub line_height_x256: i32,
    pub linear_hori_advance_space_x256: i32,
    pub units_per_em: i32,
    /// Kerning between glyph index pairs, in font units.
    pub kerning: HashMap<(u32, u32), i32>,
}

impl Font {
    /// Proportions typical of a sans-serif face: 0.8em ascender, 1.2em line
    /// height and a 0.3em space.
    pub fn sans(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ascender_x256: 205,
            line_height_x256: 307,
            linear_hori_advance_space_x256: 77,
            units_per_em: 1000,
            kerning: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_kerning(mut self, left_glyph: u32, right_glyph: u32, amount: i32) -> Self {
        self.kerning.insert((left_glyph, right_glyph), amount);
        self
    }

    /// Kerning adjustment between two glyphs in font units, zero when the pair has none.
    pub fn kerning(&self, left_glyph: u32, right_glyph: u32) -> i32 {
        self.kerning.get(&(left_glyph, right_glyph)).copied().unwrap_or(0)
    }
}

/// Registered fonts, indexed by `FontId`.
#[derive(Debug, Default)]
pub struct FontStore {
    fonts: RwLock<Vec<Arc<Font>>>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font and return its id, or `None` once every `FontId` is taken.
    pub fn register(&self, font: Font) -> Option<FontId> {
        let mut fonts = self.fonts.write().unwrap_or_else(PoisonError::into_inner);
        let Ok(index) = u16::try_from(fonts.len()) else {
            tracing::warn!(font = %font.name, "font store is full");
            return None;
        };
        tracing::debug!(font = %font.name, id = index, "registered font");
        fonts.push(Arc::new(font));
        Some(FontId(index))
    }

    pub fn get(&self, id: FontId) -> Option<Arc<Font>> {
        self.fonts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(usize::from(id.0))
            .map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.fonts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
