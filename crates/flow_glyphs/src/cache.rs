//! Glyph cache keyed by font, size and subpixel mode.

use crate::font::{Font, FontStore};
use anyhow::{Context as _, Result};
use flow_units::FontId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Identifies one rendered glyph. Equal keys always yield identical metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphCacheKey {
    pub font_id: FontId,
    /// Always zero. Kept so the key layout has room for a rendering variant.
    pub reserved: u8,
    pub size_px: u16,
    pub subpixel: bool,
    pub character: char,
}

impl GlyphCacheKey {
    pub const fn new(font_id: FontId, size_px: u16, subpixel: bool, character: char) -> Self {
        Self {
            font_id,
            reserved: 0,
            size_px,
            subpixel,
            character,
        }
    }
}

/// Placement metrics of a rendered glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    pub glyph_index: u32,
    /// Offset from the pen position to the bitmap's left edge, 1/256px
    pub metric_left_x256: i32,
    /// Distance from the baseline up to the bitmap's top edge, whole pixels
    pub metric_top: i32,
    /// Hinted advance, whole pixels
    pub metric_hori_advance: i32,
    /// Unhinted advance, 1/256px
    pub metric_linear_hori_advance_x256: i32,
    /// Present in the cache but without an outline; nothing is drawn
    pub is_null: bool,
}

/// Glyph lookups used by text layout.
pub trait GlyphSource: Send + Sync {
    /// Metrics of an already rendered glyph, or `None` if it must be rendered first.
    fn get_glyph(&self, key: &GlyphCacheKey) -> Option<Glyph>;

    /// Render a glyph so that subsequent `get_glyph` calls find it.
    ///
    /// # Errors
    /// Returns an error if the font is unknown or rasterization fails.
    fn render_glyph(&self, key: &GlyphCacheKey) -> Result<()>;
}

/// Backend producing glyph metrics for a font at a given size.
pub trait Rasterize: Send + Sync {
    /// # Errors
    /// Returns an error if the glyph cannot be produced.
    fn rasterize(&self, font: &Font, key: &GlyphCacheKey) -> Result<Glyph>;
}

/// Thread-safe glyph cache that renders on demand through a [`Rasterize`] backend.
#[derive(Debug)]
pub struct GlyphCache<R> {
    fonts: Arc<FontStore>,
    rasterizer: R,
    glyphs: RwLock<HashMap<GlyphCacheKey, Glyph>>,
}

impl<R: Rasterize> GlyphCache<R> {
    pub fn new(fonts: Arc<FontStore>, rasterizer: R) -> Self {
        Self {
            fonts,
            rasterizer,
            glyphs: RwLock::new(HashMap::new()),
        }
    }

    pub fn fonts(&self) -> &Arc<FontStore> {
        &self.fonts
    }

    pub fn len(&self) -> usize {
        self.glyphs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Rasterize> GlyphSource for GlyphCache<R> {
    fn get_glyph(&self, key: &GlyphCacheKey) -> Option<Glyph> {
        self.glyphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    fn render_glyph(&self, key: &GlyphCacheKey) -> Result<()> {
        if self.get_glyph(key).is_some() {
            return Ok(());
        }
        let font = self
            .fonts
            .get(key.font_id)
            .with_context(|| format!("font {:?} is not registered", key.font_id))?;
        let glyph = self
            .rasterizer
            .rasterize(&font, key)
            .with_context(|| format!("rendering {:?} at {}px", key.character, key.size_px))?;
        tracing::debug!(
            character = ?key.character,
            size = key.size_px,
            subpixel = key.subpixel,
            advance = glyph.metric_hori_advance,
            "rendered glyph"
        );
        self.glyphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(*key, glyph);
        Ok(())
    }
}

/// Deterministic metrics without font files: every printable character gets
/// the same advance, proportional to the font size. Whitespace and control
/// characters render as null glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticRasterizer {
    /// Advance per pixel of font size, 1/256px
    pub advance_x256: i32,
}

impl Default for SyntheticRasterizer {
    fn default() -> Self {
        Self { advance_x256: 154 }
    }
}

impl Rasterize for SyntheticRasterizer {
    fn rasterize(&self, font: &Font, key: &GlyphCacheKey) -> Result<Glyph> {
        let size = i32::from(key.size_px);
        let linear = self.advance_x256 * size;
        Ok(Glyph {
            glyph_index: u32::from(key.character),
            metric_left_x256: 0,
            metric_top: (font.ascender_x256 * size) >> 8,
            metric_hori_advance: (linear + 255) >> 8,
            metric_linear_hori_advance_x256: linear,
            is_null: key.character.is_whitespace() || key.character.is_control(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> GlyphCache<SyntheticRasterizer> {
        let fonts = Arc::new(FontStore::new());
        fonts.register(Font::sans("Sans"));
        GlyphCache::new(fonts, SyntheticRasterizer::default())
    }

    /// Glyphs are missing until rendered, then stable.
    ///
    /// # Panics
    /// Panics if a glyph is found before rendering or changes afterwards.
    #[test]
    fn render_on_demand() -> Result<()> {
        let cache = cache();
        let key = GlyphCacheKey::new(FontId(0), 10, true, 'a');
        assert!(cache.get_glyph(&key).is_none());

        cache.render_glyph(&key)?;
        let glyph = cache.get_glyph(&key);
        assert_eq!(glyph.map(|glyph| glyph.metric_linear_hori_advance_x256), Some(1540));
        assert_eq!(glyph.map(|glyph| glyph.metric_hori_advance), Some(7));
        assert_eq!(glyph.map(|glyph| glyph.metric_top), Some(8));

        cache.render_glyph(&key)?;
        assert_eq!(cache.get_glyph(&key), glyph);
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    /// Subpixel mode is part of the key, and unknown fonts fail to render.
    ///
    /// # Panics
    /// Panics if keys collide or an unknown font renders.
    #[test]
    fn key_identity_and_errors() -> Result<()> {
        let cache = cache();
        cache.render_glyph(&GlyphCacheKey::new(FontId(0), 10, true, 'a'))?;
        assert!(cache.get_glyph(&GlyphCacheKey::new(FontId(0), 10, false, 'a')).is_none());

        let error = cache.render_glyph(&GlyphCacheKey::new(FontId(3), 10, true, 'a'));
        assert!(error.is_err());

        cache.render_glyph(&GlyphCacheKey::new(FontId(0), 10, true, ' '))?;
        let space = cache.get_glyph(&GlyphCacheKey::new(FontId(0), 10, true, ' '));
        assert_eq!(space.map(|glyph| glyph.is_null), Some(true));
        Ok(())
    }
}
