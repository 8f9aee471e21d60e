//! Fonts and glyph metrics for text layout.

pub mod cache;
pub mod font;

pub use cache::{Glyph, GlyphCache, GlyphCacheKey, GlyphSource, Rasterize, SyntheticRasterizer};
pub use font::{Font, FontStore};
