//! Fixed-point geometry shared by style resolution, layout and the render tree.

pub mod geometry;
pub mod pos;

pub use geometry::{Point, PosBox};
pub use pos::Pos;

/// Identifier of a font registered with the font store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct FontId(pub u16);
