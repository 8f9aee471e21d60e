//! Rectangles and points in fixed-point device units.

use crate::Pos;

/// A 2D offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: Pos,
    pub y: Pos,
}

impl Point {
    #[inline]
    pub const fn new(x: Pos, y: Pos) -> Self {
        Self { x, y }
    }
}

/// An edge-based rectangle. Also used for the four insets of margin, border and padding,
/// in which case each field is the thickness of that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PosBox {
    pub left: Pos,
    pub top: Pos,
    pub right: Pos,
    pub bottom: Pos,
}

impl PosBox {
    #[inline]
    pub const fn new(left: Pos, top: Pos, right: Pos, bottom: Pos) -> Self {
        Self { left, top, right, bottom }
    }

    /// Rectangle with its top-left corner at `(left, top)` and the given size.
    #[inline]
    pub fn from_origin_size(left: Pos, top: Pos, width: Pos, height: Pos) -> Self {
        Self { left, top, right: left + width, bottom: top + height }
    }

    #[inline]
    pub fn width(&self) -> Pos {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> Pos {
        self.bottom - self.top
    }

    /// Translate the rectangle without changing its size.
    #[inline]
    pub fn offset(&mut self, dx: Pos, dy: Pos) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    /// Add two inset boxes side by side.
    #[inline]
    #[must_use]
    pub fn piecewise_sum(&self, other: &Self) -> Self {
        Self {
            left: self.left + other.left,
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
        }
    }

    /// Shrink the rectangle inwards by the given insets.
    #[inline]
    #[must_use]
    pub fn shrunk_by(&self, insets: &Self) -> Self {
        Self {
            left: self.left + insets.left,
            top: self.top + insets.top,
            right: self.right - insets.right,
            bottom: self.bottom - insets.bottom,
        }
    }

    /// Sum of the left and right insets.
    #[inline]
    pub fn horizontal(&self) -> Pos {
        self.left + self.right
    }

    /// Sum of the top and bottom insets.
    #[inline]
    pub fn vertical(&self) -> Pos {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: i32) -> Pos {
        Pos::from_px_i32(value)
    }

    /// Shrinking a margin box by its insets yields the content box.
    ///
    /// # Panics
    /// Panics if the content box edges are wrong.
    #[test]
    fn shrink_margin_box_to_content() {
        let margin_box = PosBox::from_origin_size(px(10), px(20), px(100), px(50));
        let insets = PosBox::new(px(1), px(2), px(3), px(4));
        let content = margin_box.shrunk_by(&insets);
        assert_eq!(content, PosBox::new(px(11), px(22), px(107), px(66)));
        assert_eq!(content.width(), px(96));
        assert_eq!(content.height(), px(44));
    }

    /// Offsetting preserves size and piecewise sums add each side.
    ///
    /// # Panics
    /// Panics if the translation or sum is wrong.
    #[test]
    fn offset_and_sum() {
        let mut rect = PosBox::from_origin_size(px(0), px(0), px(5), px(5));
        rect.offset(px(3), px(-2));
        assert_eq!(rect, PosBox::new(px(3), px(-2), px(8), px(3)));

        let sum = PosBox::new(px(1), px(1), px(1), px(1)).piecewise_sum(&PosBox::new(px(2), px(3), px(4), px(5)));
        assert_eq!(sum.horizontal(), px(8));
        assert_eq!(sum.vertical(), px(10));
    }
}
