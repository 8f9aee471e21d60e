//! Device-pixel coordinates using fixed-point arithmetic.
//!
//! Layout never works in floating point once a style value has been resolved.
//! Every coordinate is stored in 1/256px units inside an `i32`, which keeps the
//! placement of boxes and glyphs bit-reproducible across passes.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Fixed-point device coordinate in 1/256px units.
///
/// An undefined coordinate ("size from content", "no baseline") is expressed as
/// `Option<Pos>::None` by callers rather than with a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Pos(i32);

impl Pos {
    /// Number of fractional bits (8 bits = 1/256px precision)
    pub const FRACTIONAL_BITS: u32 = 8;

    /// Scale factor (2^8 = 256)
    pub const SCALE: i32 = 1 << Self::FRACTIONAL_BITS;

    /// Mask selecting the fractional part of a raw value.
    const FRACTION_MASK: i32 = Self::SCALE - 1;

    /// Zero value
    pub const ZERO: Self = Self(0);

    /// Largest whole-pixel value that fits
    pub const MAX_PX: i32 = i32::MAX >> Self::FRACTIONAL_BITS;

    /// Create from raw 1/256px units
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Create from pixels (f32), rounding to the nearest 1/256px.
    #[inline]
    pub fn from_px(pixels: f32) -> Self {
        Self((pixels * Self::SCALE as f32).round() as i32)
    }

    /// Create from whole pixels
    #[inline]
    pub const fn from_px_i32(pixels: i32) -> Self {
        Self(pixels * Self::SCALE)
    }

    /// Create from an unsigned pixel count such as a viewport size, clamping
    /// to [`Pos::MAX_PX`].
    #[inline]
    pub const fn from_px_saturating(pixels: u32) -> Self {
        if pixels > Self::MAX_PX as u32 {
            Self(Self::MAX_PX * Self::SCALE)
        } else {
            Self(pixels as i32 * Self::SCALE)
        }
    }

    /// Create from a value that font backends express in 1/256px (26.6 metrics
    /// widened to 24.8). With 8 fractional bits this is the raw value itself.
    #[inline]
    pub const fn from_x256(value: i32) -> Self {
        Self(value)
    }

    /// Convert to pixels (f32)
    #[inline]
    pub const fn to_px(self) -> f32 {
        self.0 as f32 / Self::SCALE as f32
    }

    /// Get the raw 1/256px value
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Round up to the next whole pixel. Whole-pixel values are returned unchanged,
    /// so applying this twice gives the same result as applying it once.
    #[inline]
    #[must_use]
    pub const fn round_up(self) -> Self {
        Self((self.0 + Self::FRACTION_MASK) & !Self::FRACTION_MASK)
    }

    /// Round to the nearest whole pixel (halves round up).
    #[inline]
    #[must_use]
    pub const fn round(self) -> Self {
        Self((self.0 + Self::SCALE / 2) & !Self::FRACTION_MASK)
    }

    /// Larger of two positions
    #[inline]
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self.0 >= other.0 { self } else { other }
    }

    /// Smaller of two positions
    #[inline]
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

// Arithmetic operations
impl Add for Pos {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Pos {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Pos {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Pos {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Pos {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i32> for Pos {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self(self.0 * rhs)
    }
}

impl Mul<f32> for Pos {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self((self.0 as f32 * rhs).round() as i32)
    }
}

impl Div<i32> for Pos {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i32) -> Self {
        Self(self.0 / rhs)
    }
}

impl Sum for Pos {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
