//! Typed style values and their textual forms.

use anyhow::{Context as _, Result, anyhow, bail};

/// Unit of a [`Size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SizeUnit {
    /// Not specified. Layout treats the dimension as undefined.
    #[default]
    None,
    /// Device pixels
    Px,
    /// Typographic points, scaled by the configured pt-to-pixel ratio
    Pt,
    /// Eye pixels: device independent, scaled by the configured ep-to-pixel ratio
    Ep,
    /// Percentage of the containing dimension
    Percent,
}

/// A dimension as written in style, before it is resolved against a container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub unit: SizeUnit,
    pub value: f32,
}

impl Size {
    pub const NONE: Self = Self { unit: SizeUnit::None, value: 0.0 };

    #[inline]
    pub const fn px(value: f32) -> Self {
        Self { unit: SizeUnit::Px, value }
    }

    #[inline]
    pub const fn pt(value: f32) -> Self {
        Self { unit: SizeUnit::Pt, value }
    }

    #[inline]
    pub const fn ep(value: f32) -> Self {
        Self { unit: SizeUnit::Ep, value }
    }

    #[inline]
    pub const fn percent(value: f32) -> Self {
        Self { unit: SizeUnit::Percent, value }
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self.unit, SizeUnit::None)
    }

    /// Parse `20px`, `12pt`, `3ep`, `50%`, a bare `0`, or `none`/`auto`.
    ///
    /// # Errors
    /// Returns an error for malformed numbers and unrecognized units.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("auto") {
            return Ok(Self::NONE);
        }
        let split = text
            .find(|character: char| !(character.is_ascii_digit() || matches!(character, '.' | '-' | '+')))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let value: f32 = number
            .parse()
            .with_context(|| format!("invalid number in size `{text}`"))?;
        let unit = match unit {
            "px" => SizeUnit::Px,
            "pt" => SizeUnit::Pt,
            "ep" => SizeUnit::Ep,
            "%" => SizeUnit::Percent,
            "" if value == 0.0 => SizeUnit::Px,
            other => bail!("unrecognized size unit `{other}` in `{text}`"),
        };
        Ok(Self { unit, value })
    }
}

/// Which insets a specified width/height already includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum BoxSizing {
    /// The size is the content box only
    #[default]
    Content,
    /// The size includes padding and border
    Border,
    /// The size includes margin, padding and border
    Margin,
}

/// Forced line break around a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum BreakType {
    #[default]
    None,
    Before,
    After,
}

/// Whether a node starts its own flow context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FlowContext {
    /// Children flow as part of the nearest ancestor flow context
    #[default]
    Inject,
    /// Line breaking and restarts are contained within this node
    New,
}

/// Horizontal anchor on a parent, named by a child's binding category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum HorizontalBinding {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Vertical anchor on a parent, named by a child's binding category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum VerticalBinding {
    #[default]
    None,
    Top,
    Center,
    Bottom,
    Baseline,
}

impl HorizontalBinding {
    /// # Errors
    /// Returns an error for unknown keywords.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(match text.trim() {
            "none" => Self::None,
            "left" => Self::Left,
            "center" | "hcenter" => Self::Center,
            "right" => Self::Right,
            other => bail!("unknown horizontal binding `{other}`"),
        })
    }
}

impl VerticalBinding {
    /// # Errors
    /// Returns an error for unknown keywords.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(match text.trim() {
            "none" => Self::None,
            "top" => Self::Top,
            "center" | "vcenter" => Self::Center,
            "bottom" => Self::Bottom,
            "baseline" => Self::Baseline,
            other => bail!("unknown vertical binding `{other}`"),
        })
    }
}

/// Straight-alpha RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    #[inline]
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    ///
    /// # Errors
    /// Returns an error if the text is not a hex colour.
    pub fn parse(text: &str) -> Result<Self> {
        let hex = text
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("colour `{text}` must start with '#'"))?;
        let digits: Vec<u8> = hex
            .chars()
            .map(|character| {
                character
                    .to_digit(16)
                    .map(|digit| digit as u8)
                    .ok_or_else(|| anyhow!("invalid hex digit in colour `{text}`"))
            })
            .collect::<Result<_>>()?;
        let channel = |high: u8, low: u8| high * 16 + low;
        Ok(match *digits.as_slice() {
            [red, green, blue] => Self::rgba(red * 17, green * 17, blue * 17, 255),
            [red, green, blue, alpha] => Self::rgba(red * 17, green * 17, blue * 17, alpha * 17),
            [r1, r0, g1, g0, b1, b0] => Self::rgba(channel(r1, r0), channel(g1, g0), channel(b1, b0), 255),
            [r1, r0, g1, g0, b1, b0, a1, a0] => {
                Self::rgba(channel(r1, r0), channel(g1, g0), channel(b1, b0), channel(a1, a0))
            }
            _ => bail!("colour `{text}` must have 3, 4, 6 or 8 hex digits"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sizes parse with every supported unit.
    ///
    /// # Panics
    /// Panics if a size parses to the wrong unit or value.
    #[test]
    fn parse_sizes() -> Result<()> {
        assert_eq!(Size::parse("20px")?, Size::px(20.0));
        assert_eq!(Size::parse("12pt")?, Size::pt(12.0));
        assert_eq!(Size::parse("1.5ep")?, Size::ep(1.5));
        assert_eq!(Size::parse("50%")?, Size::percent(50.0));
        assert_eq!(Size::parse("0")?, Size::px(0.0));
        assert!(Size::parse("auto")?.is_none());
        Ok(())
    }

    /// Unknown units are rejected at parse time.
    ///
    /// # Panics
    /// Panics if a bad unit is accepted.
    #[test]
    fn reject_unknown_unit() -> Result<()> {
        let Err(error) = Size::parse("10furlongs") else {
            bail!("`10furlongs` parsed");
        };
        let message = format!("{error:#}");
        assert!(message.contains("unrecognized size unit"), "{message}");
        assert!(Size::parse("12").is_err());
        Ok(())
    }

    /// Colours parse in short and long hex forms.
    ///
    /// # Panics
    /// Panics if a colour parses to the wrong channels.
    #[test]
    fn parse_colors() -> Result<()> {
        assert_eq!(Color::parse("#faa")?, Color::rgba(255, 170, 170, 255));
        assert_eq!(Color::parse("#afa8")?, Color::rgba(170, 255, 170, 136));
        assert_eq!(Color::parse("#102030")?, Color::rgba(16, 32, 48, 255));
        assert!(Color::parse("red").is_err());
        Ok(())
    }
}
