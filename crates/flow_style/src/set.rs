//! A node's declared style, and the declaration parser used to build it.

use crate::category::{BoxCategory, StyleAttrib, StyleCategory};
use crate::values::{BoxSizing, BreakType, Color, FlowContext, HorizontalBinding, Size, VerticalBinding};
use anyhow::{Context as _, Result, bail};
use flow_units::FontId;
use smallvec::SmallVec;

/// Declared attributes of one node. Later declarations of the same category win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSet {
    entries: SmallVec<(StyleCategory, StyleAttrib), 8>,
}

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of `name: value` declarations separated by `;`.
    ///
    /// # Errors
    /// Returns an error naming the first declaration that cannot be parsed.
    pub fn parse(text: &str) -> Result<Self> {
        let mut set = Self::new();
        set.parse_into(text)?;
        Ok(set)
    }

    /// Parse declarations into this set, overriding existing values.
    ///
    /// # Errors
    /// Returns an error naming the first declaration that cannot be parsed.
    pub fn parse_into(&mut self, text: &str) -> Result<()> {
        for declaration in text.split(';').map(str::trim).filter(|decl| !decl.is_empty()) {
            let Some((name, value)) = declaration.split_once(':') else {
                bail!("declaration `{declaration}` is missing ':'");
            };
            self.parse_declaration(name.trim(), value.trim())
                .with_context(|| format!("in declaration `{declaration}`"))?;
        }
        Ok(())
    }

    fn parse_declaration(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "margin" => self.set_box_shorthand(BoxCategory::Margin, value)?,
            "padding" => self.set_box_shorthand(BoxCategory::Padding, value)?,
            "border" => self.set_box_shorthand(BoxCategory::Border, value)?,
            "width" => self.set_size(StyleCategory::Width, value)?,
            "height" => self.set_size(StyleCategory::Height, value)?,
            "border-radius" => self.set_size(StyleCategory::BorderRadius, value)?,
            "font-size" => self.set_size(StyleCategory::FontSize, value)?,
            "font-family" => {
                let id: u16 = value.parse().context("font-family expects a registered font id")?;
                self.set(StyleCategory::FontFamily, StyleAttrib::Font(FontId(id)));
            }
            "box-sizing" => {
                let sizing = match value {
                    "content" | "content-box" => BoxSizing::Content,
                    "border" | "border-box" => BoxSizing::Border,
                    "margin" | "margin-box" => BoxSizing::Margin,
                    other => bail!("unknown box-sizing `{other}`"),
                };
                self.set(StyleCategory::BoxSizing, StyleAttrib::BoxSizing(sizing));
            }
            "break" => {
                let kind = match value {
                    "none" => BreakType::None,
                    "before" => BreakType::Before,
                    "after" => BreakType::After,
                    other => bail!("unknown break `{other}`"),
                };
                self.set(StyleCategory::Break, StyleAttrib::Break(kind));
            }
            "flow-context" => {
                let context = match value {
                    "inject" => FlowContext::Inject,
                    "new" => FlowContext::New,
                    other => bail!("unknown flow-context `{other}`"),
                };
                self.set(StyleCategory::FlowContext, StyleAttrib::FlowContext(context));
            }
            "color" => self.set(StyleCategory::Color, StyleAttrib::Color(Color::parse(value)?)),
            "background" => self.set(StyleCategory::Background, StyleAttrib::Color(Color::parse(value)?)),
            "border-color" => self.set(StyleCategory::BorderColor, StyleAttrib::Color(Color::parse(value)?)),
            "left" => self.set_hbind(StyleCategory::Left, value)?,
            "hcenter" => self.set_hbind(StyleCategory::HCenter, value)?,
            "right" => self.set_hbind(StyleCategory::Right, value)?,
            "top" => self.set_vbind(StyleCategory::Top, value)?,
            "vcenter" => self.set_vbind(StyleCategory::VCenter, value)?,
            "bottom" => self.set_vbind(StyleCategory::Bottom, value)?,
            "baseline" => self.set_vbind(StyleCategory::Baseline, value)?,
            _ => {
                if let Some((category, side)) = Self::side_category(name) {
                    self.set_size(category.sides()[side], value)?;
                } else {
                    bail!("unknown style property `{name}`");
                }
            }
        }
        Ok(())
    }

    /// Map `margin-left`, `border-top`, ... to their box group and side index.
    fn side_category(name: &str) -> Option<(BoxCategory, usize)> {
        let (group, side) = name.split_once('-')?;
        let group = match group {
            "margin" => BoxCategory::Margin,
            "padding" => BoxCategory::Padding,
            "border" => BoxCategory::Border,
            _ => return None,
        };
        let side = match side {
            "left" => 0,
            "top" => 1,
            "right" => 2,
            "bottom" => 3,
            _ => return None,
        };
        Some((group, side))
    }

    /// CSS-style one to four value shorthand (top, right, bottom, left ordering).
    fn set_box_shorthand(&mut self, group: BoxCategory, value: &str) -> Result<()> {
        let sizes = value.split_whitespace().map(Size::parse).collect::<Result<Vec<_>>>()?;
        let (top, right, bottom, left) = match *sizes.as_slice() {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => bail!("expected one to four sizes"),
        };
        let [left_cat, top_cat, right_cat, bottom_cat] = group.sides();
        self.set(left_cat, StyleAttrib::Size(left));
        self.set(top_cat, StyleAttrib::Size(top));
        self.set(right_cat, StyleAttrib::Size(right));
        self.set(bottom_cat, StyleAttrib::Size(bottom));
        Ok(())
    }

    fn set_size(&mut self, category: StyleCategory, value: &str) -> Result<()> {
        self.set(category, StyleAttrib::Size(Size::parse(value)?));
        Ok(())
    }

    fn set_hbind(&mut self, category: StyleCategory, value: &str) -> Result<()> {
        self.set(category, StyleAttrib::HorizontalBinding(HorizontalBinding::parse(value)?));
        Ok(())
    }

    fn set_vbind(&mut self, category: StyleCategory, value: &str) -> Result<()> {
        self.set(category, StyleAttrib::VerticalBinding(VerticalBinding::parse(value)?));
        Ok(())
    }

    /// Declare a value, replacing any earlier declaration of the same category.
    pub fn set(&mut self, category: StyleCategory, attrib: StyleAttrib) {
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == category) {
            entry.1 = attrib;
        } else {
            self.entries.push((category, attrib));
        }
    }

    /// Builder form of [`StyleSet::set`].
    #[must_use]
    pub fn with(mut self, category: StyleCategory, attrib: StyleAttrib) -> Self {
        self.set(category, attrib);
        self
    }

    pub fn get(&self, category: StyleCategory) -> Option<StyleAttrib> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == category)
            .map(|&(_, attrib)| attrib)
    }

    pub fn contains(&self, category: StyleCategory) -> bool {
        self.get(category).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shorthands expand to the four sides.
    ///
    /// # Panics
    /// Panics if a side has the wrong size.
    #[test]
    fn box_shorthand_expands() -> Result<()> {
        let set = StyleSet::parse("margin: 20px; padding: 1px 2px; border-left: 3px")?;
        assert_eq!(set.get(StyleCategory::MarginBottom), Some(StyleAttrib::Size(Size::px(20.0))));
        assert_eq!(set.get(StyleCategory::PaddingTop), Some(StyleAttrib::Size(Size::px(1.0))));
        assert_eq!(set.get(StyleCategory::PaddingLeft), Some(StyleAttrib::Size(Size::px(2.0))));
        assert_eq!(set.get(StyleCategory::BorderLeft), Some(StyleAttrib::Size(Size::px(3.0))));
        assert!(!set.contains(StyleCategory::BorderTop));
        Ok(())
    }

    /// Keyword properties and bindings parse to their enums.
    ///
    /// # Panics
    /// Panics if a keyword maps to the wrong value.
    #[test]
    fn keywords_parse() -> Result<()> {
        let set = StyleSet::parse(
            "box-sizing: border; break: after; flow-context: new; left: left; right: right; baseline: baseline",
        )?;
        assert_eq!(set.get(StyleCategory::BoxSizing), Some(StyleAttrib::BoxSizing(BoxSizing::Border)));
        assert_eq!(set.get(StyleCategory::Break), Some(StyleAttrib::Break(BreakType::After)));
        assert_eq!(set.get(StyleCategory::FlowContext), Some(StyleAttrib::FlowContext(FlowContext::New)));
        assert_eq!(
            set.get(StyleCategory::Right),
            Some(StyleAttrib::HorizontalBinding(HorizontalBinding::Right))
        );
        assert_eq!(
            set.get(StyleCategory::Baseline),
            Some(StyleAttrib::VerticalBinding(VerticalBinding::Baseline))
        );
        Ok(())
    }

    /// Later declarations override earlier ones and errors name the declaration.
    ///
    /// # Panics
    /// Panics if overriding fails or a bad declaration is accepted.
    #[test]
    fn override_and_errors() -> Result<()> {
        let mut set = StyleSet::parse("width: 10px")?;
        set.parse_into("width: 50%")?;
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(StyleCategory::Width), Some(StyleAttrib::Size(Size::percent(50.0))));

        let Err(error) = StyleSet::parse("width: 10zz") else {
            bail!("`width: 10zz` parsed");
        };
        let message = format!("{error:#}");
        assert!(message.contains("width: 10zz"), "{message}");
        assert!(StyleSet::parse("wobble: 1px").is_err());
        assert!(StyleSet::parse("width 1px").is_err());
        Ok(())
    }
}
