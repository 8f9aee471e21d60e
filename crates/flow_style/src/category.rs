//! Style categories, the typed attribute stored for each, and initial values.

use crate::values::{BoxSizing, BreakType, Color, FlowContext, HorizontalBinding, Size, VerticalBinding};
use flow_units::FontId;

/// Every style property the layout reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleCategory {
    MarginLeft,
    MarginTop,
    MarginRight,
    MarginBottom,
    PaddingLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    BorderLeft,
    BorderTop,
    BorderRight,
    BorderBottom,
    Width,
    Height,
    BorderRadius,
    BoxSizing,
    Break,
    FlowContext,
    FontFamily,
    FontSize,
    Color,
    Background,
    BorderColor,
    /// Parent anchor for the child's left edge
    Left,
    /// Parent anchor for the child's horizontal center
    HCenter,
    /// Parent anchor for the child's right edge
    Right,
    /// Parent anchor for the child's top edge
    Top,
    /// Parent anchor for the child's vertical center
    VCenter,
    /// Parent anchor for the child's bottom edge
    Bottom,
    /// Parent anchor for the child's baseline
    Baseline,
}

/// Groups of four categories that form a box of insets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxCategory {
    Margin,
    Padding,
    Border,
}

impl BoxCategory {
    /// Categories in left, top, right, bottom order.
    pub const fn sides(self) -> [StyleCategory; 4] {
        match self {
            Self::Margin => [
                StyleCategory::MarginLeft,
                StyleCategory::MarginTop,
                StyleCategory::MarginRight,
                StyleCategory::MarginBottom,
            ],
            Self::Padding => [
                StyleCategory::PaddingLeft,
                StyleCategory::PaddingTop,
                StyleCategory::PaddingRight,
                StyleCategory::PaddingBottom,
            ],
            Self::Border => [
                StyleCategory::BorderLeft,
                StyleCategory::BorderTop,
                StyleCategory::BorderRight,
                StyleCategory::BorderBottom,
            ],
        }
    }
}

impl StyleCategory {
    /// Categories whose value is taken from the nearest ancestor when a node does not declare one.
    pub const fn is_inherited(self) -> bool {
        matches!(self, Self::FontFamily | Self::FontSize | Self::Color)
    }

    /// All categories that do not inherit.
    pub const NON_INHERITED: [Self; 27] = [
        Self::MarginLeft,
        Self::MarginTop,
        Self::MarginRight,
        Self::MarginBottom,
        Self::PaddingLeft,
        Self::PaddingTop,
        Self::PaddingRight,
        Self::PaddingBottom,
        Self::BorderLeft,
        Self::BorderTop,
        Self::BorderRight,
        Self::BorderBottom,
        Self::Width,
        Self::Height,
        Self::BorderRadius,
        Self::BoxSizing,
        Self::Break,
        Self::FlowContext,
        Self::Background,
        Self::BorderColor,
        Self::Left,
        Self::HCenter,
        Self::Right,
        Self::Top,
        Self::VCenter,
        Self::Bottom,
        Self::Baseline,
    ];

    /// Value used when nothing in the cascade declares this category.
    pub const fn initial(self) -> StyleAttrib {
        match self {
            Self::MarginLeft
            | Self::MarginTop
            | Self::MarginRight
            | Self::MarginBottom
            | Self::PaddingLeft
            | Self::PaddingTop
            | Self::PaddingRight
            | Self::PaddingBottom
            | Self::BorderLeft
            | Self::BorderTop
            | Self::BorderRight
            | Self::BorderBottom
            | Self::BorderRadius => StyleAttrib::Size(Size::px(0.0)),
            Self::Width | Self::Height => StyleAttrib::Size(Size::NONE),
            Self::FontSize => StyleAttrib::Size(Size::px(12.0)),
            Self::BoxSizing => StyleAttrib::BoxSizing(BoxSizing::Content),
            Self::Break => StyleAttrib::Break(BreakType::None),
            Self::FlowContext => StyleAttrib::FlowContext(FlowContext::Inject),
            Self::FontFamily => StyleAttrib::Font(FontId(0)),
            Self::Color | Self::BorderColor => StyleAttrib::Color(Color::BLACK),
            Self::Background => StyleAttrib::Color(Color::TRANSPARENT),
            Self::Left | Self::HCenter | Self::Right => StyleAttrib::HorizontalBinding(HorizontalBinding::None),
            Self::Top | Self::VCenter | Self::Bottom | Self::Baseline => {
                StyleAttrib::VerticalBinding(VerticalBinding::None)
            }
        }
    }
}

/// A resolved value for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleAttrib {
    Size(Size),
    BoxSizing(BoxSizing),
    Break(BreakType),
    FlowContext(FlowContext),
    Font(FontId),
    Color(Color),
    HorizontalBinding(HorizontalBinding),
    VerticalBinding(VerticalBinding),
}

impl StyleAttrib {
    pub fn size(&self) -> Size {
        match *self {
            Self::Size(size) => size,
            other => mismatched(other, "size"),
        }
    }

    pub fn box_sizing(&self) -> BoxSizing {
        match *self {
            Self::BoxSizing(sizing) => sizing,
            other => mismatched(other, "box-sizing"),
        }
    }

    pub fn break_type(&self) -> BreakType {
        match *self {
            Self::Break(kind) => kind,
            other => mismatched(other, "break"),
        }
    }

    pub fn flow_context(&self) -> FlowContext {
        match *self {
            Self::FlowContext(context) => context,
            other => mismatched(other, "flow-context"),
        }
    }

    pub fn font(&self) -> FontId {
        match *self {
            Self::Font(font) => font,
            other => mismatched(other, "font"),
        }
    }

    pub fn color(&self) -> Color {
        match *self {
            Self::Color(color) => color,
            other => mismatched(other, "color"),
        }
    }

    pub fn horizontal_binding(&self) -> HorizontalBinding {
        match *self {
            Self::HorizontalBinding(binding) => binding,
            other => mismatched(other, "horizontal binding"),
        }
    }

    pub fn vertical_binding(&self) -> VerticalBinding {
        match *self {
            Self::VerticalBinding(binding) => binding,
            other => mismatched(other, "vertical binding"),
        }
    }
}

/// A category was stored with a value of the wrong kind. Only reachable if a
/// `StyleSet` was built by hand with an inconsistent pair.
#[cold]
#[expect(clippy::panic, reason = "each category stores exactly one attribute kind")]
fn mismatched(found: StyleAttrib, expected: &str) -> ! {
    panic!("style attribute {found:?} read as {expected}");
}
