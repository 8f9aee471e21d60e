//! Style values, declared style sets and the resolved style stack read by layout.

pub mod category;
pub mod set;
pub mod stack;
pub mod values;

pub use category::{BoxCategory, StyleAttrib, StyleCategory};
pub use set::StyleSet;
pub use stack::{SizeBox, StyleStack};
pub use values::{
    BoxSizing, BreakType, Color, FlowContext, HorizontalBinding, Size, SizeUnit, VerticalBinding,
};
