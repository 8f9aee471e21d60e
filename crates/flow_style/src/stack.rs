//! The resolved style stack read by layout, one frame per node entered.

use crate::category::{BoxCategory, StyleAttrib, StyleCategory};
use crate::set::StyleSet;
use crate::values::Size;
use log::trace;

/// Four sizes in left, top, right, bottom order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeBox {
    pub left: Size,
    pub top: Size,
    pub right: Size,
    pub bottom: Size,
}

/// Ordered push/pop stack of resolved attribute sets.
///
/// Non-inherited categories are filled with their initial value when a frame
/// is pushed, so a lookup only walks past a frame for inherited categories.
#[derive(Debug, Default)]
pub struct StyleStack {
    frames: Vec<StyleSet>,
}

impl StyleStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the resolved style of the node being entered.
    pub fn resolve_and_push(&mut self, declared: &StyleSet) {
        let mut resolved = declared.clone();
        for category in StyleCategory::NON_INHERITED {
            if !resolved.contains(category) {
                resolved.set(category, category.initial());
            }
        }
        self.frames.push(resolved);
        trace!(target: "flow::style", "push depth={}", self.frames.len());
    }

    /// Pop the frame of the node being left.
    pub fn pop(&mut self) {
        if self.frames.pop().is_none() {
            unbalanced_pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// First value found walking from the top frame down, or the initial value.
    pub fn get(&self, category: StyleCategory) -> StyleAttrib {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(category))
            .unwrap_or_else(|| category.initial())
    }

    pub fn get_box(&self, group: BoxCategory) -> SizeBox {
        let [left, top, right, bottom] = group.sides().map(|side| self.get(side).size());
        SizeBox { left, top, right, bottom }
    }
}

#[cold]
#[expect(clippy::panic, reason = "push and pop must be balanced by the tree walk")]
fn unbalanced_pop() -> ! {
    panic!("style stack popped while empty");
}
