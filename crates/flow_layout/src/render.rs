//! Positioned render tree produced by a layout pass.
//!
//! Elements live in a flat arena that is cleared at the start of every pass.
//! Handles carry the pass they were issued in, so a handle kept from an older
//! pass is rejected instead of resolving to whatever now occupies its slot.

use flow_dom::{InternalId, Tag};
use flow_style::Color;
use flow_units::{FontId, Pos, PosBox};

/// Handle to an element of a [`RenderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderId {
    index: u32,
    pass: u32,
}

/// Style values the renderer needs alongside a box's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StyleSnapshot {
    pub background: Color,
    pub border_color: Color,
    pub border_radius: f32,
    pub border_size: PosBox,
    pub padding: PosBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub internal_id: InternalId,
    /// `None` for the document root that the body is attached to
    pub tag: Option<Tag>,
    /// Content box, relative to the parent's content box
    pub pos: PosBox,
    pub style: StyleSnapshot,
    children: Vec<u32>,
}

impl RenderNode {
    pub const fn new(internal_id: InternalId, tag: Option<Tag>) -> Self {
        Self {
            internal_id,
            tag,
            pos: PosBox::new(Pos::ZERO, Pos::ZERO, Pos::ZERO, Pos::ZERO),
            style: StyleSnapshot {
                background: Color::TRANSPARENT,
                border_color: Color::TRANSPARENT,
                border_radius: 0.0,
                border_size: PosBox::new(Pos::ZERO, Pos::ZERO, Pos::ZERO, Pos::ZERO),
                padding: PosBox::new(Pos::ZERO, Pos::ZERO, Pos::ZERO, Pos::ZERO),
            },
            children: Vec::new(),
        }
    }
}

/// A placed character. `x` and `y` are the top left of the glyph bitmap,
/// relative to the run's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderChar {
    pub code: char,
    pub x: Pos,
    pub y: Pos,
}

/// One line's worth of characters from a text node.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderText {
    pub internal_id: InternalId,
    pub pos: PosBox,
    pub font_id: FontId,
    pub font_size_px: u16,
    pub color: Color,
    pub subpixel: bool,
    pub chars: Vec<RenderChar>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderElement {
    Node(RenderNode),
    Text(RenderText),
}

impl RenderElement {
    pub const fn pos(&self) -> &PosBox {
        match self {
            Self::Node(node) => &node.pos,
            Self::Text(text) => &text.pos,
        }
    }

    pub const fn pos_mut(&mut self) -> &mut PosBox {
        match self {
            Self::Node(node) => &mut node.pos,
            Self::Text(text) => &mut text.pos,
        }
    }

    pub const fn as_node(&self) -> Option<&RenderNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Text(_) => None,
        }
    }

    pub const fn as_text(&self) -> Option<&RenderText> {
        match self {
            Self::Text(text) => Some(text),
            Self::Node(_) => None,
        }
    }
}

/// Arena of render elements, rooted at a document node at index 0.
#[derive(Debug, Clone)]
pub struct RenderTree {
    elements: Vec<RenderElement>,
    pass: u32,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Two trees are equal when their elements are, whichever pass built them.
impl PartialEq for RenderTree {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl RenderTree {
    pub fn new() -> Self {
        Self {
            elements: vec![Self::document_root()],
            pass: 0,
        }
    }

    fn document_root() -> RenderElement {
        RenderElement::Node(RenderNode::new(InternalId::default(), None))
    }

    /// Drop every element except a fresh root and invalidate all handles.
    pub fn reset(&mut self) {
        self.elements.clear();
        self.elements.push(Self::document_root());
        self.pass = self.pass.wrapping_add(1);
    }

    pub const fn root(&self) -> RenderId {
        RenderId { index: 0, pass: self.pass }
    }

    pub const fn pass(&self) -> u32 {
        self.pass
    }

    pub const fn len(&self) -> usize {
        self.elements.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn index_of(&self, id: RenderId) -> Option<usize> {
        let index = usize::try_from(id.index).ok()?;
        (id.pass == self.pass && index < self.elements.len()).then_some(index)
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderElement> {
        self.index_of(id).map(|index| &self.elements[index])
    }

    pub fn get_mut(&mut self, id: RenderId) -> Option<&mut RenderElement> {
        self.index_of(id).map(|index| &mut self.elements[index])
    }

    pub fn node(&self, id: RenderId) -> Option<&RenderNode> {
        self.get(id).and_then(RenderElement::as_node)
    }

    pub fn node_mut(&mut self, id: RenderId) -> Option<&mut RenderNode> {
        match self.get_mut(id)? {
            RenderElement::Node(node) => Some(node),
            RenderElement::Text(_) => None,
        }
    }

    pub fn text(&self, id: RenderId) -> Option<&RenderText> {
        self.get(id).and_then(RenderElement::as_text)
    }

    pub fn text_mut(&mut self, id: RenderId) -> Option<&mut RenderText> {
        match self.get_mut(id)? {
            RenderElement::Text(text) => Some(text),
            RenderElement::Node(_) => None,
        }
    }

    /// Children of a node in emission order. Empty for text and stale handles.
    pub fn children(&self, id: RenderId) -> impl Iterator<Item = RenderId> + '_ {
        let pass = self.pass;
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&index| RenderId { index, pass })
    }

    pub fn child_count(&self, id: RenderId) -> usize {
        self.node(id).map_or(0, |node| node.children.len())
    }

    fn push(&mut self, parent: RenderId, element: RenderElement) -> RenderId {
        let index = u32::try_from(self.elements.len()).unwrap_or_else(|_| arena_full());
        let Some(RenderElement::Node(parent_node)) = self.get_mut(parent) else {
            invalid_parent(parent);
        };
        parent_node.children.push(index);
        self.elements.push(element);
        RenderId { index, pass: self.pass }
    }

    /// Allocate a node and append it to `parent`.
    pub fn push_node(&mut self, parent: RenderId, node: RenderNode) -> RenderId {
        self.push(parent, RenderElement::Node(node))
    }

    /// Allocate a text run and append it to `parent`.
    pub fn push_text(&mut self, parent: RenderId, text: RenderText) -> RenderId {
        self.push(parent, RenderElement::Text(text))
    }

    /// Detach children past `len`. Their slots stay allocated until the next reset.
    pub fn truncate_children(&mut self, parent: RenderId, len: usize) {
        if let Some(node) = self.node_mut(parent) {
            node.children.truncate(len);
        }
    }

    /// Shift an element's top left corner by `delta` while keeping its
    /// children at the same absolute position.
    pub fn move_left_top(&mut self, id: RenderId, delta_x: Pos, delta_y: Pos) {
        let Some(element) = self.get_mut(id) else {
            return;
        };
        let pos = element.pos_mut();
        pos.left += delta_x;
        pos.top += delta_y;
        let children: Vec<RenderId> = self.children(id).collect();
        for child in children {
            if let Some(child_element) = self.get_mut(child) {
                child_element.pos_mut().offset(-delta_x, -delta_y);
            }
        }
    }
}

#[cold]
#[expect(clippy::panic, reason = "appending to a stale or text handle is a layout bug")]
fn invalid_parent(parent: RenderId) -> ! {
    panic!("render element {parent:?} cannot take children in this pass");
}

#[cold]
#[expect(clippy::panic, reason = "more than u32::MAX render elements cannot be addressed")]
fn arena_full() -> ! {
    panic!("render tree exceeded u32::MAX elements");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_run() -> RenderText {
        RenderText {
            internal_id: InternalId(4),
            pos: PosBox::default(),
            font_id: FontId(0),
            font_size_px: 12,
            color: Color::BLACK,
            subpixel: false,
            chars: Vec::new(),
        }
    }

    /// Handles from a previous pass are rejected after a reset.
    ///
    /// # Panics
    /// Panics if a stale handle still resolves.
    #[test]
    fn stale_handles_rejected() {
        let mut tree = RenderTree::new();
        let root = tree.root();
        let body = tree.push_node(root, RenderNode::new(InternalId(0), Some(Tag::Body)));
        assert!(tree.node(body).is_some());

        tree.reset();
        assert!(tree.get(body).is_none());
        assert!(tree.get(root).is_none());
        assert_eq!(tree.len(), 1);
        assert!(tree.get(tree.root()).is_some());
    }

    /// Truncation detaches children and `move_left_top` keeps them in place.
    ///
    /// # Panics
    /// Panics if children are not detached or move with their parent.
    #[test]
    fn truncate_and_move() {
        let mut tree = RenderTree::new();
        let root = tree.root();
        let div = tree.push_node(root, RenderNode::new(InternalId(1), Some(Tag::Div)));
        let run = tree.push_text(div, text_run());
        tree.push_text(div, text_run());
        assert_eq!(tree.child_count(div), 2);

        tree.truncate_children(div, 1);
        assert_eq!(tree.children(div).collect::<Vec<_>>(), vec![run]);

        tree.move_left_top(div, Pos::from_px_i32(-10), Pos::ZERO);
        assert_eq!(tree.get(div).map(|element| element.pos().left), Some(Pos::from_px_i32(-10)));
        assert_eq!(tree.get(run).map(|element| element.pos().left), Some(Pos::from_px_i32(10)));
    }

    /// Trees built in different passes compare by content.
    ///
    /// # Panics
    /// Panics if equality depends on the pass counter.
    #[test]
    fn equality_ignores_pass() {
        let mut first = RenderTree::new();
        let mut second = RenderTree::new();
        second.reset();
        first.push_text(first.root(), text_run());
        second.push_text(second.root(), text_run());
        assert_eq!(first, second);
        assert_ne!(first.pass(), second.pass());
    }
}
