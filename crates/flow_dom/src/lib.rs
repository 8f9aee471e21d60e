//! Document tree consumed by layout: element and text nodes stored in an
//! `indextree` arena, each with a stable internal id.

use anyhow::{Context as _, Result};
use flow_style::{FlowContext, Size, StyleAttrib, StyleCategory, StyleSet};
use indextree::Arena;
use log::debug;

pub use indextree::NodeId;

/// Stable identifier of a DOM node, carried into the render tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct InternalId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Body,
    Div,
    Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element { tag: Tag, style: StyleSet },
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    pub internal_id: InternalId,
    pub kind: NodeKind,
}

impl DomNode {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn tag(&self) -> Option<Tag> {
        match self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text } => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn style(&self) -> Option<&StyleSet> {
        match &self.kind {
            NodeKind::Element { style, .. } => Some(style),
            NodeKind::Text { .. } => None,
        }
    }
}

/// A document with a `Body` root and a viewport size in whole device pixels.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
    next_id: u32,
    viewport_width: u32,
    viewport_height: u32,
}

impl Document {
    /// The body fills the viewport and starts a new flow context.
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        let mut arena = Arena::new();
        let body_style = StyleSet::new()
            .with(StyleCategory::Width, StyleAttrib::Size(Size::percent(100.0)))
            .with(StyleCategory::Height, StyleAttrib::Size(Size::percent(100.0)))
            .with(StyleCategory::FlowContext, StyleAttrib::FlowContext(FlowContext::New));
        let root = arena.new_node(DomNode {
            internal_id: InternalId(0),
            kind: NodeKind::Element { tag: Tag::Body, style: body_style },
        });
        Self {
            arena,
            root,
            next_id: 1,
            viewport_width,
            viewport_height,
        }
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub const fn viewport(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    fn allocate(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let internal_id = InternalId(self.next_id);
        self.next_id += 1;
        let node = self.arena.new_node(DomNode { internal_id, kind });
        parent.append(node, &mut self.arena);
        node
    }

    /// Append a new, unstyled element.
    pub fn add_node(&mut self, parent: NodeId, tag: Tag) -> NodeId {
        self.allocate(parent, NodeKind::Element { tag, style: StyleSet::new() })
    }

    pub fn add_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.allocate(parent, NodeKind::Text { text: text.to_owned() })
    }

    /// Replace every child of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> NodeId {
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        for child in children {
            child.remove_subtree(&mut self.arena);
        }
        self.add_text(node, text)
    }

    /// Parse declarations into an element's style, overriding earlier values.
    ///
    /// # Errors
    /// Returns an error if `node` is a text node or a declaration is invalid.
    pub fn style_parse(&mut self, node: NodeId, declarations: &str) -> Result<()> {
        let dom_node = self
            .arena
            .get_mut(node)
            .with_context(|| format!("node {node} does not belong to this document"))?
            .get_mut();
        let internal_id = dom_node.internal_id;
        let NodeKind::Element { style, .. } = &mut dom_node.kind else {
            anyhow::bail!("cannot style text node {internal_id:?}");
        };
        style.parse_into(declarations)?;
        debug!(target: "flow::dom", "styled {internal_id:?}: {declarations}");
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        match self.arena.get(id) {
            Some(node) => node.get(),
            None => foreign_node(id),
        }
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }
}

#[cold]
#[expect(clippy::panic, reason = "node ids are only ever handed out by the owning document")]
fn foreign_node(id: NodeId) -> ! {
    panic!("node {id} does not belong to this document");
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_style::BoxSizing;

    /// Nodes get sequential ids and keep insertion order.
    ///
    /// # Panics
    /// Panics if ids or order are wrong.
    #[test]
    fn build_tree() {
        let mut doc = Document::new(640, 480);
        let root = doc.root();
        let div = doc.add_node(root, Tag::Div);
        let text = doc.add_text(div, "hello");
        let span = doc.add_node(root, Tag::Span);

        assert_eq!(doc.node(root).tag(), Some(Tag::Body));
        assert_eq!(doc.child_count(root), 2);
        assert_eq!(doc.child(root, 1), Some(span));
        assert_eq!(doc.node(text).text(), Some("hello"));
        assert_eq!(doc.node(div).internal_id, InternalId(1));
        assert_eq!(doc.node(span).internal_id, InternalId(3));
        assert_eq!(doc.viewport(), (640, 480));
    }

    /// `set_text` drops existing children and `style_parse` merges declarations.
    ///
    /// # Panics
    /// Panics if children are not replaced or the style is not applied.
    #[test]
    fn set_text_and_style() -> Result<()> {
        let mut doc = Document::new(100, 100);
        let div = doc.add_node(doc.root(), Tag::Div);
        doc.add_text(div, "old");
        doc.add_node(div, Tag::Span);
        let text = doc.set_text(div, "new");

        assert_eq!(doc.child_count(div), 1);
        assert_eq!(doc.node(text).text(), Some("new"));

        doc.style_parse(div, "width: 10px; box-sizing: border")?;
        let style = doc.node(div).style().cloned().unwrap_or_default();
        assert_eq!(style.get(StyleCategory::Width), Some(StyleAttrib::Size(Size::px(10.0))));
        assert_eq!(style.get(StyleCategory::BoxSizing), Some(StyleAttrib::BoxSizing(BoxSizing::Border)));
        assert!(doc.style_parse(text, "width: 1px").is_err());
        Ok(())
    }
}
