//! Layout of a styled document into a positioned render tree.
//!
//! A layout pass walks the document depth first. Element nodes open a scope
//! in the [`Boxer`], text nodes are broken into words and placed on line
//! boxes, and each child is finally aligned against its parent with the
//! binding resolver. Glyphs that are not yet in the cache are collected
//! during a pass, rendered afterwards, and the pass is run again until
//! nothing is missing.

pub mod binding;
pub mod boxer;
pub mod chunker;
pub mod config;
mod node;
pub mod render;
mod text;

pub use binding::{BindingSet, ParentFrame, position_child_from_bindings};
pub use boxer::{Boxer, FlowOutcome, LineBox, NodeInput};
pub use chunker::{Chunk, ChunkKind, Chunker};
pub use config::LayoutConfig;
pub use render::{RenderChar, RenderElement, RenderId, RenderNode, RenderText, RenderTree, StyleSnapshot};

use anyhow::{Context as _, Result, bail};
use core::mem;
use flow_dom::Document;
use flow_glyphs::{FontStore, GlyphCacheKey, GlyphSource};
use flow_style::{BreakType, StyleStack};
use flow_units::Pos;
use log::debug;
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Where to resume after a line restart. Each level of the tree between the
/// restarting leaf and the nearest flow context pushes the index it was at;
/// the leaf pushes a character offset. Consumers pop from the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestartPoints(SmallVec<usize, 8>);

impl RestartPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: usize) {
        self.0.push(point);
    }

    /// Remove and return the most recently pushed point.
    pub fn pop_last(&mut self) -> Option<usize> {
        self.0.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when every level restarts from its beginning (vacuously true when empty).
    pub fn is_all_zeros(&self) -> bool {
        self.0.iter().all(|&point| point == 0)
    }
}

/// What a node is laid out against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInput {
    /// Available width of the containing box, `None` to size from content.
    pub parent_width: Option<Pos>,
    pub parent_height: Option<Pos>,
    /// Render node that output is appended to.
    pub parent_render: RenderId,
}

/// What a laid out node reports to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOutput {
    /// Baseline relative to the top of the output's render element.
    pub baseline: Option<Pos>,
    pub margin_box_width: Pos,
    pub margin_box_height: Pos,
    pub binds: BindingSet,
    pub render: Option<RenderId>,
    pub break_type: BreakType,
}

impl LayoutOutput {
    /// Output of a text node: no size, bound on its baseline.
    pub fn text(render: Option<RenderId>, baseline: Option<Pos>) -> Self {
        Self {
            baseline,
            margin_box_width: Pos::ZERO,
            margin_box_height: Pos::ZERO,
            binds: BindingSet::baseline_only(),
            render,
            break_type: BreakType::None,
        }
    }

    /// Baseline in the parent's frame.
    pub fn baseline_plus_render_top(&self, tree: &RenderTree) -> Option<Pos> {
        let top = self.render.and_then(|id| tree.get(id))?.pos().top;
        self.baseline.map(|baseline| baseline + top)
    }
}

/// Counters describing a completed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSummary {
    pub passes: usize,
    pub glyphs_rendered: usize,
}

/// Per-pass view over the layout state and its collaborators.
pub(crate) struct LayoutContext<'pass> {
    pub(crate) doc: &'pass Document,
    pub(crate) fonts: &'pass FontStore,
    pub(crate) glyphs: &'pass dyn GlyphSource,
    pub(crate) config: &'pass LayoutConfig,
    pub(crate) stack: &'pass mut StyleStack,
    pub(crate) boxer: &'pass mut Boxer,
    pub(crate) tree: &'pass mut RenderTree,
    pub(crate) glyphs_needed: &'pass mut BTreeSet<GlyphCacheKey>,
}

/// Owns the state that survives between passes and drives them.
#[derive(Debug, Default)]
pub struct Layout {
    config: LayoutConfig,
    stack: StyleStack,
    boxer: Boxer,
    tree: RenderTree,
    glyphs_needed: BTreeSet<GlyphCacheKey>,
}

impl Layout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Tree produced by the most recent pass.
    pub const fn render_tree(&self) -> &RenderTree {
        &self.tree
    }

    /// Lay out `doc`, rendering missing glyphs between passes until a pass
    /// completes with every glyph available.
    ///
    /// # Errors
    /// Returns an error if a glyph fails to render, or if the glyph source
    /// still reports a glyph missing after it was rendered.
    pub fn perform_layout(
        &mut self,
        doc: &Document,
        fonts: &FontStore,
        glyphs: &dyn GlyphSource,
    ) -> Result<LayoutSummary> {
        let mut summary = LayoutSummary::default();
        let mut rendered = BTreeSet::new();
        loop {
            summary.passes += 1;
            let span = tracing::debug_span!("layout_pass", pass = summary.passes);
            let _entered = span.enter();

            self.layout_internal(doc, fonts, glyphs);
            if self.glyphs_needed.is_empty() {
                debug!(
                    target: "flow::layout",
                    "layout done: {} passes, {} render elements",
                    summary.passes,
                    self.tree.len()
                );
                return Ok(summary);
            }

            let needed = mem::take(&mut self.glyphs_needed);
            debug!(
                target: "flow::layout",
                "pass {} needs {} glyphs, running another pass",
                summary.passes,
                needed.len()
            );
            for key in needed {
                if !rendered.insert(key) {
                    bail!("glyph {key:?} is still missing after it was rendered");
                }
                glyphs
                    .render_glyph(&key)
                    .with_context(|| format!("rendering glyph {key:?} for layout"))?;
                summary.glyphs_rendered += 1;
            }
        }
    }

    fn layout_internal(&mut self, doc: &Document, fonts: &FontStore, glyphs: &dyn GlyphSource) {
        self.tree.reset();
        self.stack.reset();
        self.glyphs_needed.clear();

        let (viewport_width, viewport_height) = doc.viewport();
        let input = LayoutInput {
            parent_width: Some(Pos::from_px_saturating(viewport_width)),
            parent_height: Some(Pos::from_px_saturating(viewport_height)),
            parent_render: self.tree.root(),
        };
        let mut restarts = RestartPoints::new();

        self.boxer.begin_document();
        let mut context = LayoutContext {
            doc,
            fonts,
            glyphs,
            config: &self.config,
            stack: &mut self.stack,
            boxer: &mut self.boxer,
            tree: &mut self.tree,
            glyphs_needed: &mut self.glyphs_needed,
        };
        context.run_node(doc.root(), &input, &mut restarts);
        self.boxer.end_document();
    }
}
