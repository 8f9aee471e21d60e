//! Element layout: box model, child iteration with restarts, and bindings.

use crate::binding::{BindingSet, ParentFrame, position_child_from_bindings};
use crate::boxer::{FlowOutcome, NodeInput};
use crate::render::{RenderId, RenderNode, StyleSnapshot};
use crate::{LayoutContext, LayoutInput, LayoutOutput, RestartPoints};
use flow_dom::{InternalId, NodeId, NodeKind, Tag};
use flow_style::{BoxCategory, BoxSizing, BreakType, FlowContext, Size, SizeUnit, StyleCategory};
use flow_units::{Pos, PosBox};
use log::{debug, trace};
use smallvec::SmallVec;

/// Resolved box model of the node on top of the style stack.
struct BoxModel {
    margin: PosBox,
    padding: PosBox,
    border: PosBox,
    content_width: Option<Pos>,
    content_height: Option<Pos>,
}

impl LayoutContext<'_> {
    /// Resolve a style size against a container dimension. `None` means
    /// undefined: an unset size, or a percentage of an undefined container.
    pub fn compute_dimension(&self, container: Option<Pos>, size: Size) -> Option<Pos> {
        match size.unit {
            SizeUnit::None => None,
            SizeUnit::Px => Some(Pos::from_px(size.value)),
            SizeUnit::Pt => Some(Pos::from_px(size.value * self.config.pt_to_pixel)),
            SizeUnit::Ep => Some(Pos::from_px(size.value * self.config.ep_to_pixel)),
            SizeUnit::Percent => container.map(|container| container * (size.value * 0.01)),
        }
    }

    /// Insets of one box group. Undefined sides count as zero.
    fn compute_box(&self, input: &LayoutInput, group: BoxCategory) -> PosBox {
        let sizes = self.stack.get_box(group);
        let (width, height) = (input.parent_width, input.parent_height);
        PosBox::new(
            self.compute_dimension(width, sizes.left).unwrap_or(Pos::ZERO),
            self.compute_dimension(height, sizes.top).unwrap_or(Pos::ZERO),
            self.compute_dimension(width, sizes.right).unwrap_or(Pos::ZERO),
            self.compute_dimension(height, sizes.bottom).unwrap_or(Pos::ZERO),
        )
    }

    fn size_of(&self, category: StyleCategory) -> Size {
        self.stack.get(category).size()
    }

    fn compute_box_model(&self, input: &LayoutInput) -> BoxModel {
        let margin = self.compute_box(input, BoxCategory::Margin);
        let padding = self.compute_box(input, BoxCategory::Padding);
        let border = self.compute_box(input, BoxCategory::Border);
        let insets = match self.stack.get(StyleCategory::BoxSizing).box_sizing() {
            BoxSizing::Content => PosBox::default(),
            BoxSizing::Border => padding.piecewise_sum(&border),
            BoxSizing::Margin => margin.piecewise_sum(&padding).piecewise_sum(&border),
        };
        let content_width = self
            .compute_dimension(input.parent_width, self.size_of(StyleCategory::Width))
            .map(|width| width - insets.horizontal());
        let content_height = self
            .compute_dimension(input.parent_height, self.size_of(StyleCategory::Height))
            .map(|height| height - insets.vertical());
        BoxModel {
            margin,
            padding,
            border,
            content_width,
            content_height,
        }
    }

    /// Lay out an element and its subtree, appending its render node to
    /// `input.parent_render`.
    ///
    /// `restarts` is consumed on entry when a restart is in progress. On
    /// return it is non-empty if something inside this node asked for a line
    /// restart that this node could not absorb.
    pub fn run_node(&mut self, node: NodeId, input: &LayoutInput, restarts: &mut RestartPoints) -> LayoutOutput {
        let doc = self.doc;
        let dom_node = doc.node(node);
        let internal_id = dom_node.internal_id;
        let NodeKind::Element { tag, style } = &dom_node.kind else {
            not_an_element(internal_id);
        };
        let tag = *tag;
        self.stack.resolve_and_push(style);

        let mut model = self.compute_box_model(input);
        let break_type = self.stack.get(StyleCategory::Break).break_type();
        if break_type == BreakType::Before && restarts.is_empty() {
            self.boxer.linebreak();
        }
        if self.config.snap_boxes {
            model.content_width = model.content_width.map(Pos::round_up);
            model.content_height = model.content_height.map(Pos::round_up);
        }

        let render = self
            .tree
            .push_node(input.parent_render, RenderNode::new(internal_id, Some(tag)));
        let box_input = NodeInput {
            internal_id,
            tag,
            content_width: model.content_width,
            content_height: model.content_height,
            margin_border_padding: model.margin.piecewise_sum(&model.border).piecewise_sum(&model.padding),
            new_flow_context: tag == Tag::Body
                || self.stack.get(StyleCategory::FlowContext).flow_context() == FlowContext::New,
        };
        trace!(
            target: "flow::layout",
            "node {internal_id:?} {tag:?} width={:?} height={:?} flow_context={}",
            model.content_width.map(Pos::to_px),
            model.content_height.map(Pos::to_px),
            box_input.new_flow_context
        );

        let mut own_restarts = RestartPoints::new();
        let child_restarts = if box_input.new_flow_context {
            &mut own_restarts
        } else {
            restarts
        };
        let mut child_input = LayoutInput {
            parent_width: model.content_width,
            parent_height: model.content_height,
            parent_render: render,
        };

        self.boxer.begin_node(box_input);
        let mut child_outs = self.run_children(node, &box_input, &child_input, child_restarts);
        let margin_box = match self.boxer.end_node() {
            FlowOutcome::Continue(margin_box) => margin_box,
            FlowOutcome::FlowRestart => restart_while_closing(internal_id),
        };

        let content_box = margin_box.shrunk_by(&box_input.margin_border_padding);
        self.finish_render_node(render, content_box, input, &model);

        child_input.parent_width = child_input.parent_width.or(Some(content_box.width()));
        child_input.parent_height = child_input.parent_height.or(Some(content_box.height()));
        self.bind_children(&child_input, &mut child_outs);

        let output = LayoutOutput {
            baseline: self.boxer.previous_line(0).and_then(|line| line.inner_baseline),
            margin_box_width: margin_box.width(),
            margin_box_height: margin_box.height(),
            binds: BindingSet::from_stack(self.stack),
            render: Some(render),
            break_type,
        };
        self.stack.pop();
        output
    }

    /// Run children from the resume point. A flow context absorbs restarts
    /// raised below it by breaking the line and running the same child again;
    /// any other node records its child index and stops.
    fn run_children(
        &mut self,
        node: NodeId,
        box_input: &NodeInput,
        child_input: &LayoutInput,
        child_restarts: &mut RestartPoints,
    ) -> Vec<LayoutOutput> {
        let doc = self.doc;
        let render = child_input.parent_render;
        let children: SmallVec<NodeId, 16> = doc.children(node).collect();
        let mut index = child_restarts.pop_last().unwrap_or(0);
        let mut child_outs = Vec::with_capacity(children.len());

        while let Some(&child) = children.get(index) {
            let render_children_before = self.tree.child_count(render);
            let child_out = if doc.node(child).is_text() {
                self.run_text(child, child_input, child_restarts)
            } else {
                self.run_node(child, child_input, child_restarts)
            };

            let restarting = !child_restarts.is_empty();
            let restart_from_zero = child_restarts.is_all_zeros();

            if !(restarting && restart_from_zero) {
                let baseline = child_out.baseline_plus_render_top(self.tree);
                self.boxer.notify_node_emitted(baseline, child_outs.len());
                child_outs.push(child_out);
                if child_out.break_type == BreakType::After {
                    self.boxer.linebreak();
                }
            }

            if !restarting {
                index += 1;
                continue;
            }
            if !box_input.new_flow_context {
                child_restarts.push(index);
                break;
            }
            debug!(
                target: "flow::layout",
                "{:?} restarting child {index} on a new line from {child_restarts:?}",
                box_input.internal_id
            );
            self.boxer.linebreak();
            self.boxer.restart();
            if restart_from_zero {
                // Nothing of the child survives; drop the husk it emitted.
                self.tree.truncate_children(render, render_children_before);
            }
        }
        child_outs
    }

    fn finish_render_node(&mut self, render: RenderId, content_box: PosBox, input: &LayoutInput, model: &BoxModel) {
        let border_radius = self
            .compute_dimension(input.parent_width, self.size_of(StyleCategory::BorderRadius))
            .map_or(0.0, Pos::to_px);
        let style = StyleSnapshot {
            background: self.stack.get(StyleCategory::Background).color(),
            border_color: self.stack.get(StyleCategory::BorderColor).color(),
            border_radius,
            border_size: model.border,
            padding: model.padding,
        };
        if let Some(render_node) = self.tree.node_mut(render) {
            render_node.pos = content_box;
            render_node.style = style;
        }
    }

    /// Align each child against the line box it was emitted on. A child that
    /// defined its line's baseline carries the baseline along when it moves.
    fn bind_children(&mut self, child_input: &LayoutInput, child_outs: &mut [LayoutOutput]) {
        let line_count = self.boxer.previous_line_count();
        let mut line_index = 0;
        for (child_index, child_out) in child_outs.iter_mut().enumerate() {
            while line_index + 1 < line_count
                && self
                    .boxer
                    .previous_line(line_index)
                    .is_some_and(|line| line.last_child.is_none_or(|last| child_index > last))
            {
                line_index += 1;
            }
            if child_out.render.is_none() {
                continue;
            }
            let frame = ParentFrame {
                width: child_input.parent_width,
                height: child_input.parent_height,
                baseline: self.boxer.previous_line(line_index).and_then(|line| line.inner_baseline),
            };
            let moved = position_child_from_bindings(self.tree, &frame, child_out);
            if let Some(line) = self.boxer.previous_line_mut(line_index)
                && line.inner_baseline_defined_by == Some(child_index)
            {
                line.inner_baseline = line.inner_baseline.map(|baseline| baseline + moved.y);
            }
        }
    }
}

#[cold]
#[expect(clippy::panic, reason = "text nodes are dispatched to the text layouter")]
fn not_an_element(internal_id: InternalId) -> ! {
    panic!("node {internal_id:?} is not an element");
}

#[cold]
#[expect(clippy::panic, reason = "a restart raised while closing a node has no resume point")]
fn restart_while_closing(internal_id: InternalId) -> ! {
    panic!("flow restart while closing node {internal_id:?}");
}
