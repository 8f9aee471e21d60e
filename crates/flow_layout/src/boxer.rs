//! Flow accumulator: places words and finished nodes onto line boxes.
//!
//! The boxer keeps one state per open node. Each state has its own
//! coordinate frame (the node's content box) and a cursor on its current
//! line. Words and child margin boxes are placed at the cursor. When a word
//! does not fit and the line already has content, the boxer reports
//! [`FlowOutcome::FlowRestart`] instead of wrapping; the layouter unwinds to
//! the nearest flow context, breaks the line there and lays the content out
//! again.

use flow_dom::{InternalId, Tag};
use flow_units::{Pos, PosBox};
use log::trace;
use smallvec::SmallVec;

/// Result of placing something in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Placed at this margin box, in the frame of the enclosing node.
    Continue(PosBox),
    /// Does not fit on the current line.
    FlowRestart,
}

/// What the boxer needs to know about a node being opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInput {
    pub internal_id: InternalId,
    pub tag: Tag,
    /// Specified content width, or `None` to size from content.
    pub content_width: Option<Pos>,
    pub content_height: Option<Pos>,
    pub margin_border_padding: PosBox,
    pub new_flow_context: bool,
}

/// A line inside a node, as seen by the binding pass after the node closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineBox {
    /// Baseline relative to the node's content top.
    pub inner_baseline: Option<Pos>,
    /// Output index of the child whose baseline defined `inner_baseline`.
    pub inner_baseline_defined_by: Option<usize>,
    /// Output index of the last child emitted on this line.
    pub last_child: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct FlowState {
    pos_minor: Pos,
    pos_major: Pos,
    major_max: Pos,
    line_has_content: bool,
}

#[derive(Debug, Clone)]
struct NodeState {
    input: NodeInput,
    flow: FlowState,
    minor_max: Pos,
    wrap_limit: Option<Pos>,
    /// Whether the current line is also the start of a line in the enclosing flow.
    line_starts_flow: bool,
    lines: SmallVec<LineBox, 4>,
}

impl NodeState {
    fn new(input: NodeInput, wrap_limit: Option<Pos>, line_starts_flow: bool) -> Self {
        let mut lines = SmallVec::new();
        lines.push(LineBox::default());
        Self {
            input,
            flow: FlowState::default(),
            minor_max: Pos::ZERO,
            wrap_limit,
            line_starts_flow,
            lines,
        }
    }

    fn at_line_start(&self) -> bool {
        !self.flow.line_has_content && (self.input.new_flow_context || self.line_starts_flow)
    }

    fn fits(&self, width: Pos) -> bool {
        self.wrap_limit
            .is_none_or(|limit| self.flow.pos_minor + width <= limit)
    }

    fn new_line(&mut self) {
        self.flow.pos_major = self.flow.major_max;
        self.flow.pos_minor = Pos::ZERO;
        self.flow.line_has_content = false;
        self.line_starts_flow = true;
        self.lines.push(LineBox::default());
    }

    fn place(&mut self, width: Pos, height: Pos) -> PosBox {
        let placed = PosBox::from_origin_size(self.flow.pos_minor, self.flow.pos_major, width, height);
        self.flow.pos_minor += width;
        self.flow.major_max = self.flow.major_max.max(placed.bottom);
        self.minor_max = self.minor_max.max(self.flow.pos_minor);
        self.flow.line_has_content = true;
        placed
    }

    fn current_line(&mut self) -> &mut LineBox {
        if self.lines.is_empty() {
            self.lines.push(LineBox::default());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }
}

/// Line box accumulator shared by every node of a layout pass.
#[derive(Debug, Default)]
pub struct Boxer {
    stack: Vec<NodeState>,
    previous_lines: SmallVec<LineBox, 4>,
    force_next: bool,
}

impl Boxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the unbounded document frame that the root node is placed in.
    pub fn begin_document(&mut self) {
        self.stack.clear();
        self.previous_lines.clear();
        self.force_next = false;
        let document = NodeInput {
            internal_id: InternalId::default(),
            tag: Tag::Body,
            content_width: None,
            content_height: None,
            margin_border_padding: PosBox::default(),
            new_flow_context: true,
        };
        self.stack.push(NodeState::new(document, None, true));
    }

    pub fn end_document(&mut self) {
        if self.stack.len() != 1 {
            unbalanced("end_document with open nodes");
        }
        self.stack.clear();
    }

    fn top(&mut self) -> &mut NodeState {
        match self.stack.last_mut() {
            Some(state) => state,
            None => unbalanced("no open node"),
        }
    }

    pub fn begin_node(&mut self, input: NodeInput) {
        let parent = self.top();
        let wrap_limit = input.content_width.or_else(|| {
            parent.wrap_limit.map(|limit| {
                (limit - parent.flow.pos_minor - input.margin_border_padding.horizontal()).max(Pos::ZERO)
            })
        });
        let line_starts_flow = parent.at_line_start();
        trace!(
            target: "flow::boxer",
            "begin {:?} limit={:?} starts_line={line_starts_flow}",
            input.internal_id,
            wrap_limit.map(Pos::to_px)
        );
        self.stack.push(NodeState::new(input, wrap_limit, line_starts_flow));
    }

    /// Close the top node and place its margin box in its parent.
    ///
    /// A node that does not fit wraps onto a new line when its parent is a
    /// flow context. Inside any other parent that already has content on the
    /// line, the close reports [`FlowOutcome::FlowRestart`].
    pub fn end_node(&mut self) -> FlowOutcome {
        let Some(state) = self.stack.pop() else {
            unbalanced("end_node without begin_node");
        };
        let mbp = state.input.margin_border_padding;
        let width = state.input.content_width.unwrap_or(state.minor_max) + mbp.horizontal();
        let height = state.input.content_height.unwrap_or(state.flow.major_max) + mbp.vertical();
        self.previous_lines = state.lines;

        let parent = self.top();
        if !parent.fits(width) && parent.flow.line_has_content {
            if !parent.input.new_flow_context {
                return FlowOutcome::FlowRestart;
            }
            parent.new_line();
        }
        let placed = parent.place(width, height);
        trace!(target: "flow::boxer", "end {:?} at {placed:?}", state.input.internal_id);
        FlowOutcome::Continue(placed)
    }

    /// Place a word. Succeeds when it fits, when it is the first thing on a
    /// line of the enclosing flow, or directly after a restart.
    pub fn add_word(&mut self, width: Pos, height: Pos) -> FlowOutcome {
        let force = self.force_next;
        let state = self.top();
        if !(force || state.fits(width) || state.at_line_start()) {
            return FlowOutcome::FlowRestart;
        }
        let placed = state.place(width, height);
        self.force_next = false;
        FlowOutcome::Continue(placed)
    }

    pub fn add_space(&mut self, width: Pos) {
        self.top().flow.pos_minor += width;
    }

    /// Account for an explicit line break character of the given line height.
    pub fn add_new_line_character(&mut self, height: Pos) {
        let state = self.top();
        state.flow.major_max = state.flow.major_max.max(state.flow.pos_major + height);
        state.flow.line_has_content = true;
    }

    /// Start a new line in the top node. An empty line is reused.
    pub fn linebreak(&mut self) {
        self.force_next = false;
        let state = self.top();
        if state.flow.line_has_content {
            state.new_line();
        } else {
            state.flow.pos_minor = Pos::ZERO;
        }
    }

    /// The next word is placed even if it does not fit, so a restart always
    /// makes progress.
    pub fn restart(&mut self) {
        self.force_next = true;
    }

    /// Record that output child `index` was emitted on the current line.
    /// The deepest baseline on a line defines the line's baseline.
    pub fn notify_node_emitted(&mut self, baseline: Option<Pos>, index: usize) {
        let line = self.top().current_line();
        line.last_child = Some(index);
        if let Some(baseline) = baseline
            && line.inner_baseline.is_none_or(|current| baseline > current)
        {
            line.inner_baseline = Some(baseline);
            line.inner_baseline_defined_by = Some(index);
        }
    }

    /// Line `index` of the node closed most recently.
    pub fn previous_line(&self, index: usize) -> Option<&LineBox> {
        self.previous_lines.get(index)
    }

    pub fn previous_line_mut(&mut self, index: usize) -> Option<&mut LineBox> {
        self.previous_lines.get_mut(index)
    }

    pub fn previous_line_count(&self) -> usize {
        self.previous_lines.len()
    }
}

#[cold]
#[expect(clippy::panic, reason = "begin/end calls must be balanced by the tree walk")]
fn unbalanced(message: &str) -> ! {
    panic!("boxer: {message}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: i32) -> Pos {
        Pos::from_px_i32(value)
    }

    fn input(content_width: Option<Pos>, new_flow_context: bool) -> NodeInput {
        NodeInput {
            internal_id: InternalId(1),
            tag: Tag::Div,
            content_width,
            content_height: None,
            margin_border_padding: PosBox::default(),
            new_flow_context,
        }
    }

    fn placed(outcome: FlowOutcome) -> PosBox {
        match outcome {
            FlowOutcome::Continue(placed) => placed,
            FlowOutcome::FlowRestart => PosBox::new(px(-1), px(-1), px(-1), px(-1)),
        }
    }

    /// Words fill a line and the first overflowing word asks for a restart.
    ///
    /// # Panics
    /// Panics if placement or the restart signal is wrong.
    #[test]
    fn words_restart_at_limit() {
        let mut boxer = Boxer::new();
        boxer.begin_document();
        boxer.begin_node(input(Some(px(100)), true));

        assert_eq!(placed(boxer.add_word(px(60), px(10))), PosBox::new(px(0), px(0), px(60), px(10)));
        boxer.add_space(px(5));
        assert_eq!(boxer.add_word(px(40), px(10)), FlowOutcome::FlowRestart);

        boxer.linebreak();
        boxer.restart();
        assert_eq!(placed(boxer.add_word(px(40), px(10))), PosBox::new(px(0), px(10), px(40), px(20)));

        assert_eq!(placed(boxer.end_node()), PosBox::new(px(0), px(0), px(100), px(20)));
        assert_eq!(boxer.previous_line_count(), 2);
        boxer.end_document();
    }

    /// The first word on a flow line is placed even when it is too wide.
    ///
    /// # Panics
    /// Panics if an oversized leading word is rejected.
    #[test]
    fn oversized_first_word() {
        let mut boxer = Boxer::new();
        boxer.begin_document();
        boxer.begin_node(input(Some(px(10)), true));
        assert_eq!(placed(boxer.add_word(px(30), px(10))).right, px(30));
        assert_eq!(boxer.add_word(px(1), px(10)), FlowOutcome::FlowRestart);
        boxer.linebreak();
        assert_eq!(placed(boxer.add_word(px(30), px(10))).top, px(10));
    }

    /// An inject node only gets the space left on its parent's line.
    ///
    /// # Panics
    /// Panics if the inject node's words ignore the parent's cursor.
    #[test]
    fn inject_node_inherits_remaining_width() {
        let mut boxer = Boxer::new();
        boxer.begin_document();
        boxer.begin_node(input(Some(px(100)), true));
        boxer.add_word(px(70), px(10));

        boxer.begin_node(input(None, false));
        assert_eq!(boxer.add_word(px(40), px(10)), FlowOutcome::FlowRestart);
        assert_eq!(placed(boxer.add_word(px(20), px(10))), PosBox::new(px(0), px(0), px(20), px(10)));
        assert_eq!(placed(boxer.end_node()), PosBox::new(px(70), px(0), px(90), px(10)));
    }

    /// Closed nodes wrap inside a flow context and baselines track the deepest child.
    ///
    /// # Panics
    /// Panics if wrapping or line bookkeeping is wrong.
    #[test]
    fn nodes_wrap_and_lines_record_children() {
        let mut boxer = Boxer::new();
        boxer.begin_document();
        boxer.begin_node(input(Some(px(100)), true));

        boxer.begin_node(input(Some(px(60)), false));
        assert_eq!(placed(boxer.end_node()).left, px(0));
        boxer.notify_node_emitted(Some(px(8)), 0);
        boxer.notify_node_emitted(Some(px(12)), 1);

        boxer.begin_node(input(Some(px(60)), false));
        boxer.add_new_line_character(px(15));
        assert_eq!(placed(boxer.end_node()), PosBox::new(px(0), px(0), px(60), px(15)));
        boxer.notify_node_emitted(None, 2);

        boxer.end_node();
        let first = boxer.previous_line(0).copied().unwrap_or_default();
        let second = boxer.previous_line(1).copied().unwrap_or_default();
        assert_eq!(first.inner_baseline, Some(px(12)));
        assert_eq!(first.inner_baseline_defined_by, Some(1));
        assert_eq!(first.last_child, Some(1));
        assert_eq!(second.last_child, Some(2));
        assert_eq!(second.inner_baseline, None);
    }

    /// Closing a node that does not fit inside a non-flow parent reports a restart.
    ///
    /// # Panics
    /// Panics if the close does not report a restart.
    #[test]
    fn end_node_restart_in_inject_parent() {
        let mut boxer = Boxer::new();
        boxer.begin_document();
        boxer.begin_node(input(Some(px(100)), true));
        boxer.begin_node(input(None, false));
        boxer.add_word(px(50), px(10));
        boxer.begin_node(input(Some(px(80)), false));
        assert_eq!(boxer.end_node(), FlowOutcome::FlowRestart);
    }
}
