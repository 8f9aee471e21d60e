//! Positions a child against anchors on its parent.
//!
//! Each binding category of a child names the parent anchor that the
//! matching edge of the child is attached to, e.g. `right: center` puts
//! the child's right edge on the parent's horizontal center.

use crate::LayoutOutput;
use crate::render::{RenderId, RenderTree};
use flow_style::{HorizontalBinding, StyleCategory, StyleStack, VerticalBinding};
use flow_units::{Point, Pos};

/// The parent anchor chosen for each edge of a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindingSet {
    pub h_child_left: HorizontalBinding,
    pub h_child_center: HorizontalBinding,
    pub h_child_right: HorizontalBinding,
    pub v_child_top: VerticalBinding,
    pub v_child_center: VerticalBinding,
    pub v_child_bottom: VerticalBinding,
    pub v_child_baseline: VerticalBinding,
}

impl BindingSet {
    /// Bindings of the node on top of the style stack.
    pub fn from_stack(stack: &StyleStack) -> Self {
        Self {
            h_child_left: stack.get(StyleCategory::Left).horizontal_binding(),
            h_child_center: stack.get(StyleCategory::HCenter).horizontal_binding(),
            h_child_right: stack.get(StyleCategory::Right).horizontal_binding(),
            v_child_top: stack.get(StyleCategory::Top).vertical_binding(),
            v_child_center: stack.get(StyleCategory::VCenter).vertical_binding(),
            v_child_bottom: stack.get(StyleCategory::Bottom).vertical_binding(),
            v_child_baseline: stack.get(StyleCategory::Baseline).vertical_binding(),
        }
    }

    /// Text runs sit on their line's baseline.
    pub fn baseline_only() -> Self {
        Self {
            v_child_baseline: VerticalBinding::Baseline,
            ..Self::default()
        }
    }
}

/// The parent's content size and the baseline of the line the child is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParentFrame {
    pub width: Option<Pos>,
    pub height: Option<Pos>,
    pub baseline: Option<Pos>,
}

fn h_offset(bind: HorizontalBinding, left: Pos, width: Option<Pos>) -> Option<Pos> {
    match bind {
        HorizontalBinding::None | HorizontalBinding::Left => Some(left),
        HorizontalBinding::Center => width.map(|width| left + width / 2),
        HorizontalBinding::Right => width.map(|width| left + width),
    }
}

fn v_offset(bind: VerticalBinding, top: Pos, baseline: Option<Pos>, height: Option<Pos>) -> Option<Pos> {
    match bind {
        VerticalBinding::None | VerticalBinding::Top => Some(top),
        VerticalBinding::Center => height.map(|height| top + height / 2),
        VerticalBinding::Bottom => height.map(|height| top + height),
        VerticalBinding::Baseline => baseline.map(|baseline| top + baseline),
    }
}

struct HBindHelper {
    parent_width: Option<Pos>,
    child_left: Pos,
    child_width: Pos,
}

impl HBindHelper {
    /// Distance to move the child's `child` anchor onto the parent's `parent` anchor.
    fn delta(&self, parent: HorizontalBinding, child: HorizontalBinding) -> Option<Pos> {
        if parent == HorizontalBinding::None || child == HorizontalBinding::None {
            return None;
        }
        let parent_at = h_offset(parent, Pos::ZERO, self.parent_width)?;
        let child_at = h_offset(child, self.child_left, Some(self.child_width))?;
        Some(parent_at - child_at)
    }
}

struct VBindHelper {
    parent_height: Option<Pos>,
    parent_baseline: Option<Pos>,
    child_top: Pos,
    child_height: Pos,
    child_baseline: Option<Pos>,
}

impl VBindHelper {
    fn delta(&self, parent: VerticalBinding, child: VerticalBinding) -> Option<Pos> {
        if parent == VerticalBinding::None || child == VerticalBinding::None {
            return None;
        }
        let parent_at = v_offset(parent, Pos::ZERO, self.parent_baseline, self.parent_height)?;
        let child_at = v_offset(child, self.child_top, self.child_baseline, Some(self.child_height))?;
        Some(parent_at - child_at)
    }
}

fn translate(tree: &mut RenderTree, id: RenderId, delta_x: Pos, delta_y: Pos) {
    if let Some(element) = tree.get_mut(id) {
        element.pos_mut().offset(delta_x, delta_y);
    }
}

fn stretch_right(tree: &mut RenderTree, id: RenderId, delta: Pos) {
    if let Some(element) = tree.get_mut(id) {
        element.pos_mut().right += delta;
    }
}

fn stretch_bottom(tree: &mut RenderTree, id: RenderId, delta: Pos) {
    if let Some(element) = tree.get_mut(id) {
        element.pos_mut().bottom += delta;
    }
}

/// Move or stretch a child so that its bound edges meet their parent anchors.
///
/// Centers are applied first. A single bound edge translates the child; an
/// edge bound together with the center or the opposite edge stretches the
/// child from that side instead. Vertically a baseline binding takes
/// precedence over a center binding, and stretching the top edge moves the
/// child's reported baseline with it. Returns the translation applied, which
/// excludes any stretching.
pub fn position_child_from_bindings(tree: &mut RenderTree, frame: &ParentFrame, child: &mut LayoutOutput) -> Point {
    let mut moved = Point::default();
    let Some(id) = child.render else {
        return moved;
    };
    let Some(start) = tree.get(id).map(|element| *element.pos()) else {
        return moved;
    };
    let binds = child.binds;

    let mut horizontal = HBindHelper {
        parent_width: frame.width,
        child_left: start.left,
        child_width: child.margin_box_width,
    };
    let move_x = horizontal.delta(binds.h_child_center, HorizontalBinding::Center);
    if let Some(delta) = move_x {
        translate(tree, id, delta, Pos::ZERO);
        horizontal.child_left += delta;
        moved.x = delta;
    }

    let left_delta = horizontal.delta(binds.h_child_left, HorizontalBinding::Left);
    let right_delta = horizontal.delta(binds.h_child_right, HorizontalBinding::Right);
    if let Some(delta) = left_delta {
        if move_x.is_some() || right_delta.is_some() {
            tree.move_left_top(id, delta, Pos::ZERO);
        } else {
            translate(tree, id, delta, Pos::ZERO);
            moved.x = delta;
        }
    }
    if let Some(delta) = right_delta {
        if move_x.is_some() || left_delta.is_some() {
            stretch_right(tree, id, delta);
        } else {
            translate(tree, id, delta, Pos::ZERO);
            moved.x = delta;
        }
    }

    let mut vertical = VBindHelper {
        parent_height: frame.height,
        parent_baseline: frame.baseline,
        child_top: start.top,
        child_height: child.margin_box_height,
        child_baseline: child.baseline,
    };
    let move_y = vertical
        .delta(binds.v_child_baseline, VerticalBinding::Baseline)
        .or_else(|| vertical.delta(binds.v_child_center, VerticalBinding::Center));
    if let Some(delta) = move_y {
        translate(tree, id, Pos::ZERO, delta);
        vertical.child_top += delta;
        moved.y = delta;
    }

    let top_delta = vertical.delta(binds.v_child_top, VerticalBinding::Top);
    let bottom_delta = vertical.delta(binds.v_child_bottom, VerticalBinding::Bottom);
    if let Some(delta) = top_delta {
        if move_y.is_some() || bottom_delta.is_some() {
            tree.move_left_top(id, Pos::ZERO, delta);
            child.baseline = child.baseline.map(|baseline| baseline - delta);
        } else {
            translate(tree, id, Pos::ZERO, delta);
            moved.y = delta;
        }
    }
    if let Some(delta) = bottom_delta {
        if move_y.is_some() || top_delta.is_some() {
            stretch_bottom(tree, id, delta);
        } else {
            translate(tree, id, Pos::ZERO, delta);
            moved.y = delta;
        }
    }

    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderNode;
    use flow_dom::{InternalId, Tag};
    use flow_style::BreakType;
    use flow_units::PosBox;

    fn px(value: i32) -> Pos {
        Pos::from_px_i32(value)
    }

    fn child_at(tree: &mut RenderTree, pos: PosBox, binds: BindingSet, baseline: Option<Pos>) -> LayoutOutput {
        let mut node = RenderNode::new(InternalId(2), Some(Tag::Div));
        node.pos = pos;
        let render = tree.push_node(tree.root(), node);
        LayoutOutput {
            baseline,
            margin_box_width: pos.width(),
            margin_box_height: pos.height(),
            binds,
            render: Some(render),
            break_type: BreakType::None,
        }
    }

    fn frame(width: i32, height: i32) -> ParentFrame {
        ParentFrame {
            width: Some(px(width)),
            height: Some(px(height)),
            baseline: None,
        }
    }

    fn pos_of(tree: &RenderTree, child: &LayoutOutput) -> PosBox {
        child
            .render
            .and_then(|id| tree.get(id))
            .map(|element| *element.pos())
            .unwrap_or_default()
    }

    /// Binding both horizontal edges stretches the child across the parent.
    ///
    /// # Panics
    /// Panics if the child is not stretched to the parent's width.
    #[test]
    fn left_right_stretch() {
        let mut tree = RenderTree::new();
        let binds = BindingSet {
            h_child_left: HorizontalBinding::Left,
            h_child_right: HorizontalBinding::Right,
            ..BindingSet::default()
        };
        let mut child = child_at(&mut tree, PosBox::new(px(50), px(0), px(150), px(20)), binds, None);

        let moved = position_child_from_bindings(&mut tree, &frame(300, 100), &mut child);
        let pos = pos_of(&tree, &child);
        assert_eq!(pos.left, px(0));
        assert_eq!(pos.width(), px(300));
        assert_eq!(moved, Point::default());
    }

    /// A single edge translates; center then aligns midpoints.
    ///
    /// # Panics
    /// Panics if translations are wrong.
    #[test]
    fn single_edge_and_center() {
        let mut tree = RenderTree::new();
        let right_only = BindingSet {
            h_child_right: HorizontalBinding::Right,
            v_child_center: VerticalBinding::Center,
            ..BindingSet::default()
        };
        let mut child = child_at(&mut tree, PosBox::new(px(0), px(0), px(40), px(20)), right_only, None);
        let moved = position_child_from_bindings(&mut tree, &frame(100, 100), &mut child);
        assert_eq!(moved, Point::new(px(60), px(40)));
        assert_eq!(pos_of(&tree, &child), PosBox::new(px(60), px(40), px(100), px(60)));
    }

    /// Baseline wins over vcenter, and a top stretch moves the baseline.
    ///
    /// # Panics
    /// Panics if the baseline binding is not preferred or not adjusted.
    #[test]
    fn baseline_then_top_stretch() {
        let mut tree = RenderTree::new();
        let binds = BindingSet {
            v_child_baseline: VerticalBinding::Baseline,
            v_child_center: VerticalBinding::Center,
            v_child_top: VerticalBinding::Top,
            ..BindingSet::default()
        };
        let mut child = child_at(&mut tree, PosBox::new(px(0), px(0), px(10), px(20)), binds, Some(px(15)));
        let parent = ParentFrame {
            baseline: Some(px(25)),
            ..frame(100, 100)
        };

        let moved = position_child_from_bindings(&mut tree, &parent, &mut child);
        assert_eq!(moved.y, px(10));
        let pos = pos_of(&tree, &child);
        assert_eq!(pos.top, px(0));
        assert_eq!(pos.bottom, px(30));
        assert_eq!(child.baseline, Some(px(25)));
    }

    /// Undefined baselines and unbound sides leave the child alone.
    ///
    /// # Panics
    /// Panics if the child moves.
    #[test]
    fn undefined_means_unconstrained() {
        let mut tree = RenderTree::new();
        let start = PosBox::new(px(5), px(5), px(15), px(15));
        let mut child = child_at(&mut tree, start, BindingSet::baseline_only(), None);
        let moved = position_child_from_bindings(&mut tree, &frame(100, 100), &mut child);
        assert_eq!(moved, Point::default());
        assert_eq!(pos_of(&tree, &child), start);
    }
}
