//! Hit testing: pure queries over the laid-out render tree.
//!
//! A recursive walk in reverse paint order finds the deepest box whose
//! border box contains a point; text hits resolve through their line
//! fragments to the owning element. The document layer turns hits into
//! `:hover`/`:active` state changes and dirty rectangles.

use marten_dom::{DomTree, NodeId, NodeKind};

use crate::render_tree::{BoxId, BoxKind, RenderTree};

/// The deepest box at `(x, y)` in document coordinates, honoring paint
/// order (topmost wins).
#[must_use]
pub fn box_at_point(rt: &RenderTree, x: i32, y: i32) -> Option<BoxId> {
    let root = rt.root?;
    hit_box(rt, root, x, y)
}

fn hit_box(rt: &RenderTree, id: BoxId, x: i32, y: i32) -> Option<BoxId> {
    let b = rt.get(id);

    // Reverse paint order: positioned descendants first (topmost z
    // last in paint, so first here), then floats, then children.
    let mut absolutes = b.absolutes.clone();
    absolutes.sort_by_key(|&abs| (rt.get(abs).style.z_index.unwrap_or(0), abs));
    for &abs in absolutes.iter().rev() {
        if let Some(hit) = hit_box(rt, abs, x, y) {
            return Some(hit);
        }
    }

    for &float_id in b.floats_left.iter().chain(b.floats_right.iter()).rev() {
        if let Some(hit) = hit_box(rt, float_id, x, y) {
            return Some(hit);
        }
    }

    for &child in b.children.iter().rev() {
        let child_box = rt.get(child);
        if matches!(child_box.kind, BoxKind::Text(_)) {
            continue;
        }
        if child_box.style.float != marten_css::style::FloatMode::None {
            continue;
        }
        if matches!(
            child_box.style.position,
            marten_css::style::Position::Absolute | marten_css::style::Position::Fixed
        ) {
            continue;
        }
        if let Some(hit) = hit_box(rt, child, x, y) {
            return Some(hit);
        }
    }

    // Text fragments hit the box that owns the inline content.
    for line in &b.lines {
        for fragment in &line.fragments {
            if fragment.rect.contains(x, y) {
                let source = rt.get(fragment.source);
                if matches!(source.kind, BoxKind::Text(_)) {
                    return source.parent.or(Some(id));
                }
                return Some(fragment.source);
            }
        }
    }

    b.border_box().contains(x, y).then_some(id)
}

/// The element node a box belongs to (text boxes resolve through their
/// DOM parent).
#[must_use]
pub fn element_of(rt: &RenderTree, dom: &DomTree, id: BoxId) -> Option<NodeId> {
    let mut current = Some(id);
    while let Some(box_id) = current {
        let b = rt.get(box_id);
        if let Some(node) = b.node {
            if matches!(dom.get(node).map(|n| &n.kind), Some(NodeKind::Element(_))) {
                return Some(node);
            }
            // A text node: its DOM parent is the element.
            if let Some(parent) = dom.parent(node) {
                if matches!(dom.get(parent).map(|n| &n.kind), Some(NodeKind::Element(_))) {
                    return Some(parent);
                }
            }
        }
        current = b.parent;
    }
    None
}

/// The hit element plus its element ancestors, innermost first — the
/// chain `:hover` applies to.
#[must_use]
pub fn hover_chain(dom: &DomTree, element: NodeId) -> Vec<NodeId> {
    std::iter::once(element)
        .chain(dom.ancestors(element))
        .filter(|&id| matches!(dom.get(id).map(|n| &n.kind), Some(NodeKind::Element(_))))
        .collect()
}

/// The nearest enclosing anchor (`<a href>`), for click dispatch.
#[must_use]
pub fn enclosing_anchor(dom: &DomTree, element: NodeId) -> Option<(NodeId, String)> {
    std::iter::once(element)
        .chain(dom.ancestors(element))
        .find_map(|id| {
            let data = dom.as_element(id)?;
            if data.tag == marten_dom::TagId::A {
                data.attrs.get("href").map(|href| (id, href.to_string()))
            } else {
                None
            }
        })
}
