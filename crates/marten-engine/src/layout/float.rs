//! Float placement and clearance.
//!
//! [CSS2 § 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A floated box is shifted to the left or right until its outer edge
//! touches the containing block edge or the outer edge of another
//! float." Floats attach to the block formatting context that contains
//! them; line boxes inside that context shrink around them, and `clear`
//! advances past them.

use marten_css::style::{Clear, FloatMode, Position};

use crate::geometry::{round_half_even, Rect};
use crate::render_tree::BoxId;

use super::{ContainingBlock, LayoutEngine};

/// A float that has been placed in this context.
#[derive(Debug, Clone)]
pub struct PlacedFloat {
    /// Which side it floated to.
    pub side: FloatMode,
    /// Its margin box, absolute coordinates.
    pub margin_box: Rect,
    /// The floated box.
    pub id: BoxId,
}

/// Tracks placed floats within one block formatting context.
///
/// "Since a float is not in the flow, non-positioned block boxes created
/// before and after the float box flow vertically as if the float did
/// not exist. However, the current and subsequent line boxes created
/// next to the float are shortened as necessary."
#[derive(Debug, Default)]
pub struct FloatContext {
    /// Placed left floats.
    pub left: Vec<PlacedFloat>,
    /// Placed right floats.
    pub right: Vec<PlacedFloat>,
    /// Content-box left edge of the establishing block, absolute.
    pub origin_x: f32,
    /// Content-box width of the establishing block.
    pub width: f32,
}

impl FloatContext {
    /// A fresh context for a BFC with the given content origin/width.
    #[must_use]
    pub fn new(origin_x: f32, width: f32) -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
            origin_x,
            width,
        }
    }

    /// True if no floats have been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// The lowest margin-box bottom over all floats (the establishing
    /// BFC's height grows to contain it).
    #[must_use]
    pub fn lowest_bottom(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .map(|f| f.margin_box.bottom() as f32)
            .fold(0.0_f32, f32::max)
    }

    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any [matching] floating boxes." Returns the new Y,
    /// never above `y`.
    #[must_use]
    pub fn clear_y(&self, clear: Clear, y: f32) -> f32 {
        let mut cleared = y;
        if matches!(clear, Clear::Left | Clear::Both) {
            for float in &self.left {
                cleared = cleared.max(float.margin_box.bottom() as f32);
            }
        }
        if matches!(clear, Clear::Right | Clear::Both) {
            for float in &self.right {
                cleared = cleared.max(float.margin_box.bottom() as f32);
            }
        }
        cleared
    }

    /// "The current and subsequent line boxes next to the float are
    /// shortened as necessary." Returns `(left_edge, right_edge)` of the
    /// usable band at `[y, y + height)`, in absolute coordinates.
    #[must_use]
    pub fn band_at(&self, y: f32, height: f32) -> (f32, f32) {
        let band_top = y;
        let band_bottom = y + height.max(1.0);

        let mut left_edge = self.origin_x;
        for float in &self.left {
            let top = float.margin_box.y as f32;
            let bottom = float.margin_box.bottom() as f32;
            if top < band_bottom && bottom > band_top {
                left_edge = left_edge.max(float.margin_box.right() as f32);
            }
        }
        let mut right_edge = self.origin_x + self.width;
        for float in &self.right {
            let top = float.margin_box.y as f32;
            let bottom = float.margin_box.bottom() as f32;
            if top < band_bottom && bottom > band_top {
                right_edge = right_edge.min(float.margin_box.x as f32);
            }
        }
        (left_edge, right_edge)
    }

    /// The next float bottom strictly below `y`, used to scan downward
    /// when a float or line does not fit.
    #[must_use]
    pub fn next_bottom_after(&self, y: f32) -> Option<f32> {
        self.left
            .iter()
            .chain(self.right.iter())
            .map(|f| f.margin_box.bottom() as f32)
            .filter(|&bottom| bottom > y)
            .fold(None, |acc: Option<f32>, bottom| {
                Some(acc.map_or(bottom, |a| a.min(bottom)))
            })
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Find a position for a float of the given margin-box size, at or
    /// below `y`, and record it. The nine placement rules reduce to:
    /// floats go as high as possible, then as far left/right as
    /// possible, without overlapping other floats or the BFC edges.
    pub fn place(&mut self, id: BoxId, side: FloatMode, width: f32, height: f32, y: f32) -> Rect {
        let mut y = y.max(0.0);
        loop {
            let (left_edge, right_edge) = self.band_at(y, height);
            let available = right_edge - left_edge;
            if available >= width || available >= self.width {
                let x = match side {
                    FloatMode::Right => (right_edge - width).max(left_edge),
                    _ => left_edge,
                };
                return self.commit(id, side, x, y, width, height);
            }
            // Doesn't fit beside the existing floats — drop below the
            // next float edge and retry; if there is none, overflow at
            // the current position.
            match self.next_bottom_after(y) {
                Some(next) if next > y => y = next,
                _ => {
                    let x = match side {
                        FloatMode::Right => (right_edge - width).max(left_edge),
                        _ => left_edge,
                    };
                    return self.commit(id, side, x, y, width, height);
                }
            }
        }
    }

    fn commit(&mut self, id: BoxId, side: FloatMode, x: f32, y: f32, width: f32, height: f32) -> Rect {
        let rect = Rect {
            x: round_half_even(x),
            y: round_half_even(y),
            width: round_half_even(width),
            height: round_half_even(height),
        };
        let placed = PlacedFloat {
            side,
            margin_box: rect,
            id,
        };
        match side {
            FloatMode::Right => self.right.push(placed),
            _ => self.left.push(placed),
        }
        rect
    }
}

impl LayoutEngine<'_> {
    /// Lay out a floated child and place it in the current float
    /// context.
    ///
    /// "A floated box is removed from the in-flow and attached to the
    /// containing block's left or right float list at its natural
    /// vertical position."
    pub(super) fn layout_float(&mut self, id: BoxId, cb: &ContainingBlock, natural_y: f32) {
        let style = self.rt.get(id).style.clone();
        let side = style.float;

        // STEP 1: used width — specified or shrink-to-fit.
        let (borders, padding) = self.resolve_border_padding(id, cb.width);
        let h_extras = (borders.horizontal() + padding.horizontal()) as f32;
        let margin_left = self.cvt_auto(id, &style.margin.left, Some(cb.width)).unwrap_or(0.0);
        let margin_right = self
            .cvt_auto(id, &style.margin.right, Some(cb.width))
            .unwrap_or(0.0);
        let content_width = match self.cvt_auto(id, &style.width, Some(cb.width)) {
            Some(width) => width.max(0.0),
            None => self.shrink_to_fit(id, (cb.width - h_extras).max(0.0)),
        };
        let content_width = self.clamp_width(id, content_width, cb);

        // STEP 2: lay out the float's content at a provisional origin
        // with its used width pinned (auto margins are zero on floats);
        // the subtree is translated once the float lands.
        let saved_width = std::mem::replace(
            &mut self.rt.get_mut(id).style.width,
            marten_css::Length::px(content_width),
        );
        let saved_sizing = std::mem::replace(
            &mut self.rt.get_mut(id).style.box_sizing,
            marten_css::style::BoxSizing::ContentBox,
        );
        let saved_margin_left = std::mem::replace(
            &mut self.rt.get_mut(id).style.margin.left,
            marten_css::Length::px(margin_left),
        );
        let saved_margin_right = std::mem::replace(
            &mut self.rt.get_mut(id).style.margin.right,
            marten_css::Length::px(margin_right),
        );
        let provisional = ContainingBlock {
            x: cb.x,
            y: natural_y,
            width: content_width + h_extras + margin_left + margin_right,
            height: None,
        };
        let border_height = self.layout_block_level(id, &provisional, natural_y);
        {
            let style = &mut self.rt.get_mut(id).style;
            style.width = saved_width;
            style.box_sizing = saved_sizing;
            style.margin.left = saved_margin_left;
            style.margin.right = saved_margin_right;
        }

        let (margin_top, margin_bottom) = self.vertical_margins(id, cb.width);
        let outer_width = content_width + h_extras + margin_left + margin_right;
        let outer_height = border_height + margin_top + margin_bottom;

        // STEP 3: clear, then place in the band structure.
        let mut y = natural_y;
        if style.clear != Clear::None {
            y = self.floats().clear_y(style.clear, y);
        }
        let placed = self
            .floats()
            .place(id, side, outer_width.max(0.0), outer_height.max(0.0), y);

        // STEP 4: move the float (and subtree) to its placed position.
        let current = self.rt.get(id).margin_box();
        let dx = placed.x - current.x;
        let dy = placed.y - current.y;
        self.translate_subtree(id, dx, dy);

        // STEP 5: attach to the establishing block's float list for the
        // paint walk.
        if let Some(root) = self.current_bfc_root() {
            match side {
                FloatMode::Right => self.rt.get_mut(root).floats_right.push(id),
                _ => self.rt.get_mut(root).floats_left.push(id),
            }
        }
    }

    /// Register an absolutely positioned box with its containing block
    /// (the nearest positioned ancestor box, or the root).
    pub(super) fn register_absolute(&mut self, id: BoxId) {
        let mut ancestor = self.rt.get(id).parent;
        let is_fixed = self.rt.get(id).style.position == Position::Fixed;
        let mut target = self.rt.root;
        while let Some(current) = ancestor {
            if !is_fixed && self.rt.get(current).style.position.is_positioned() {
                target = Some(current);
                break;
            }
            ancestor = self.rt.get(current).parent;
        }
        if let Some(target) = target {
            self.rt.get_mut(id).containing_block = Some(target);
            if !self.rt.get(target).absolutes.contains(&id) {
                self.rt.get_mut(target).absolutes.push(id);
            }
        }
    }
}
