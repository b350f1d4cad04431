//! Absolute and fixed positioning.
//!
//! [CSS2 § 10.3.7 / § 10.6.4 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
//!
//! Absolutely positioned boxes resolve after the in-flow layout of
//! their containing block is complete, using the four offset properties
//! with the standard `auto` resolution rules. The containing block is
//! the padding box of the nearest positioned ancestor; for
//! `position: fixed` it is the viewport.

use marten_css::style::Position;

use crate::geometry::{round_half_even, Rect};
use crate::render_tree::BoxId;

use super::{ContainingBlock, LayoutEngine, RenderMode};

impl LayoutEngine<'_> {
    /// Lay out every positioned descendant registered on `id`, now that
    /// its padding box is final.
    pub(super) fn layout_absolutes(&mut self, id: BoxId) {
        let absolutes = self.rt.get(id).absolutes.clone();
        if absolutes.is_empty() {
            return;
        }

        // The containing block is the padding box.
        let b = self.rt.get(id);
        let border_box = b.border_box();
        let padding_box = Rect {
            x: border_box.x + b.borders.left,
            y: border_box.y + b.borders.top,
            width: border_box.width - b.borders.horizontal(),
            height: border_box.height - b.borders.vertical(),
        };

        for abs in absolutes {
            let is_fixed = self.rt.get(abs).style.position == Position::Fixed;
            match self.mode {
                RenderMode::NoFixed if is_fixed => continue,
                RenderMode::FixedOnly if !is_fixed => continue,
                _ => {}
            }
            let cb_rect = if is_fixed { self.viewport } else { padding_box };
            self.position_out_of_flow(abs, cb_rect);
        }
    }

    /// Position `position: fixed` boxes against the viewport (used by
    /// the fixed-only render mode, where in-flow layout is reused).
    pub(super) fn layout_fixed(&mut self, root: BoxId) {
        if self.mode != RenderMode::FixedOnly {
            return;
        }
        let absolutes = self.rt.get(root).absolutes.clone();
        for abs in absolutes {
            if self.rt.get(abs).style.position == Position::Fixed {
                self.position_out_of_flow(abs, self.viewport);
            }
        }
    }

    /// Resolve one out-of-flow box against its containing-block rect.
    fn position_out_of_flow(&mut self, id: BoxId, cb_rect: Rect) {
        let style = self.rt.get(id).style.clone();
        let cb = ContainingBlock {
            x: cb_rect.x as f32,
            y: cb_rect.y as f32,
            width: cb_rect.width as f32,
            height: Some(cb_rect.height as f32),
        };

        let left = self.cvt_auto(id, &style.offsets.left, Some(cb.width));
        let right = self.cvt_auto(id, &style.offsets.right, Some(cb.width));
        let top = self.cvt_auto(id, &style.offsets.top, cb.height);
        let bottom = self.cvt_auto(id, &style.offsets.bottom, cb.height);

        let (borders, padding) = self.resolve_border_padding(id, cb.width);
        let h_extras = (borders.horizontal() + padding.horizontal()) as f32;
        let margin_left = self
            .cvt_auto(id, &style.margin.left, Some(cb.width))
            .unwrap_or(0.0);
        let margin_right = self
            .cvt_auto(id, &style.margin.right, Some(cb.width))
            .unwrap_or(0.0);
        let (margin_top, margin_bottom) = self.vertical_margins(id, cb.width);

        // STEP 1: used width.
        //
        // "If all three of left, width, and right are auto... the width
        // is shrink-to-fit. If none are auto, solve the equation."
        let content_width = match self.cvt_auto(id, &style.width, Some(cb.width)) {
            Some(width) => width.max(0.0),
            None => match (left, right) {
                (Some(l), Some(r)) => {
                    (cb.width - l - r - h_extras - margin_left - margin_right).max(0.0)
                }
                _ => {
                    let available = (cb.width - h_extras).max(0.0);
                    self.shrink_to_fit(id, available)
                }
            },
        };
        let content_width = self.clamp_width(id, content_width, &cb);
        let outer_width = content_width + h_extras + margin_left + margin_right;

        // STEP 2: lay out the content with the width pinned.
        let saved_width = std::mem::replace(
            &mut self.rt.get_mut(id).style.width,
            marten_css::Length::px(content_width),
        );
        let saved_sizing = std::mem::replace(
            &mut self.rt.get_mut(id).style.box_sizing,
            marten_css::style::BoxSizing::ContentBox,
        );
        let provisional = ContainingBlock {
            x: cb.x,
            y: cb.y,
            width: outer_width,
            height: cb.height,
        };
        let border_height = self.layout_block_level(id, &provisional, cb.y);
        {
            let b = self.rt.get_mut(id);
            b.style.width = saved_width;
            b.style.box_sizing = saved_sizing;
        }
        let outer_height = border_height + margin_top + margin_bottom;

        // STEP 3: final offsets.
        //
        // "left wins over right when both are set (ltr); top wins over
        // bottom." Auto offsets fall back to the static-position
        // approximation: the containing block's content origin.
        let x = if let Some(l) = left {
            cb.x + l + margin_left
        } else if let Some(r) = right {
            cb.x + cb.width - r - outer_width + margin_left
        } else {
            cb.x + margin_left
        };
        let y = if let Some(t) = top {
            cb.y + t + margin_top
        } else if let Some(b) = bottom {
            cb.y + cb.height.unwrap_or(0.0) - b - outer_height + margin_top
        } else {
            cb.y + margin_top
        };

        // STEP 4: height between offsets when both are set and height
        // is auto.
        if style.height.is_predefined() {
            if let (Some(t), Some(b)) = (top, bottom) {
                if let Some(cb_height) = cb.height {
                    let target =
                        (cb_height - t - b - margin_top - margin_bottom
                            - (self.rt.get(id).borders.vertical()
                                + self.rt.get(id).padding.vertical())
                                as f32)
                            .max(0.0);
                    self.rt.get_mut(id).pos.height = round_half_even(target);
                }
            }
        }

        // STEP 5: move the subtree to its resolved position.
        let current = self.rt.get(id).border_box();
        let dx = round_half_even(x) - current.x;
        let dy = round_half_even(y) - current.y;
        self.translate_subtree(id, dx, dy);
        {
            let b = self.rt.get_mut(id);
            b.margins.top = round_half_even(margin_top);
            b.margins.bottom = round_half_even(margin_bottom);
            b.margins.left = round_half_even(margin_left);
            b.margins.right = round_half_even(margin_right);
        }
    }
}
