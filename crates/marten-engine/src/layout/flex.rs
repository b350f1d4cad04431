//! Flexible box layout (single line).
//!
//! [CSS Flexbox Level 1 § 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
//!
//! Main sizes resolve by the flex resolution algorithm: sum the flex
//! bases, then distribute positive free space by `flex-grow` or negative
//! free space by `flex-shrink × flex-basis`, clamping to min/max.
//! Remaining cross-axis space aligns per `align-items`/`align-self`;
//! `justify-content` distributes main-axis free space.

use marten_css::style::{AlignItems, FlexDirection, JustifyContent, Position};

use crate::geometry::round_half_even;
use crate::render_tree::BoxId;

use super::{ContainingBlock, LayoutEngine};

/// A flex item mid-resolution.
struct FlexItem {
    id: BoxId,
    /// Content-box flex base size along the main axis.
    base: f32,
    /// Resolved main size (content box).
    main: f32,
    /// margins+borders+padding along the main axis.
    main_chrome: f32,
    grow: f32,
    shrink: f32,
    /// Outer cross size after layout.
    outer_cross: f32,
}

impl LayoutEngine<'_> {
    /// Lay out a flex container; returns the content height.
    pub(super) fn layout_flex(
        &mut self,
        id: BoxId,
        content_x: f32,
        content_y: f32,
        content_width: f32,
    ) -> f32 {
        let style = self.rt.get(id).style.clone();
        let direction = style.flex_direction;

        // STEP 1: collect the items in `order`, skipping out-of-flow
        // boxes.
        let mut children: Vec<BoxId> = self
            .rt
            .get(id)
            .children
            .clone()
            .into_iter()
            .filter(|&child| {
                let child_style = &self.rt.get(child).style;
                if matches!(child_style.position, Position::Absolute | Position::Fixed) {
                    self.register_absolute(child);
                    false
                } else {
                    true
                }
            })
            .collect();
        children.sort_by_key(|&child| self.rt.get(child).style.order);
        if direction.is_reverse() {
            children.reverse();
        }
        if children.is_empty() {
            return 0.0;
        }

        if direction.is_row() {
            self.layout_flex_row(id, &children, content_x, content_y, content_width, &style)
        } else {
            self.layout_flex_column(id, &children, content_x, content_y, content_width, &style)
        }
    }

    /// Row direction: main = horizontal, cross = vertical.
    #[allow(clippy::too_many_arguments)]
    fn layout_flex_row(
        &mut self,
        _id: BoxId,
        children: &[BoxId],
        content_x: f32,
        content_y: f32,
        content_width: f32,
        container_style: &marten_css::ComputedStyle,
    ) -> f32 {
        let cb = ContainingBlock {
            x: content_x,
            y: content_y,
            width: content_width,
            height: None,
        };

        // STEP 2: flex base sizes.
        let mut items: Vec<FlexItem> = Vec::with_capacity(children.len());
        for &child in children {
            let child_style = self.rt.get(child).style.clone();
            let (borders, padding) = self.resolve_border_padding(child, content_width);
            let margin_left = self
                .cvt_auto(child, &child_style.margin.left, Some(content_width))
                .unwrap_or(0.0);
            let margin_right = self
                .cvt_auto(child, &child_style.margin.right, Some(content_width))
                .unwrap_or(0.0);
            let chrome =
                (borders.horizontal() + padding.horizontal()) as f32 + margin_left + margin_right;

            // "flex-basis: auto retrieves the value of the main size
            // property"; a still-auto basis falls back to the content's
            // max-content size.
            let base = self
                .cvt_auto(child, &child_style.flex_basis, Some(content_width))
                .or_else(|| self.cvt_auto(child, &child_style.width, Some(content_width)))
                .unwrap_or_else(|| {
                    let (_, max) = self.measure_min_max(child);
                    let edge = self.min_max_edges(child);
                    (max - edge).max(0.0)
                });
            let base = self.clamp_width(child, base, &cb);

            items.push(FlexItem {
                id: child,
                base,
                main: base,
                main_chrome: chrome,
                grow: child_style.flex_grow,
                shrink: child_style.flex_shrink,
                outer_cross: 0.0,
            });
        }

        // STEP 3: resolve main sizes against the free space.
        let outer_sum: f32 = items.iter().map(|i| i.base + i.main_chrome).sum();
        let free = content_width - outer_sum;
        if free > 0.0 {
            let total_grow: f32 = items.iter().map(|i| i.grow).sum();
            if total_grow > 0.0 {
                for item in &mut items {
                    item.main = item.base + free * item.grow / total_grow;
                }
            }
        } else if free < 0.0 {
            let total_factor: f32 = items.iter().map(|i| i.shrink * i.base).sum();
            if total_factor > 0.0 {
                for item in &mut items {
                    let factor = item.shrink * item.base;
                    item.main = (item.base + free * factor / total_factor).max(0.0);
                }
            }
        }
        for item in &mut items {
            item.main = self.clamp_width(item.id, item.main, &cb);
        }

        // STEP 4: lay each item out at its resolved main size.
        for item in &mut items {
            let saved_width = std::mem::replace(
                &mut self.rt.get_mut(item.id).style.width,
                marten_css::Length::px(item.main),
            );
            let saved_sizing = std::mem::replace(
                &mut self.rt.get_mut(item.id).style.box_sizing,
                marten_css::style::BoxSizing::ContentBox,
            );
            let provisional = ContainingBlock {
                x: content_x,
                y: content_y,
                width: item.main + item.main_chrome,
                height: None,
            };
            let border_height = self.layout_block_level(item.id, &provisional, content_y);
            {
                let b = self.rt.get_mut(item.id);
                b.style.width = saved_width;
                b.style.box_sizing = saved_sizing;
            }
            let (margin_top, margin_bottom) = self.vertical_margins(item.id, content_width);
            item.outer_cross = border_height + margin_top + margin_bottom;
        }

        // STEP 5: the line's cross size.
        let cross = items
            .iter()
            .map(|i| i.outer_cross)
            .fold(0.0_f32, f32::max);

        // STEP 6: main-axis distribution (justify-content) over any
        // remaining free space.
        let used: f32 = items.iter().map(|i| i.main + i.main_chrome).sum();
        let leftover = (content_width - used).max(0.0);
        let count = items.len() as f32;
        let (mut main_cursor, between) = match container_style.justify_content {
            JustifyContent::FlexStart => (0.0, 0.0),
            JustifyContent::FlexEnd => (leftover, 0.0),
            JustifyContent::Center => (leftover / 2.0, 0.0),
            JustifyContent::SpaceBetween => {
                if count > 1.0 {
                    (0.0, leftover / (count - 1.0))
                } else {
                    (0.0, 0.0)
                }
            }
            JustifyContent::SpaceAround => {
                let slice = leftover / count;
                (slice / 2.0, slice)
            }
            JustifyContent::SpaceEvenly => {
                let slice = leftover / (count + 1.0);
                (slice, slice)
            }
        };

        // STEP 7: place the items: main position + cross alignment.
        for item in &items {
            let align = resolve_align(
                self.rt.get(item.id).style.align_self,
                container_style.align_items,
            );
            let cross_offset = match align {
                AlignItems::FlexEnd => cross - item.outer_cross,
                AlignItems::Center => (cross - item.outer_cross) / 2.0,
                // Baseline degrades to start in this engine.
                _ => 0.0,
            };

            // Stretch fills the line when the item's height is auto.
            if align == AlignItems::Stretch
                && self.rt.get(item.id).style.height.is_predefined()
            {
                let b = self.rt.get_mut(item.id);
                let chrome = (b.borders.vertical() + b.padding.vertical()) as f32
                    + b.margins.vertical() as f32;
                b.pos.height = (round_half_even(cross - chrome)).max(0);
            }

            let current = self.rt.get(item.id).margin_box();
            let target_x = content_x + main_cursor;
            let target_y = content_y + cross_offset;
            self.translate_subtree(
                item.id,
                round_half_even(target_x) - current.x,
                round_half_even(target_y) - current.y,
            );
            main_cursor += item.main + item.main_chrome + between;
        }

        cross
    }

    /// Column direction: main = vertical, cross = horizontal.
    #[allow(clippy::too_many_arguments)]
    fn layout_flex_column(
        &mut self,
        id: BoxId,
        children: &[BoxId],
        content_x: f32,
        content_y: f32,
        content_width: f32,
        container_style: &marten_css::ComputedStyle,
    ) -> f32 {
        let cb = ContainingBlock {
            x: content_x,
            y: content_y,
            width: content_width,
            height: None,
        };

        // STEP 2': lay items out to learn their natural main (height)
        // sizes; the cross axis is the container width.
        let mut items: Vec<FlexItem> = Vec::with_capacity(children.len());
        for &child in children {
            let child_style = self.rt.get(child).style.clone();
            let (margin_top, margin_bottom) = self.vertical_margins(child, content_width);
            let height = self.layout_block_level(child, &cb, content_y);
            let base = self
                .cvt_auto(child, &child_style.flex_basis, None)
                .unwrap_or(height);
            items.push(FlexItem {
                id: child,
                base,
                main: base,
                main_chrome: margin_top + margin_bottom,
                grow: child_style.flex_grow,
                shrink: child_style.flex_shrink,
                outer_cross: 0.0,
            });
        }

        // STEP 3': free space exists only when the container's height
        // is definite.
        let container_height = {
            let style = self.rt.get(id).style.clone();
            self.cvt_auto(id, &style.height, None)
        };
        if let Some(container_height) = container_height {
            let outer_sum: f32 = items.iter().map(|i| i.base + i.main_chrome).sum();
            let free = container_height - outer_sum;
            if free > 0.0 {
                let total_grow: f32 = items.iter().map(|i| i.grow).sum();
                if total_grow > 0.0 {
                    for item in &mut items {
                        item.main = item.base + free * item.grow / total_grow;
                    }
                }
            } else if free < 0.0 {
                let total_factor: f32 = items.iter().map(|i| i.shrink * i.base).sum();
                if total_factor > 0.0 {
                    for item in &mut items {
                        let factor = item.shrink * item.base;
                        item.main = (item.base + free * factor / total_factor).max(0.0);
                    }
                }
            }
        }

        // STEP 4': stack the items, pinning flexed heights.
        let mut cursor = content_y;
        for item in &items {
            if (item.main - item.base).abs() > f32::EPSILON {
                let b = self.rt.get_mut(item.id);
                let chrome = (b.borders.vertical() + b.padding.vertical()) as f32;
                b.pos.height = round_half_even((item.main - chrome).max(0.0));
            }
            let current = self.rt.get(item.id).margin_box();
            let dy = round_half_even(cursor) - current.y;

            // Cross alignment: stretch widens auto-width items to the
            // full line; others keep their size and offset.
            let align = resolve_align(
                self.rt.get(item.id).style.align_self,
                container_style.align_items,
            );
            let outer_width = current.width as f32;
            let dx = match align {
                AlignItems::FlexEnd => content_width - outer_width,
                AlignItems::Center => (content_width - outer_width) / 2.0,
                _ => 0.0,
            };
            self.translate_subtree(item.id, round_half_even(dx), dy);
            cursor += self.rt.get(item.id).margin_box().height as f32;
        }

        (cursor - content_y).max(0.0)
    }
}

/// `align-self: auto` defers to the container's `align-items`.
fn resolve_align(self_align: AlignItems, container: AlignItems) -> AlignItems {
    if self_align == AlignItems::Auto {
        container
    } else {
        self_align
    }
}
