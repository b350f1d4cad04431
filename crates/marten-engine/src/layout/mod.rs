//! The layout engine.
//!
//! [CSS2 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! Given a top-level content width, assigns every box an `(x, y, width,
//! height)`. Arithmetic runs in `f32`; results commit to integer pixels
//! through [`round_half_even`] when written to a box's position fields,
//! so identical inputs reproduce identical coordinates.
//!
//! The engine is a set of cooperating passes over the render arena:
//!
//! - block formatting contexts with sibling margin collapsing
//!   ([`Self::layout_block_children`]),
//! - inline formatting contexts with line boxes and floats
//!   (`inline.rs`),
//! - float placement and clearance (`float.rs`),
//! - CSS2 automatic table layout (`table.rs`),
//! - flex main/cross resolution (`flex.rs`),
//! - absolute/fixed positioning (`positioned.rs`).
//!
//! Layout has no error return: degenerate inputs clamp to zero extents
//! and every pass terminates without divergence (dependent-size retries
//! are bounded by the document's render loop).

mod flex;
mod float;
mod inline;
mod positioned;
mod table;

pub use float::FloatContext;

use marten_css::style::{Clear, FloatMode, Position};
use marten_css::{Length, LengthUnit};

use crate::container::DocumentContainer;
use crate::geometry::{round_half_even, EdgeInsets, Rect, Size};
use crate::render_tree::{BoxId, BoxKind, RenderTree};

/// Which boxes a `render` pass positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Everything.
    #[default]
    All,
    /// Everything except `position: fixed` boxes.
    NoFixed,
    /// Only `position: fixed` boxes (over an existing layout).
    FixedOnly,
}

/// The containing block a box resolves against: content-box origin in
/// absolute coordinates, width, and height when definite.
#[derive(Debug, Clone, Copy)]
pub struct ContainingBlock {
    /// Content-box left, absolute.
    pub x: f32,
    /// Content-box top, absolute.
    pub y: f32,
    /// Content-box width.
    pub width: f32,
    /// Content-box height, when definite. Percentages against an
    /// indefinite height resolve to auto, not zero.
    pub height: Option<f32>,
}

/// One active block formatting context: the float context plus the id
/// of the establishing box (floats attach there for painting).
struct ActiveBfc {
    floats: FloatContext,
    root: BoxId,
}

/// The layout engine over one render tree.
pub struct LayoutEngine<'a> {
    /// The box arena being laid out.
    pub rt: &'a mut RenderTree,
    /// The host container (text measurement, image sizes, viewport).
    pub container: &'a mut dyn DocumentContainer,
    /// The viewport, for `vw`/`vh` and fixed positioning.
    pub viewport: Rect,
    /// Which boxes this pass positions.
    pub mode: RenderMode,
    /// The root element's computed font size, for `rem`.
    pub root_font_size: f32,
    /// Stack of open block formatting contexts.
    bfcs: Vec<ActiveBfc>,
}

/// Lay out the whole document at `max_width`. Returns the content
/// extents (document width/height).
pub fn layout_document(
    rt: &mut RenderTree,
    container: &mut dyn DocumentContainer,
    max_width: i32,
    mode: RenderMode,
) -> Size {
    let Some(root) = rt.root else {
        return Size::default();
    };
    let viewport = container.get_client_rect();
    let root_font_size = rt.get(root).style.font_size;

    let mut engine = LayoutEngine {
        rt,
        container,
        viewport,
        mode,
        root_font_size,
        bfcs: Vec::new(),
    };

    if mode != RenderMode::FixedOnly {
        let cb = ContainingBlock {
            x: 0.0,
            y: 0.0,
            width: max_width as f32,
            height: Some(viewport.height as f32),
        };
        engine.begin_bfc(root, 0.0, max_width as f32);
        let _ = engine.layout_block_level(root, &cb, 0.0);
        engine.end_bfc();
    }

    // Fixed boxes hang off the root and position against the viewport.
    engine.layout_fixed(root);

    engine.content_extents(root)
}

impl LayoutEngine<'_> {
    // ===== Unit resolution =====

    /// Resolve a length to pixels for a given box.
    ///
    /// `percent_base` is the referent for percentages; `None` means the
    /// referent is indefinite and the caller treats the value as auto.
    pub fn cvt(&mut self, id: BoxId, length: &Length, percent_base: Option<f32>) -> f32 {
        match length {
            Length::Predef(_) => 0.0,
            Length::Value { value, unit } => {
                let style_font_size = self.rt.get(id).style.font_size;
                let metrics = self.rt.get(id).font_metrics;
                match unit {
                    LengthUnit::Px | LengthUnit::None => *value,
                    LengthUnit::Percent => percent_base.map_or(0.0, |base| base * value / 100.0),
                    LengthUnit::Em => value * style_font_size,
                    LengthUnit::Rem => value * self.root_font_size,
                    LengthUnit::Ex => value * metrics.x_height as f32,
                    LengthUnit::Ch => value * metrics.ch_width as f32,
                    LengthUnit::Pt => self.container.pt_to_px(value.round() as i32) as f32
                        + (value - value.round()) * 96.0 / 72.0,
                    LengthUnit::In => value * self.container.pt_to_px(72) as f32,
                    LengthUnit::Cm => value * self.container.pt_to_px(72) as f32 / 2.54,
                    LengthUnit::Mm => value * self.container.pt_to_px(72) as f32 / 25.4,
                    LengthUnit::Vw => value * self.viewport.width as f32 / 100.0,
                    LengthUnit::Vh => value * self.viewport.height as f32 / 100.0,
                    LengthUnit::Vmin => {
                        value * self.viewport.width.min(self.viewport.height) as f32 / 100.0
                    }
                    LengthUnit::Vmax => {
                        value * self.viewport.width.max(self.viewport.height) as f32 / 100.0
                    }
                }
            }
            Length::Calc(expr) => {
                let expr = expr.clone();
                expr.evaluate(&mut_resolver(self, id, percent_base))
            }
        }
    }

    /// A length that may be `auto` (predef slot): `None` when auto.
    fn cvt_auto(&mut self, id: BoxId, length: &Length, percent_base: Option<f32>) -> Option<f32> {
        if length.is_predefined() {
            return None;
        }
        if length.is_percent() && percent_base.is_none() {
            // Percentage against an indefinite referent is auto.
            return None;
        }
        Some(self.cvt(id, length, percent_base))
    }

    // ===== Edges =====

    /// Resolve padding and border widths for a box against its
    /// containing block width. Border widths collapse to zero when the
    /// side's style is invisible.
    fn resolve_border_padding(&mut self, id: BoxId, cb_width: f32) -> (EdgeInsets, EdgeInsets) {
        let style = self.rt.get(id).style.clone();
        let base = Some(cb_width);
        let pad = EdgeInsets {
            top: round_half_even(self.cvt(id, &style.padding.top, base).max(0.0)),
            right: round_half_even(self.cvt(id, &style.padding.right, base).max(0.0)),
            bottom: round_half_even(self.cvt(id, &style.padding.bottom, base).max(0.0)),
            left: round_half_even(self.cvt(id, &style.padding.left, base).max(0.0)),
        };
        let side = |engine: &mut Self, width: &Length, invisible: bool| -> i32 {
            if invisible {
                0
            } else {
                round_half_even(engine.cvt(id, width, base).max(0.0))
            }
        };
        let borders = EdgeInsets {
            top: side(self, &style.border_top.width, style.border_top.style.is_invisible()),
            right: side(
                self,
                &style.border_right.width,
                style.border_right.style.is_invisible(),
            ),
            bottom: side(
                self,
                &style.border_bottom.width,
                style.border_bottom.style.is_invisible(),
            ),
            left: side(
                self,
                &style.border_left.width,
                style.border_left.style.is_invisible(),
            ),
        };
        (borders, pad)
    }

    /// Vertical margins resolve early (before width) for collapsing;
    /// `auto` is zero vertically.
    fn vertical_margins(&mut self, id: BoxId, cb_width: f32) -> (f32, f32) {
        let style = self.rt.get(id).style.clone();
        let top = self
            .cvt_auto(id, &style.margin.top, Some(cb_width))
            .unwrap_or(0.0);
        let bottom = self
            .cvt_auto(id, &style.margin.bottom, Some(cb_width))
            .unwrap_or(0.0);
        (top, bottom)
    }

    // ===== BFC and float stack =====

    fn begin_bfc(&mut self, root: BoxId, origin_x: f32, width: f32) {
        self.bfcs.push(ActiveBfc {
            floats: FloatContext::new(origin_x, width),
            root,
        });
    }

    fn end_bfc(&mut self) {
        let _ = self.bfcs.pop();
    }

    fn current_bfc_root(&self) -> Option<BoxId> {
        self.bfcs.last().map(|bfc| bfc.root)
    }

    /// The active float context (every in-flow box is inside some BFC).
    pub fn floats(&mut self) -> &mut FloatContext {
        let top = self.bfcs.len() - 1;
        &mut self.bfcs[top].floats
    }

    /// True if this box starts its own block formatting context.
    fn establishes_bfc(&self, id: BoxId) -> bool {
        let b = self.rt.get(id);
        matches!(
            b.kind,
            BoxKind::InlineBlock | BoxKind::TableCell | BoxKind::Table | BoxKind::Flex
        ) || b.style.float != FloatMode::None
            || b.style.overflow.clips()
            || b.style.position.is_positioned() && b.style.position != Position::Relative
            || self.rt.root == Some(id)
    }

    // ===== Block-level layout =====

    /// [CSS2 § 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// "The resulting margin width is the maximum of the collapsing
    /// margins' widths; negative margins deduct from the positive
    /// maximum."
    fn collapse_margins(a: f32, b: f32) -> f32 {
        if a >= 0.0 && b >= 0.0 {
            a.max(b)
        } else if a < 0.0 && b < 0.0 {
            a.min(b)
        } else {
            a + b
        }
    }

    /// Lay out one block-level box with its border-box top at
    /// `border_top_y` inside `cb`. Returns the border-box height.
    pub fn layout_block_level(&mut self, id: BoxId, cb: &ContainingBlock, border_top_y: f32) -> f32 {
        let (borders, padding) = self.resolve_border_padding(id, cb.width);
        let (margin_top, margin_bottom) = self.vertical_margins(id, cb.width);
        let style = self.rt.get(id).style.clone();

        // STEP 1: horizontal geometry per CSS2 § 10.3.3.
        let h_extras = (borders.horizontal() + padding.horizontal()) as f32;
        let specified_width = self.cvt_auto(id, &style.width, Some(cb.width));
        let mut margin_left = self.cvt_auto(id, &style.margin.left, Some(cb.width));
        let mut margin_right = self.cvt_auto(id, &style.margin.right, Some(cb.width));

        let mut content_width = match specified_width {
            Some(width) => {
                let mut width = width;
                if style.box_sizing == marten_css::style::BoxSizing::BorderBox {
                    width -= h_extras;
                }
                width.max(0.0)
            }
            None => {
                // "auto: the width depends on the other properties" —
                // block-level auto width fills the containing block.
                let ml = margin_left.unwrap_or(0.0);
                let mr = margin_right.unwrap_or(0.0);
                margin_left = Some(ml);
                margin_right = Some(mr);
                (cb.width - ml - mr - h_extras).max(0.0)
            }
        };

        // Replaced elements fall back to their intrinsic size.
        if specified_width.is_none() && self.rt.get(id).replaced.is_some() {
            content_width = self.replaced_width(id, cb);
        }

        // min/max clamp (min wins over max).
        content_width = self.clamp_width(id, content_width, cb);

        // STEP 2: auto horizontal margins absorb the residual width.
        // "If both margin-left and margin-right are auto, their used
        // values are equal" — centering.
        let residual = cb.width - content_width - h_extras;
        let (ml, mr) = match (margin_left, margin_right) {
            (Some(ml), Some(mr)) => (ml, mr),
            (None, None) => (residual / 2.0, residual / 2.0),
            (None, Some(mr)) => (residual - mr, mr),
            (Some(ml), None) => (ml, residual - ml),
        };

        // STEP 3: commit edges and the content origin.
        let content_x = cb.x + ml + borders.left as f32 + padding.left as f32;
        let content_y = border_top_y + borders.top as f32 + padding.top as f32;
        {
            let b = self.rt.get_mut(id);
            b.margins = EdgeInsets {
                top: round_half_even(margin_top),
                right: round_half_even(mr),
                bottom: round_half_even(margin_bottom),
                left: round_half_even(ml),
            };
            b.borders = borders;
            b.padding = padding;
            b.pos = Rect {
                x: round_half_even(content_x),
                y: round_half_even(content_y),
                width: round_half_even(content_width),
                height: 0,
            };
            b.lines.clear();
            b.floats_left.clear();
            b.floats_right.clear();
        }

        // STEP 4: inner layout by kind.
        let starts_bfc = self.establishes_bfc(id);
        if starts_bfc && self.rt.root != Some(id) {
            self.begin_bfc(id, content_x, content_width);
        }

        let kind = self.rt.get(id).kind.clone();
        let mut content_height = match kind {
            BoxKind::Table => self.layout_table(id, content_x, content_y, content_width),
            BoxKind::Flex => self.layout_flex(id, content_x, content_y, content_width),
            _ if self.rt.get(id).replaced.is_some() => self.replaced_height(id, content_width, cb),
            _ => self.layout_container_children(id, content_x, content_y, content_width, cb),
        };

        if starts_bfc {
            // A BFC contains its floats.
            let float_bottom = self.floats().lowest_bottom();
            if float_bottom > content_y + content_height {
                content_height = float_bottom - content_y;
            }
            if self.rt.root != Some(id) {
                self.end_bfc();
            }
        }

        // STEP 5: height override and clamps.
        if let Some(height) = self.cvt_auto(id, &style.height, cb.height) {
            let mut height = height;
            if style.box_sizing == marten_css::style::BoxSizing::BorderBox {
                height -= (borders.vertical() + padding.vertical()) as f32;
            }
            content_height = height.max(0.0);
        }
        content_height = self.clamp_height(id, content_height, cb);

        self.rt.get_mut(id).pos.height = round_half_even(content_height.max(0.0));

        // STEP 6: relative offset shifts the box and its subtree.
        if style.position == Position::Relative {
            self.apply_relative_offset(id, cb);
        }

        // STEP 7: positioned descendants resolve once this containing
        // block has its final size.
        if style.position.is_positioned() || self.rt.root == Some(id) {
            self.layout_absolutes(id);
        }

        (self.rt.get(id).border_box().height).max(0) as f32
    }

    /// Width clamped by min/max-width ("min wins").
    fn clamp_width(&mut self, id: BoxId, width: f32, cb: &ContainingBlock) -> f32 {
        let style = self.rt.get(id).style.clone();
        let mut width = width;
        if let Some(max) = self.cvt_auto(id, &style.max_width, Some(cb.width)) {
            width = width.min(max);
        }
        if let Some(min) = self.cvt_auto(id, &style.min_width, Some(cb.width)) {
            width = width.max(min);
        }
        width.max(0.0)
    }

    /// Height clamped by min/max-height.
    fn clamp_height(&mut self, id: BoxId, height: f32, cb: &ContainingBlock) -> f32 {
        let style = self.rt.get(id).style.clone();
        let mut height = height;
        if let Some(max) = self.cvt_auto(id, &style.max_height, cb.height) {
            height = height.min(max);
        }
        if let Some(min) = self.cvt_auto(id, &style.min_height, cb.height) {
            height = height.max(min);
        }
        height.max(0.0)
    }

    /// Lay out a block container's contents: either an inline formatting
    /// context or a stack of block-level children. Returns the content
    /// height.
    fn layout_container_children(
        &mut self,
        id: BoxId,
        content_x: f32,
        content_y: f32,
        content_width: f32,
        cb: &ContainingBlock,
    ) -> f32 {
        let children = self.rt.get(id).children.clone();
        if children.is_empty() {
            return 0.0;
        }

        // In-flow children decide the formatting context; out-of-flow
        // boxes join either way.
        let mut has_inline = false;
        let mut has_block = false;
        for &child in &children {
            let b = self.rt.get(child);
            let out_of_flow = matches!(b.style.position, Position::Absolute | Position::Fixed)
                || b.style.float != FloatMode::None;
            if out_of_flow {
                continue;
            }
            if b.kind.is_inline_level() {
                has_inline = true;
            } else {
                has_block = true;
            }
        }
        let all_inline = has_inline && !has_block;

        let inner_cb = ContainingBlock {
            x: content_x,
            y: content_y,
            width: content_width,
            height: None,
        };

        if all_inline {
            self.layout_inline_children(id, &inner_cb)
        } else {
            self.layout_block_children(id, &inner_cb)
        }
    }

    /// [CSS2 § 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Boxes are laid out one after the other, vertically... The
    /// vertical distance between two sibling boxes is determined by the
    /// margin properties. Vertical margins between adjacent block-level
    /// boxes in a block formatting context collapse."
    fn layout_block_children(&mut self, id: BoxId, cb: &ContainingBlock) -> f32 {
        let children = self.rt.get(id).children.clone();
        let mut cursor = cb.y;
        let mut pending_margin = 0.0_f32;
        let mut saw_in_flow = false;

        for child in children {
            let child_style = self.rt.get(child).style.clone();

            // Out-of-flow: absolutes are registered for later.
            if matches!(child_style.position, Position::Absolute | Position::Fixed) {
                self.register_absolute(child);
                continue;
            }
            // Floats leave the flow and land in the float context.
            if child_style.float != FloatMode::None {
                self.layout_float(child, cb, cursor + pending_margin.max(0.0));
                continue;
            }
            // Text strays in a block run carry no box of their own
            // (anonymization wraps meaningful runs).
            if matches!(self.rt.get(child).kind, BoxKind::Text(_)) {
                continue;
            }

            let (margin_top, margin_bottom) = self.vertical_margins(child, cb.width);
            let gap = Self::collapse_margins(pending_margin, margin_top);
            let mut border_top_y = cursor + gap;

            // [§ 9.5.2] clear: advance past the matching floats.
            if child_style.clear != Clear::None {
                let cleared = self.floats().clear_y(child_style.clear, border_top_y);
                border_top_y = cleared;
            }

            let height = self.layout_block_level(child, cb, border_top_y);
            cursor = border_top_y + height;
            pending_margin = margin_bottom;
            saw_in_flow = true;
        }

        if !saw_in_flow {
            return 0.0;
        }
        // The last child's bottom margin stays inside this container.
        (cursor + pending_margin.max(0.0) - cb.y).max(0.0)
    }

    /// Replaced-element used width: attribute/intrinsic, aspect-scaled
    /// when only the height is fixed.
    fn replaced_width(&mut self, id: BoxId, cb: &ContainingBlock) -> f32 {
        let b = self.rt.get(id);
        let intrinsic = b.intrinsic;
        let style = b.style.clone();
        let height = self.cvt_auto(id, &style.height, cb.height);
        if let Some(height) = height {
            if intrinsic.height > 0 {
                return height * intrinsic.width as f32 / intrinsic.height as f32;
            }
        }
        intrinsic.width as f32
    }

    /// Replaced-element used height.
    fn replaced_height(&mut self, id: BoxId, used_width: f32, _cb: &ContainingBlock) -> f32 {
        let intrinsic = self.rt.get(id).intrinsic;
        if intrinsic.width > 0 {
            used_width * intrinsic.height as f32 / intrinsic.width as f32
        } else {
            intrinsic.height as f32
        }
    }

    /// Translate a box and its whole subtree (relative positioning,
    /// line distribution).
    pub fn translate_subtree(&mut self, id: BoxId, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let b = self.rt.get_mut(current);
            b.pos = b.pos.translated(dx, dy);
            for line in &mut b.lines {
                line.top += dy;
                line.left += dx;
                for fragment in &mut line.fragments {
                    fragment.rect = fragment.rect.translated(dx, dy);
                }
            }
            stack.extend(self.rt.get(current).children.iter().copied());
            stack.extend(self.rt.get(current).absolutes.iter().copied());
        }
    }

    /// [CSS2 § 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    fn apply_relative_offset(&mut self, id: BoxId, cb: &ContainingBlock) {
        let style = self.rt.get(id).style.clone();
        let left = self.cvt_auto(id, &style.offsets.left, Some(cb.width));
        let right = self.cvt_auto(id, &style.offsets.right, Some(cb.width));
        let top = self.cvt_auto(id, &style.offsets.top, cb.height);
        let bottom = self.cvt_auto(id, &style.offsets.bottom, cb.height);

        // "If both left and right are not auto, left wins (ltr)."
        let dx = left.or(right.map(|r| -r)).unwrap_or(0.0);
        let dy = top.or(bottom.map(|b| -b)).unwrap_or(0.0);
        self.translate_subtree(id, round_half_even(dx), round_half_even(dy));
    }

    // ===== Content extents =====

    /// The document content extents.
    ///
    /// Auto-width block containers fill their containing block, so
    /// their full margin box says nothing about where content actually
    /// is; they contribute only through their children. Boxes with an
    /// explicit width, replaced content, floats, and positioned boxes
    /// contribute their margin boxes; text contributes its fragments.
    /// Uncomputed regions stay at zero extent.
    fn content_extents(&self, root: BoxId) -> Size {
        let mut extent = Rect::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let b = self.rt.get(id);
            let sized = !b.style.width.is_predefined()
                || b.replaced.is_some()
                || b.style.float != FloatMode::None
                || matches!(b.style.position, Position::Absolute | Position::Fixed)
                || matches!(b.kind, BoxKind::Table | BoxKind::TableCell | BoxKind::InlineBlock);
            if sized {
                extent = extent.union(&b.margin_box());
            } else {
                // Height still registers through an explicit height.
                if !b.style.height.is_predefined() {
                    let margin_box = b.margin_box();
                    extent = extent.union(&Rect {
                        width: 0,
                        ..margin_box
                    });
                }
            }
            for line in &b.lines {
                for fragment in &line.fragments {
                    extent = extent.union(&fragment.rect);
                }
            }
            stack.extend(b.children.iter().copied());
            stack.extend(b.absolutes.iter().copied());
        }
        Size {
            width: extent.right().max(0),
            height: extent.bottom().max(0),
        }
    }

    // ===== Content measurement (min/max widths) =====

    /// Min/max content widths, the first pass of shrink-to-fit and
    /// automatic table layout: min is the widest unbreakable unit, max
    /// is the single-line width.
    pub fn measure_min_max(&mut self, id: BoxId) -> (f32, f32) {
        let b = self.rt.get(id);
        let style = b.style.clone();
        let kind = b.kind.clone();
        let replaced = b.replaced.is_some();
        let intrinsic = b.intrinsic;
        let font = b.font;

        // An explicit non-percent width pins both bounds.
        if !style.width.is_predefined() && !style.width.is_percent() {
            let width = self.cvt(id, &style.width.clone(), None).max(0.0);
            let extra = self.min_max_edges(id);
            return (width + extra, width + extra);
        }
        if replaced {
            let extra = self.min_max_edges(id);
            let width = intrinsic.width as f32;
            return (width + extra, width + extra);
        }

        match kind {
            BoxKind::Text(text) => {
                let mut min = 0.0_f32;
                let mut total = 0.0_f32;
                let space = self.container.text_width(" ", font) as f32;
                let mut first = true;
                for word in text.split_whitespace() {
                    let width = self.container.text_width(word, font) as f32;
                    min = min.max(width);
                    if !first {
                        total += space;
                    }
                    total += width;
                    first = false;
                }
                (min, total)
            }
            BoxKind::LineBreak | BoxKind::SoftBreak => (0.0, 0.0),
            BoxKind::Inline => {
                let children = self.rt.get(id).children.clone();
                let mut min = 0.0_f32;
                let mut max = 0.0_f32;
                for child in children {
                    let (child_min, child_max) = self.measure_min_max(child);
                    min = min.max(child_min);
                    max += child_max;
                }
                (min, max)
            }
            BoxKind::Table => {
                let extra = self.min_max_edges(id);
                let (min, max) = self.measure_table_min_max(id);
                (min + extra, max + extra)
            }
            _ => {
                // Block containers: inline runs sum, block children
                // stack.
                let children = self.rt.get(id).children.clone();
                let mut min = 0.0_f32;
                let mut max = 0.0_f32;
                let mut inline_run = 0.0_f32;
                for child in children {
                    let child_box = self.rt.get(child);
                    if matches!(child_box.style.position, Position::Absolute | Position::Fixed) {
                        continue;
                    }
                    let inline = child_box.kind.is_inline_level();
                    let (child_min, child_max) = self.measure_min_max(child);
                    min = min.max(child_min);
                    if inline {
                        inline_run += child_max;
                    } else {
                        max = max.max(inline_run);
                        inline_run = 0.0;
                        max = max.max(child_max);
                    }
                }
                max = max.max(inline_run);
                let extra = self.min_max_edges(id);
                (min + extra, max + extra)
            }
        }
    }

    /// Horizontal margins+borders+padding contribution for measurement.
    fn min_max_edges(&mut self, id: BoxId) -> f32 {
        let style = self.rt.get(id).style.clone();
        let mut total = 0.0;
        for length in [
            &style.margin.left,
            &style.margin.right,
            &style.padding.left,
            &style.padding.right,
        ] {
            if !length.is_predefined() && !length.is_percent() {
                total += self.cvt(id, length, None);
            }
        }
        if !style.border_left.style.is_invisible() {
            total += self.cvt(id, &style.border_left.width.clone(), None);
        }
        if !style.border_right.style.is_invisible() {
            total += self.cvt(id, &style.border_right.width.clone(), None);
        }
        total
    }

    /// Shrink-to-fit width: `min(max(preferred-min, available),
    /// preferred)`.
    pub fn shrink_to_fit(&mut self, id: BoxId, available: f32) -> f32 {
        let (min, max) = self.measure_min_max(id);
        let edges = self.min_max_edges(id);
        // measure_min_max includes edges; the fit width is content-only.
        let min = (min - edges).max(0.0);
        let max = (max - edges).max(0.0);
        min.max(max.min(available)).max(0.0)
    }
}

/// Build a leaf resolver closure for calc evaluation.
fn mut_resolver(
    engine: &LayoutEngine<'_>,
    id: BoxId,
    percent_base: Option<f32>,
) -> impl Fn(&Length) -> f32 {
    // Calc leaves are plain values; resolve them without re-entering
    // the engine mutably by snapshotting the needed context.
    let font_size = engine.rt.get(id).style.font_size;
    let metrics = engine.rt.get(id).font_metrics;
    let root_font_size = engine.root_font_size;
    let viewport = engine.viewport;
    let pt_ratio = engine.container.pt_to_px(72) as f32 / 72.0;
    move |leaf: &Length| match leaf {
        Length::Predef(_) => 0.0,
        Length::Calc(_) => 0.0,
        Length::Value { value, unit } => match unit {
            LengthUnit::Px | LengthUnit::None => *value,
            LengthUnit::Percent => percent_base.map_or(0.0, |base| base * value / 100.0),
            LengthUnit::Em => value * font_size,
            LengthUnit::Rem => value * root_font_size,
            LengthUnit::Ex => value * metrics.x_height as f32,
            LengthUnit::Ch => value * metrics.ch_width as f32,
            LengthUnit::Pt => value * pt_ratio,
            LengthUnit::In => value * pt_ratio * 72.0,
            LengthUnit::Cm => value * pt_ratio * 72.0 / 2.54,
            LengthUnit::Mm => value * pt_ratio * 72.0 / 25.4,
            LengthUnit::Vw => value * viewport.width as f32 / 100.0,
            LengthUnit::Vh => value * viewport.height as f32 / 100.0,
            LengthUnit::Vmin => value * viewport.width.min(viewport.height) as f32 / 100.0,
            LengthUnit::Vmax => value * viewport.width.max(viewport.height) as f32 / 100.0,
        },
    }
}
