//! Inline formatting contexts: line boxes, breaking, vertical
//! alignment.
//!
//! [CSS2 § 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally,
//! one after the other, beginning at the top of a containing block...
//! Line boxes are stacked with no vertical separation."
//!
//! Text measurement goes through the container's `text_width`; the
//! engine splits runs at breakable whitespace, shortens lines around
//! floats whose vertical band they intersect, and computes each line's
//! height from the fragments' font metrics and `line-height` leading.

use marten_css::style::{FloatMode, Position, TextAlign, VerticalAlign};
use marten_css::WebColor;

use crate::container::{FontHandle, FontMetrics};
use crate::geometry::{round_half_even, Rect};
use crate::render_tree::{
    line_height_px, BoxId, BoxKind, FragmentContent, LineBox, LineFragment,
};

use super::{ContainingBlock, LayoutEngine};

/// A fragment waiting for its line to close.
struct Pending {
    source: BoxId,
    x: f32,
    width: f32,
    /// Half-leading above + font ascent: the fragment's rise over the
    /// baseline including its leading.
    ascent: f32,
    /// Descent + half-leading below.
    descent: f32,
    valign: VerticalAlign,
    kind: PendingKind,
}

enum PendingKind {
    Text {
        text: String,
        font: FontHandle,
        metrics: FontMetrics,
        color: WebColor,
        decoration: marten_css::style::TextDecorationLine,
        /// Bare font ascent/descent, for the glyph rect.
        font_ascent: f32,
        font_descent: f32,
    },
    /// An atomic inline (inline-block, replaced, inline table/flex);
    /// the box is already laid out at a provisional origin.
    Atomic {
        /// Margin-box size.
        outer_width: f32,
        outer_height: f32,
        /// Baseline distance from the margin-box top.
        baseline: f32,
    },
}

/// Line construction state for one inline formatting context.
struct LineState {
    cb: ContainingBlock,
    /// Current line's top, absolute.
    line_top: f32,
    /// Cursor within the line.
    x: f32,
    /// Usable band for the current line (floats carved out).
    band_left: f32,
    band_right: f32,
    pending: Vec<Pending>,
    lines: Vec<LineBox>,
    text_align: TextAlign,
    /// `text-indent`, applied to the first line only.
    indent: f32,
    is_first_line: bool,
    /// The strut: the block's own font contributes to every line.
    strut_ascent: f32,
    strut_descent: f32,
}

impl LineState {
    fn line_has_content(&self) -> bool {
        self.pending.iter().any(|p| match &p.kind {
            PendingKind::Text { text, .. } => !text.is_empty(),
            PendingKind::Atomic { .. } => true,
        })
    }
}

impl LayoutEngine<'_> {
    /// Lay out a block container whose children are all inline-level.
    /// Fills the host's line boxes and returns the content height.
    pub(super) fn layout_inline_children(&mut self, host: BoxId, cb: &ContainingBlock) -> f32 {
        let host_box = self.rt.get(host);
        let host_style = host_box.style.clone();
        let metrics = host_box.font_metrics;
        let line_height = line_height_px(&host_style, &metrics) as f32;
        let leading = line_height - (metrics.ascent + metrics.descent) as f32;

        let mut state = LineState {
            cb: *cb,
            line_top: cb.y,
            x: 0.0,
            band_left: cb.x,
            band_right: cb.x + cb.width,
            pending: Vec::new(),
            lines: Vec::new(),
            text_align: host_style.text_align,
            indent: {
                let indent = host_style.text_indent.clone();
                self.cvt(host, &indent, Some(cb.width))
            },
            is_first_line: true,
            strut_ascent: metrics.ascent as f32 + leading / 2.0,
            strut_descent: metrics.descent as f32 + leading / 2.0,
        };
        self.refresh_band(&mut state);
        state.x = state.band_left + state.indent;

        let children = self.rt.get(host).children.clone();
        for child in children {
            self.place_inline(child, &mut state);
        }
        self.finish_line(&mut state, false);

        let lines = std::mem::take(&mut state.lines);
        let content_bottom = lines
            .last()
            .map_or(cb.y, |line| (line.top + line.height) as f32);
        let last_baseline = lines
            .last()
            .map_or(0, |line| line.top + line.baseline - round_half_even(cb.y));

        self.assign_inline_box_bounds(host, &lines);
        let host_box = self.rt.get_mut(host);
        host_box.lines = lines;
        host_box.last_baseline = last_baseline;
        (content_bottom - cb.y).max(0.0)
    }

    /// Recompute the usable band for the current line from the float
    /// context.
    fn refresh_band(&mut self, state: &mut LineState) {
        let est_height = (state.strut_ascent + state.strut_descent).max(1.0);
        let (left, right) = {
            let cb = state.cb;
            let band = self.floats().band_at(state.line_top, est_height);
            (band.0.max(cb.x), band.1.min(cb.x + cb.width))
        };
        state.band_left = left;
        state.band_right = right;
    }

    /// Dispatch one inline-level child into the line builder.
    fn place_inline(&mut self, id: BoxId, state: &mut LineState) {
        let style = self.rt.get(id).style.clone();

        if matches!(style.position, Position::Absolute | Position::Fixed) {
            self.register_absolute(id);
            return;
        }
        if style.float != FloatMode::None {
            // Floats in inline content place at the current line top.
            let cb = state.cb;
            let line_top = state.line_top;
            self.layout_float(id, &cb, line_top);
            self.refresh_band(state);
            return;
        }

        match self.rt.get(id).kind.clone() {
            BoxKind::Text(text) => self.place_text(id, &text, state),
            BoxKind::LineBreak => {
                // "Line breaking occurs... after <br>."
                self.finish_line(state, true);
            }
            // A soft break is an extra break opportunity; words already
            // break, so it contributes nothing by itself.
            BoxKind::SoftBreak => {}
            BoxKind::Inline => {
                // [§ 9.2.2] A non-atomic inline: its edges occupy space
                // and its children join this same line builder.
                let cb_width = state.cb.width;
                let (borders, padding) = self.resolve_border_padding(id, cb_width);
                let margin_left = self
                    .cvt_auto(id, &style.margin.left.clone(), Some(cb_width))
                    .unwrap_or(0.0);
                let margin_right = self
                    .cvt_auto(id, &style.margin.right.clone(), Some(cb_width))
                    .unwrap_or(0.0);
                {
                    let b = self.rt.get_mut(id);
                    b.borders = borders;
                    b.padding = padding;
                    b.margins.left = round_half_even(margin_left);
                    b.margins.right = round_half_even(margin_right);
                }
                state.x += margin_left + borders.left as f32 + padding.left as f32;
                let children = self.rt.get(id).children.clone();
                for child in children {
                    self.place_inline(child, state);
                }
                state.x += margin_right + borders.right as f32 + padding.right as f32;
            }
            BoxKind::Block
            | BoxKind::AnonymousBlock
            | BoxKind::Table
            | BoxKind::Flex
            | BoxKind::TableCaption
            | BoxKind::TableRowGroup
            | BoxKind::TableRow
            | BoxKind::TableCell => {
                // [§ 9.2.1.1] A block-level box inside inline content
                // breaks the inline context around it.
                self.finish_line(state, false);
                let cb = ContainingBlock {
                    x: state.cb.x,
                    y: state.line_top,
                    width: state.cb.width,
                    height: None,
                };
                let height = self.layout_block_level(id, &cb, state.line_top);
                state.line_top += height;
                self.refresh_band(state);
                state.x = state.band_left;
            }
            BoxKind::InlineBlock => self.place_atomic(id, state),
        }
    }

    /// Place an atomic inline: lay it out, then treat its margin box as
    /// one opaque fragment.
    fn place_atomic(&mut self, id: BoxId, state: &mut LineState) {
        let style = self.rt.get(id).style.clone();
        let cb = state.cb;

        // Shrink-to-fit unless a width is specified.
        let (borders, padding) = self.resolve_border_padding(id, cb.width);
        let h_extras = (borders.horizontal() + padding.horizontal()) as f32;
        let available = (state.band_right - state.band_left - h_extras).max(0.0);
        let content_width = match self.cvt_auto(id, &style.width.clone(), Some(cb.width)) {
            Some(width) => width.max(0.0),
            None if self.rt.get(id).replaced.is_some() => self.replaced_width(id, &cb),
            None => self.shrink_to_fit(id, available),
        };
        let content_width = self.clamp_width(id, content_width, &cb);

        let margin_left = self
            .cvt_auto(id, &style.margin.left.clone(), Some(cb.width))
            .unwrap_or(0.0);
        let margin_right = self
            .cvt_auto(id, &style.margin.right.clone(), Some(cb.width))
            .unwrap_or(0.0);

        // Lay out at a provisional origin; the fragment commit moves it.
        let saved_width = std::mem::replace(
            &mut self.rt.get_mut(id).style.width,
            marten_css::Length::px(content_width),
        );
        let saved_sizing = std::mem::replace(
            &mut self.rt.get_mut(id).style.box_sizing,
            marten_css::style::BoxSizing::ContentBox,
        );
        let provisional = ContainingBlock {
            x: state.x,
            y: state.line_top,
            width: content_width + h_extras + margin_left + margin_right,
            height: None,
        };
        let border_height = self.layout_block_level(id, &provisional, state.line_top);
        {
            let b = self.rt.get_mut(id);
            b.style.width = saved_width;
            b.style.box_sizing = saved_sizing;
        }

        let (margin_top, margin_bottom) = self.vertical_margins(id, cb.width);
        let outer_width = content_width + h_extras + margin_left + margin_right;
        let outer_height = border_height + margin_top + margin_bottom;

        // Baseline: the last line box's baseline, else the bottom
        // margin edge (CSS2 § 10.8.1 for inline-block).
        // [§ 10.8.1] The baseline of an inline-block is the baseline
        // of its last line box; a replaced element or an empty
        // inline-block sits on its bottom margin edge.
        let inner = self.rt.get(id);
        let baseline = if inner.replaced.is_some() || inner.lines.is_empty() {
            outer_height
        } else {
            margin_top
                + (inner.borders.top + inner.padding.top + inner.last_baseline) as f32
        };

        // Wrap if it doesn't fit and the line already has content.
        if state.x + outer_width > state.band_right && state.line_has_content() {
            self.finish_line(state, false);
        }

        state.pending.push(Pending {
            source: id,
            x: state.x,
            width: outer_width,
            ascent: baseline,
            descent: outer_height - baseline,
            valign: style.vertical_align,
            kind: PendingKind::Atomic {
                outer_width,
                outer_height,
                baseline,
            },
        });
        state.x += outer_width;
    }

    /// Place a text run, breaking at whitespace.
    fn place_text(&mut self, id: BoxId, text: &str, state: &mut LineState) {
        let b = self.rt.get(id);
        let style = b.style.clone();
        let font = b.font;
        let metrics = b.font_metrics;
        let color = style.color;
        let decoration = style.text_decoration;

        let line_height = line_height_px(&style, &metrics) as f32;
        let leading = line_height - (metrics.ascent + metrics.descent) as f32;
        let ascent = metrics.ascent as f32 + leading / 2.0;
        let descent = metrics.descent as f32 + leading / 2.0;
        let font_ascent = metrics.ascent as f32;
        let font_descent = metrics.descent as f32;

        let space_width = self.container.text_width(" ", font) as f32
            + self.cvt(id, &style.word_spacing.clone(), None);
        let letter_spacing = self.cvt(id, &style.letter_spacing.clone(), None);
        let wraps = style.white_space.wraps();
        let preserves = !style.white_space.collapses();

        // Preserved-newline text lays out segment by segment.
        let segments: Vec<&str> = if preserves {
            text.split('\n').collect()
        } else {
            vec![text]
        };

        let run = PendingText {
            font,
            metrics,
            color,
            decoration,
            ascent,
            descent,
            font_ascent,
            font_descent,
            valign: style.vertical_align,
        };

        for (segment_index, segment) in segments.iter().enumerate() {
            if segment_index > 0 {
                self.finish_line(state, true);
            }
            let mut chunks = segment.split(' ').peekable();
            let mut need_space = false;
            while let Some(word) = chunks.next() {
                if word.is_empty() {
                    // A collapsed space at a boundary.
                    need_space = state.line_has_content();
                    continue;
                }
                let mut width = self.container.text_width(word, font) as f32;
                if letter_spacing != 0.0 {
                    width += letter_spacing * word.chars().count() as f32;
                }
                let space = if need_space { space_width } else { 0.0 };

                // [§ 9.4.2] "once the current line would exceed its
                // available width... a new line begins."
                if wraps
                    && state.x + space + width > state.band_right
                    && state.line_has_content()
                {
                    // A break eats the pending space.
                    self.finish_line(state, false);
                    self.push_word(id, word, width, state, &run);
                } else {
                    if space > 0.0 {
                        self.push_word(id, " ", space, state, &run);
                    }
                    self.push_word(id, word, width, state, &run);
                }
                need_space = chunks.peek().is_some();
            }
            // Trailing whitespace survives only for fonts that ask for
            // drawn spaces; line finishing trims it otherwise.
            if need_space && state.line_has_content() && metrics.draw_spaces {
                self.push_word(id, " ", space_width, state, &run);
            }
        }
    }

    /// Append a word to the current line, merging into the previous
    /// fragment when it continues the same run.
    fn push_word(
        &mut self,
        source: BoxId,
        word: &str,
        width: f32,
        state: &mut LineState,
        text: &PendingText,
    ) {
        if let Some(last) = state.pending.last_mut() {
            if last.source == source {
                if let PendingKind::Text {
                    text: run_text, ..
                } = &mut last.kind
                {
                    if (last.x + last.width - state.x).abs() < 0.01 {
                        run_text.push_str(word);
                        last.width += width;
                        state.x += width;
                        return;
                    }
                }
            }
        }
        state.pending.push(Pending {
            source,
            x: state.x,
            width,
            ascent: text.ascent,
            descent: text.descent,
            valign: text.valign,
            kind: PendingKind::Text {
                text: word.to_string(),
                font: text.font,
                metrics: text.metrics,
                color: text.color,
                decoration: text.decoration,
                font_ascent: text.font_ascent,
                font_descent: text.font_descent,
            },
        });
        state.x += width;
    }

    /// Close the current line: fix its height and baseline, vertically
    /// align the fragments, apply `text-align`, and open the next line.
    ///
    /// `force` emits an (empty) line even without content — `<br>`.
    fn finish_line(&mut self, state: &mut LineState, force: bool) {
        if !state.line_has_content() {
            if force {
                // An empty forced line still advances by the strut.
                let height = round_half_even(state.strut_ascent + state.strut_descent);
                state.lines.push(LineBox {
                    top: round_half_even(state.line_top),
                    height,
                    baseline: round_half_even(state.strut_ascent),
                    left: round_half_even(state.band_left),
                    width: round_half_even(state.band_right - state.band_left),
                    fragments: Vec::new(),
                });
                state.line_top += height as f32;
                state.is_first_line = false;
                self.refresh_band(state);
                state.x = state.band_left;
            }
            state.pending.clear();
            return;
        }

        // Drop a trailing collapsed space fragment.
        if let Some(last) = state.pending.last() {
            if let PendingKind::Text { text, .. } = &last.kind {
                if text == " " {
                    let width = last.width;
                    let _ = state.pending.pop();
                    state.x -= width;
                }
            }
        }

        // STEP 1: line metrics. [§ 10.8] "The line box's height is the
        // maximum over its fragments of ascent + descent + leading",
        // with the strut participating.
        // Half the x-height, approximated from the strut, anchors
        // `vertical-align: middle`.
        let x_half = state.strut_ascent * 0.25;
        let mut above = state.strut_ascent;
        let mut below = state.strut_descent;
        for pending in &state.pending {
            match pending.valign {
                VerticalAlign::Baseline => {
                    above = above.max(pending.ascent);
                    below = below.max(pending.descent);
                }
                VerticalAlign::Sub => {
                    let shift = sub_shift(pending);
                    above = above.max(pending.ascent - shift);
                    below = below.max(pending.descent + shift);
                }
                VerticalAlign::Super => {
                    let shift = super_shift(pending);
                    above = above.max(pending.ascent + shift);
                    below = below.max(pending.descent - shift);
                }
                VerticalAlign::Length(px) => {
                    above = above.max(pending.ascent + px);
                    below = below.max(pending.descent - px);
                }
                VerticalAlign::Middle => {
                    let shift = middle_shift(pending.ascent, pending.descent, x_half);
                    above = above.max(pending.ascent + shift);
                    below = below.max(pending.descent - shift);
                }
                // top/bottom-aligned fragments size the line but hang
                // from its edges.
                VerticalAlign::Top
                | VerticalAlign::Bottom
                | VerticalAlign::TextTop
                | VerticalAlign::TextBottom => {
                    let total = pending.ascent + pending.descent;
                    if total > above + below {
                        below = total - above;
                    }
                }
            }
        }
        let line_height = above + below;
        let baseline_y = state.line_top + above;

        // STEP 2: horizontal alignment over the remaining free space.
        let free = (state.band_right - state.x).max(0.0);
        let shift = match state.text_align {
            TextAlign::Right => free,
            TextAlign::Center => free / 2.0,
            TextAlign::Left | TextAlign::Justify => 0.0,
        };

        // STEP 3: commit fragments.
        let mut fragments = Vec::with_capacity(state.pending.len());
        let mut atomics: Vec<(BoxId, i32, i32)> = Vec::new();
        for pending in state.pending.drain(..) {
            let x = pending.x + shift;
            let baseline_shift = match pending.valign {
                VerticalAlign::Baseline => 0.0,
                VerticalAlign::Sub => -sub_shift_raw(pending.ascent, pending.descent),
                VerticalAlign::Super => super_shift_raw(pending.ascent, pending.descent),
                VerticalAlign::Length(px) => px,
                VerticalAlign::Middle => middle_shift(pending.ascent, pending.descent, x_half),
                VerticalAlign::Top | VerticalAlign::TextTop => {
                    // Hang from the line top.
                    above - pending.ascent
                }
                VerticalAlign::Bottom | VerticalAlign::TextBottom => {
                    -(below - pending.descent)
                }
            };
            let fragment_baseline = baseline_y - baseline_shift;
            match pending.kind {
                PendingKind::Text {
                    text,
                    font,
                    metrics,
                    color,
                    decoration,
                    font_ascent,
                    font_descent,
                } => {
                    let rect = Rect {
                        x: round_half_even(x),
                        y: round_half_even(fragment_baseline - font_ascent),
                        width: round_half_even(pending.width),
                        height: round_half_even(font_ascent + font_descent),
                    };
                    fragments.push(LineFragment {
                        rect,
                        content: FragmentContent::Text {
                            text,
                            font,
                            metrics,
                            color,
                            decoration,
                        },
                        source: pending.source,
                    });
                }
                PendingKind::Atomic {
                    outer_width,
                    outer_height,
                    baseline,
                } => {
                    let top = fragment_baseline - baseline;
                    let rect = Rect {
                        x: round_half_even(x),
                        y: round_half_even(top),
                        width: round_half_even(outer_width),
                        height: round_half_even(outer_height),
                    };
                    atomics.push((pending.source, rect.x, rect.y));
                    fragments.push(LineFragment {
                        rect,
                        content: FragmentContent::AtomicBox,
                        source: pending.source,
                    });
                }
            }
        }

        // Move atomic boxes to their final line positions.
        for (id, x, y) in atomics {
            let current = self.rt.get(id).margin_box();
            self.translate_subtree(id, x - current.x, y - current.y);
        }

        state.lines.push(LineBox {
            top: round_half_even(state.line_top),
            height: round_half_even(line_height),
            baseline: round_half_even(above),
            left: round_half_even(state.band_left),
            width: round_half_even(state.band_right - state.band_left),
            fragments,
        });

        // STEP 4: open the next line below, re-querying the floats.
        state.line_top += line_height;
        state.is_first_line = false;
        self.refresh_band(state);
        state.x = state.band_left;
    }

    /// Give every non-atomic inline wrapper its bounding rectangle: the
    /// union of the fragments its descendants produced (used for
    /// backgrounds and hit testing).
    fn assign_inline_box_bounds(&mut self, host: BoxId, lines: &[LineBox]) {
        let mut stack: Vec<BoxId> = self.rt.get(host).children.clone();
        let mut inline_boxes = Vec::new();
        while let Some(id) = stack.pop() {
            if matches!(self.rt.get(id).kind, BoxKind::Inline) {
                inline_boxes.push(id);
                stack.extend(self.rt.get(id).children.iter().copied());
            }
        }
        for inline_id in inline_boxes {
            let mut bounds: Option<Rect> = None;
            for line in lines {
                for fragment in &line.fragments {
                    let mut ancestor = Some(fragment.source);
                    while let Some(current) = ancestor {
                        if current == inline_id {
                            bounds = Some(match bounds {
                                Some(b) => b.union(&fragment.rect),
                                None => fragment.rect,
                            });
                            break;
                        }
                        if current == host {
                            break;
                        }
                        ancestor = self.rt.get(current).parent;
                    }
                }
            }
            if let Some(bounds) = bounds {
                self.rt.get_mut(inline_id).pos = bounds;
            }
        }
    }
}

/// Shared text-style parameters for queueing words.
struct PendingText {
    font: FontHandle,
    metrics: FontMetrics,
    color: WebColor,
    decoration: marten_css::style::TextDecorationLine,
    ascent: f32,
    descent: f32,
    font_ascent: f32,
    font_descent: f32,
    valign: VerticalAlign,
}

fn sub_shift(pending: &Pending) -> f32 {
    sub_shift_raw(pending.ascent, pending.descent)
}

fn sub_shift_raw(ascent: f32, descent: f32) -> f32 {
    (ascent + descent) * 0.2
}

fn super_shift(pending: &Pending) -> f32 {
    super_shift_raw(pending.ascent, pending.descent)
}

fn super_shift_raw(ascent: f32, descent: f32) -> f32 {
    (ascent + descent) * 0.3
}

/// [§ 10.8.1] "middle: align the vertical midpoint of the box with the
/// baseline of the parent box plus half the x-height of the parent."
fn middle_shift(ascent: f32, descent: f32, x_half: f32) -> f32 {
    (descent - ascent) / 2.0 + x_half
}
