//! The paint walk: from the laid-out render tree to container draw
//! calls.
//!
//! [CSS2 Appendix E — Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! Paint order per box: clip push (when the box clips), background
//! layers bottom-to-top, borders, text fragments and list markers of
//! the box's inline formatting context, in-flow children, attached
//! floats, absolutely positioned descendants in z-order, clip pop.
//! `set_clip`/`del_clip` calls are strictly balanced and LIFO over the
//! whole walk.

use marten_common::numerals;
use marten_css::style::{Display, ListStyleType, Visibility};

use crate::container::{
    BackgroundLayer, BorderPaint, BorderSide, DocumentContainer, DrawHandle, LayerRepeat,
    ListMarker,
};
use crate::geometry::{BorderRadii, Rect};
use crate::render_tree::{BoxId, BoxKind, FragmentContent, RenderBox, RenderTree};

/// Paint the document into `hdc`, offset by `(dx, dy)`, limited to
/// `clip` (document coordinates).
pub fn paint_document(
    rt: &RenderTree,
    container: &mut dyn DocumentContainer,
    hdc: DrawHandle,
    dx: i32,
    dy: i32,
    clip: &Rect,
) {
    let Some(root) = rt.root else { return };
    let mut painter = Painter {
        rt,
        container,
        hdc,
        dx,
        dy,
        clip: *clip,
    };
    painter.paint_box(root, true);
}

struct Painter<'a> {
    rt: &'a RenderTree,
    container: &'a mut dyn DocumentContainer,
    hdc: DrawHandle,
    dx: i32,
    dy: i32,
    clip: Rect,
}

impl Painter<'_> {
    fn translated(&self, rect: Rect) -> Rect {
        rect.translated(self.dx, self.dy)
    }

    fn radii_of(&mut self, b: &RenderBox) -> BorderRadii {
        let border_box = b.border_box();
        let radius = |length: &marten_css::Length| -> i32 {
            length.calc_percent(border_box.width as f32).round() as i32
        };
        BorderRadii {
            top_left: radius(&b.style.border_radius[0]),
            top_right: radius(&b.style.border_radius[1]),
            bottom_right: radius(&b.style.border_radius[2]),
            bottom_left: radius(&b.style.border_radius[3]),
        }
    }

    fn paint_box(&mut self, id: BoxId, is_root: bool) {
        let b = self.rt.get(id);

        // Out-of-clip subtrees with clipping still pop/push nothing;
        // unclipped subtrees may reach into the clip even when the box
        // itself is outside, so only fully clipped boxes are skipped.
        let border_box = self.translated(b.border_box());
        let clips = b.style.overflow.clips();
        if clips && !border_box.intersects(&self.clip) {
            return;
        }

        let visible = b.style.visibility == Visibility::Visible;

        // STEP 1 + 2: background layers, bottom to top.
        if visible {
            self.paint_background(b, is_root);
            // STEP 3: borders.
            self.paint_borders(b, is_root);
        }

        // STEP 4 onward happens inside the clip, when one applies.
        let clipped = if clips {
            let padding_box = Rect {
                x: border_box.x + b.borders.left,
                y: border_box.y + b.borders.top,
                width: border_box.width - b.borders.horizontal(),
                height: border_box.height - b.borders.vertical(),
            };
            let radii = self.radii_of(b);
            self.container.set_clip(&padding_box, &radii);
            true
        } else {
            false
        };

        // STEP 4: text fragments and the list marker of this box's IFC.
        if visible {
            if b.style.display == Display::ListItem {
                self.paint_list_marker(id, b);
            }
            self.paint_lines(b);
        }

        // STEP 5: in-flow children in document order. Floats and
        // absolutes are pulled out of this pass.
        for &child in &b.children {
            let child_box = self.rt.get(child);
            if child_box.style.float != marten_css::style::FloatMode::None {
                continue;
            }
            if matches!(
                child_box.style.position,
                marten_css::style::Position::Absolute | marten_css::style::Position::Fixed
            ) {
                continue;
            }
            // Text runs paint through their host's line fragments.
            if matches!(child_box.kind, BoxKind::Text(_)) {
                continue;
            }
            self.paint_box(child, false);
        }

        // STEP 6: floats attached to this box.
        for &float_id in b.floats_left.iter().chain(b.floats_right.iter()) {
            self.paint_box(float_id, false);
        }

        // STEP 7: positioned descendants, by z-index then tree order.
        let mut absolutes = b.absolutes.clone();
        absolutes.sort_by_key(|&abs| (self.rt.get(abs).style.z_index.unwrap_or(0), abs));
        for abs in absolutes {
            self.paint_box(abs, false);
        }

        // STEP 8: pop the clip.
        if clipped {
            self.container.del_clip();
        }
    }

    /// Background color, then each image layer bottom-to-top (the first
    /// declared image is the topmost layer).
    fn paint_background(&mut self, b: &RenderBox, is_root: bool) {
        let border_box = self.translated(b.border_box());
        if border_box.width <= 0 || border_box.height <= 0 {
            return;
        }
        let radii = self.radii_of(b);
        let layer = BackgroundLayer {
            border_box,
            clip_box: border_box,
            origin_box: self.translated(Rect {
                x: b.pos.x - b.padding.left,
                y: b.pos.y - b.padding.top,
                width: b.pos.width + b.padding.horizontal(),
                height: b.pos.height + b.padding.vertical(),
            }),
            radii,
            repeat: match b.style.background_repeat {
                marten_css::style::BackgroundRepeat::Repeat => LayerRepeat::Repeat,
                marten_css::style::BackgroundRepeat::RepeatX => LayerRepeat::RepeatX,
                marten_css::style::BackgroundRepeat::RepeatY => LayerRepeat::RepeatY,
                marten_css::style::BackgroundRepeat::NoRepeat => LayerRepeat::NoRepeat,
            },
            is_root,
        };

        if !b.style.background_color.is_transparent() {
            self.container
                .draw_solid_fill(self.hdc, &layer, b.style.background_color);
        }
        for url in b.style.background_image.iter().rev() {
            self.container.draw_image(self.hdc, &layer, url, "");
        }
    }

    fn paint_borders(&mut self, b: &RenderBox, is_root: bool) {
        if b.borders.top == 0 && b.borders.right == 0 && b.borders.bottom == 0 && b.borders.left == 0
        {
            return;
        }
        let current_color = b.style.color;
        let side = |width: i32, border: &marten_css::style::computed::Border| BorderSide {
            width,
            style: border.style,
            color: border.color.unwrap_or(current_color),
        };
        let borders = BorderPaint {
            top: side(b.borders.top, &b.style.border_top),
            right: side(b.borders.right, &b.style.border_right),
            bottom: side(b.borders.bottom, &b.style.border_bottom),
            left: side(b.borders.left, &b.style.border_left),
            radii: self.radii_of(b),
        };
        let border_box = self.translated(b.border_box());
        self.container
            .draw_borders(self.hdc, &borders, &border_box, is_root);
    }

    /// Replaced content paints as its own "layer" covering the content
    /// box.
    fn paint_replaced(&mut self, b: &RenderBox) {
        let Some(crate::render_tree::ReplacedContent::Image { src }) = &b.replaced else {
            return;
        };
        let content_box = self.translated(b.pos);
        let layer = BackgroundLayer {
            border_box: content_box,
            clip_box: content_box,
            origin_box: content_box,
            radii: BorderRadii::default(),
            repeat: LayerRepeat::NoRepeat,
            is_root: false,
        };
        self.container.draw_image(self.hdc, &layer, src, "");
    }

    /// Text fragments on this box's line boxes; atomic fragments paint
    /// as child boxes.
    fn paint_lines(&mut self, b: &RenderBox) {
        if b.replaced.is_some() {
            self.paint_replaced(b);
            return;
        }
        for line in &b.lines {
            for fragment in &line.fragments {
                match &fragment.content {
                    FragmentContent::Text {
                        text,
                        font,
                        color,
                        ..
                    } => {
                        let rect = self.translated(fragment.rect);
                        if rect.intersects(&self.clip) {
                            self.container.draw_text(self.hdc, text, *font, *color, &rect);
                        }
                    }
                    // The atomic's own box paints in the child pass.
                    FragmentContent::AtomicBox => {}
                }
            }
        }
    }

    /// [CSS2 § 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
    ///
    /// Glyph markers (disc/circle/square/image) go through the
    /// container's `draw_list_marker`; numbering systems render as text
    /// via `draw_text`.
    fn paint_list_marker(&mut self, id: BoxId, b: &RenderBox) {
        let marker_type = b.style.list_style_type;
        if marker_type == ListStyleType::None && b.style.list_style_image.is_none() {
            return;
        }

        let font_size = b.style.font_size;
        let ascent = b.font_metrics.ascent;

        match marker_type {
            ListStyleType::Disc | ListStyleType::Circle | ListStyleType::Square => {
                // Marker square sits in the start margin, vertically
                // centered on the first line's text.
                let size = (font_size * 0.35).round() as i32;
                let x = b.pos.x - size * 3;
                let y = b.pos.y + (ascent - size) / 2 + 1;
                let marker = ListMarker {
                    marker_type,
                    color: b.style.color,
                    pos: self.translated(Rect::new(x, y, size, size)),
                    image: b.style.list_style_image.clone(),
                    base_url: String::new(),
                };
                self.container.draw_list_marker(self.hdc, &marker);
            }
            ListStyleType::None => {
                if b.style.list_style_image.is_some() {
                    let size = font_size.round() as i32;
                    let marker = ListMarker {
                        marker_type,
                        color: b.style.color,
                        pos: self.translated(Rect::new(b.pos.x - size * 2, b.pos.y, size, size)),
                        image: b.style.list_style_image.clone(),
                        base_url: String::new(),
                    };
                    self.container.draw_list_marker(self.hdc, &marker);
                }
            }
            _ => {
                let ordinal = self.list_item_ordinal(id);
                let text = match marker_type {
                    ListStyleType::Decimal => numerals::to_decimal(ordinal),
                    ListStyleType::LowerAlpha => numerals::to_latin_lower(ordinal),
                    ListStyleType::UpperAlpha => numerals::to_latin_upper(ordinal),
                    ListStyleType::LowerRoman => numerals::to_roman_lower(ordinal),
                    ListStyleType::UpperRoman => numerals::to_roman_upper(ordinal),
                    ListStyleType::LowerGreek => numerals::to_greek_lower(ordinal),
                    _ => return,
                };
                let text = format!("{text}.");
                let width = self.container.text_width(&text, b.font);
                let height = b.font_metrics.ascent + b.font_metrics.descent;
                let rect = Rect::new(b.pos.x - width - 6, b.pos.y, width, height);
                self.container.draw_text(
                    self.hdc,
                    &text,
                    b.font,
                    b.style.color,
                    &self.translated(rect),
                );
            }
        }
    }

    /// 1-based position of a list item among its rendered list-item
    /// siblings.
    fn list_item_ordinal(&self, id: BoxId) -> i32 {
        let Some(parent) = self.rt.get(id).parent else {
            return 1;
        };
        let mut ordinal = 0;
        for &sibling in &self.rt.get(parent).children {
            if self.rt.get(sibling).style.display == Display::ListItem {
                ordinal += 1;
            }
            if sibling == id {
                break;
            }
        }
        ordinal.max(1)
    }
}
