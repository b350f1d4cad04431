//! The computed style of an element.
//!
//! [CSS Cascading § 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! "The computed value is the result of resolving the specified value as
//! defined in the 'Computed Value' line of the property definition
//! table." Font sizes resolve to pixels here (they feed every
//! font-relative unit downstream); most other lengths stay in their
//! declared unit and resolve during layout, where the referent (parent
//! font, containing block, viewport) is known.
//!
//! The cascade applies winning declarations into this struct in
//! precedence order; [`ComputedStyle::finish`] then settles the
//! order-independent resolutions.

use serde::Serialize;

use crate::parser::{ComponentValue, Declaration};
use crate::properties::PropertyId;
use crate::tokenizer::CssToken;
use crate::values::{Length, LengthUnit, WebColor};

use super::{
    BackgroundRepeat, BorderCollapse, BorderStyle, BoxSizing, CaptionSide, Clear, Display,
    FlexDirection, FlexWrap, FloatMode, FontStyle, JustifyContent, LineHeight, ListStylePosition,
    ListStyleType, Overflow, Position, TableLayoutMode, TextAlign, TextDecorationLine,
    TextTransform, VerticalAlign, Visibility, WhiteSpace,
};
use super::AlignItems;

/// Environment facts style resolution needs from the embedding layer:
/// default font, point conversion, system colors, viewport. The engine
/// implements this over its `DocumentContainer`; tests use
/// [`DefaultEnv`].
pub trait CascadeEnv {
    /// The initial `font-size` in pixels.
    fn default_font_size(&self) -> f32 {
        16.0
    }

    /// The initial `font-family`.
    fn default_font_family(&self) -> String {
        "serif".to_string()
    }

    /// Convert typographic points to device pixels.
    fn pt_to_px(&self, pt: f32) -> f32 {
        pt * 96.0 / 72.0
    }

    /// Resolve a system color name to `#rrggbb`.
    fn resolve_color(&self, _name: &str) -> Option<String> {
        None
    }

    /// Viewport size in px, for viewport-relative font sizes.
    fn viewport_size(&self) -> (f32, f32) {
        (1280.0, 720.0)
    }
}

/// A [`CascadeEnv`] with CSS-initial answers; used by tests and as the
/// fallback before a container is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnv;

impl CascadeEnv for DefaultEnv {}

/// Per-side lengths (margins, padding, offsets).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EdgeLengths {
    /// Top edge value.
    pub top: Length,
    /// Right edge value.
    pub right: Length,
    /// Bottom edge value.
    pub bottom: Length,
    /// Left edge value.
    pub left: Length,
}

/// [`EdgeLengths`] with every side zero (initial `margin`/`padding`).
fn zero_edges() -> EdgeLengths {
    EdgeLengths::default()
}

/// [`EdgeLengths`] with every side `auto` (initial `top`/`right`/`bottom`/`left`).
fn auto_edges() -> EdgeLengths {
    EdgeLengths {
        top: Length::Predef(PREDEF_AUTO),
        right: Length::Predef(PREDEF_AUTO),
        bottom: Length::Predef(PREDEF_AUTO),
        left: Length::Predef(PREDEF_AUTO),
    }
}

/// One border side: width, line style, color.
///
/// A missing color means *currentColor* — the painter substitutes the
/// element's text color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Border {
    /// Declared width ("medium" initial = 3px).
    pub width: Length,
    /// The line style; `none` suppresses the side entirely.
    pub style: BorderStyle,
    /// Declared color, or `None` for currentColor.
    pub color: Option<WebColor>,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: Length::px(MEDIUM_BORDER_WIDTH),
            style: BorderStyle::None,
            color: None,
        }
    }
}

/// "medium" border width in px.
const MEDIUM_BORDER_WIDTH: f32 = 3.0;

/// The computed value of every supported property for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedStyle {
    /// `display`
    pub display: Display,
    /// `position`
    pub position: Position,
    /// `float`
    pub float: FloatMode,
    /// `clear`
    pub clear: Clear,
    /// `overflow`
    pub overflow: Overflow,
    /// `visibility`
    pub visibility: Visibility,
    /// `box-sizing`
    pub box_sizing: BoxSizing,
    /// `z-index` (`None` = auto).
    pub z_index: Option<i32>,
    /// `top`/`right`/`bottom`/`left` offsets; predef 0 = auto.
    pub offsets: EdgeLengths,

    /// `width`; predef 0 = auto.
    pub width: Length,
    /// `height`; predef 0 = auto.
    pub height: Length,
    /// `min-width`.
    pub min_width: Length,
    /// `min-height`.
    pub min_height: Length,
    /// `max-width`; predef 0 = none.
    pub max_width: Length,
    /// `max-height`; predef 0 = none.
    pub max_height: Length,
    /// Margins; predef 0 = auto.
    pub margin: EdgeLengths,
    /// Padding (never auto, never negative).
    pub padding: EdgeLengths,

    /// `border-top-*`
    pub border_top: Border,
    /// `border-right-*`
    pub border_right: Border,
    /// `border-bottom-*`
    pub border_bottom: Border,
    /// `border-left-*`
    pub border_left: Border,
    /// Corner radii: top-left, top-right, bottom-right, bottom-left.
    pub border_radius: [Length; 4],

    /// `color`
    pub color: WebColor,
    /// `background-color`
    pub background_color: WebColor,
    /// `background-image` URLs, outermost first; empty = none.
    pub background_image: Vec<String>,
    /// `background-repeat`
    pub background_repeat: BackgroundRepeat,
    /// `background-position` (x, y).
    pub background_position: (Length, Length),
    /// `background-size`, if declared.
    pub background_size: Option<(Length, Length)>,

    /// `font-family` as the declared comma-separated list.
    pub font_family: String,
    /// Computed `font-size` in pixels.
    pub font_size: f32,
    /// The specified `font-size`, consumed by [`Self::finish`].
    pub specified_font_size: Length,
    /// `font-weight` 100–900.
    pub font_weight: u16,
    /// `font-style`
    pub font_style: FontStyle,
    /// `line-height`
    pub line_height: LineHeight,

    /// `text-align`
    pub text_align: TextAlign,
    /// `text-decoration`
    pub text_decoration: TextDecorationLine,
    /// `text-indent`
    pub text_indent: Length,
    /// `text-transform`
    pub text_transform: TextTransform,
    /// `vertical-align` (length forms resolved by [`Self::finish`]).
    pub vertical_align: VerticalAlign,
    /// A declared `vertical-align` length, consumed by [`Self::finish`].
    pub specified_vertical_align: Option<Length>,
    /// `white-space`
    pub white_space: WhiteSpace,
    /// `letter-spacing`
    pub letter_spacing: Length,
    /// `word-spacing`
    pub word_spacing: Length,

    /// `list-style-type`
    pub list_style_type: ListStyleType,
    /// `list-style-position`
    pub list_style_position: ListStylePosition,
    /// `list-style-image` URL.
    pub list_style_image: Option<String>,

    /// `border-collapse`
    pub border_collapse: BorderCollapse,
    /// `border-spacing` (horizontal, vertical).
    pub border_spacing: (Length, Length),
    /// `caption-side`
    pub caption_side: CaptionSide,
    /// `table-layout`
    pub table_layout: TableLayoutMode,

    /// `flex-direction`
    pub flex_direction: FlexDirection,
    /// `flex-wrap`
    pub flex_wrap: FlexWrap,
    /// `flex-grow`
    pub flex_grow: f32,
    /// `flex-shrink`
    pub flex_shrink: f32,
    /// `flex-basis`; predef 0 = auto.
    pub flex_basis: Length,
    /// `justify-content`
    pub justify_content: JustifyContent,
    /// `align-items`
    pub align_items: AlignItems,
    /// `align-self` (`Auto` defers to the container).
    pub align_self: AlignItems,
    /// `order`
    pub order: i32,

    /// `content`, for `::before`/`::after`.
    pub content: Option<String>,
    /// `cursor` name for the container's `set_cursor`.
    pub cursor: Option<String>,
}

/// Predef tag meaning `auto` where a length slot allows it.
pub const PREDEF_AUTO: i32 = 0;

impl ComputedStyle {
    /// The initial style for the root element.
    #[must_use]
    pub fn initial(env: &dyn CascadeEnv) -> Self {
        Self {
            display: Display::Inline,
            position: Position::Static,
            float: FloatMode::None,
            clear: Clear::None,
            overflow: Overflow::Visible,
            visibility: Visibility::Visible,
            box_sizing: BoxSizing::ContentBox,
            z_index: None,
            offsets: auto_edges(),
            width: Length::Predef(PREDEF_AUTO),
            height: Length::Predef(PREDEF_AUTO),
            min_width: Length::zero(),
            min_height: Length::zero(),
            max_width: Length::Predef(PREDEF_AUTO),
            max_height: Length::Predef(PREDEF_AUTO),
            margin: zero_edges(),
            padding: zero_edges(),
            border_top: Border::default(),
            border_right: Border::default(),
            border_bottom: Border::default(),
            border_left: Border::default(),
            border_radius: [Length::zero(), Length::zero(), Length::zero(), Length::zero()],
            color: WebColor::BLACK,
            background_color: WebColor::TRANSPARENT,
            background_image: Vec::new(),
            background_repeat: BackgroundRepeat::Repeat,
            background_position: (Length::percent(0.0), Length::percent(0.0)),
            background_size: None,
            font_family: env.default_font_family(),
            font_size: env.default_font_size(),
            specified_font_size: Length::px(env.default_font_size()),
            font_weight: 400,
            font_style: FontStyle::Normal,
            line_height: LineHeight::Normal,
            text_align: TextAlign::Left,
            text_decoration: TextDecorationLine::default(),
            text_indent: Length::zero(),
            text_transform: TextTransform::None,
            vertical_align: VerticalAlign::Baseline,
            specified_vertical_align: None,
            white_space: WhiteSpace::Normal,
            letter_spacing: Length::zero(),
            word_spacing: Length::zero(),
            list_style_type: ListStyleType::Disc,
            list_style_position: ListStylePosition::Outside,
            list_style_image: None,
            border_collapse: BorderCollapse::Separate,
            border_spacing: (Length::zero(), Length::zero()),
            caption_side: CaptionSide::Top,
            table_layout: TableLayoutMode::Auto,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Nowrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Length::Predef(PREDEF_AUTO),
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_self: AlignItems::Auto,
            order: 0,
            content: None,
            cursor: None,
        }
    }

    /// [§ 7.1 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// "For inherited properties missing a specified value, copy the
    /// parent's computed value; else use the property's initial value."
    #[must_use]
    pub fn inherit_from(parent: &Self, env: &dyn CascadeEnv) -> Self {
        Self {
            color: parent.color,
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            specified_font_size: Length::px(parent.font_size),
            font_weight: parent.font_weight,
            font_style: parent.font_style,
            line_height: parent.line_height.clone(),
            text_align: parent.text_align,
            text_decoration: parent.text_decoration,
            text_indent: parent.text_indent.clone(),
            text_transform: parent.text_transform,
            white_space: parent.white_space,
            letter_spacing: parent.letter_spacing.clone(),
            word_spacing: parent.word_spacing.clone(),
            list_style_type: parent.list_style_type,
            list_style_position: parent.list_style_position,
            list_style_image: parent.list_style_image.clone(),
            visibility: parent.visibility,
            cursor: parent.cursor.clone(),
            border_collapse: parent.border_collapse,
            border_spacing: parent.border_spacing.clone(),
            caption_side: parent.caption_side,
            ..Self::initial(env)
        }
    }

    /// Apply one winning declaration. Invalid values are ignored — the
    /// field keeps its inherited or initial value.
    pub fn apply_declaration(&mut self, declaration: &Declaration, env: &dyn CascadeEnv) {
        let value = &declaration.value;
        let first = first_value(value);
        match declaration.property {
            PropertyId::Display => {
                apply_keyword(first, &mut self.display, Display::from_name);
            }
            PropertyId::Position => {
                apply_keyword(first, &mut self.position, Position::from_name);
            }
            PropertyId::Float => apply_keyword(first, &mut self.float, FloatMode::from_name),
            PropertyId::Clear => apply_keyword(first, &mut self.clear, Clear::from_name),
            PropertyId::Overflow => apply_keyword(first, &mut self.overflow, Overflow::from_name),
            PropertyId::Visibility => {
                apply_keyword(first, &mut self.visibility, Visibility::from_name);
            }
            PropertyId::BoxSizing => {
                apply_keyword(first, &mut self.box_sizing, BoxSizing::from_name);
            }
            PropertyId::ZIndex => {
                if let Some(cv) = first {
                    if ident_of(cv).is_some_and(|k| k == "auto") {
                        self.z_index = None;
                    } else if let Some(n) = int_of(cv) {
                        self.z_index = Some(n);
                    }
                }
            }
            PropertyId::Top => apply_length(first, &mut self.offsets.top, "auto"),
            PropertyId::Right => apply_length(first, &mut self.offsets.right, "auto"),
            PropertyId::Bottom => apply_length(first, &mut self.offsets.bottom, "auto"),
            PropertyId::Left => apply_length(first, &mut self.offsets.left, "auto"),
            PropertyId::Width => apply_length(first, &mut self.width, "auto"),
            PropertyId::Height => apply_length(first, &mut self.height, "auto"),
            PropertyId::MinWidth => apply_length(first, &mut self.min_width, ""),
            PropertyId::MinHeight => apply_length(first, &mut self.min_height, ""),
            PropertyId::MaxWidth => apply_length(first, &mut self.max_width, "none"),
            PropertyId::MaxHeight => apply_length(first, &mut self.max_height, "none"),
            PropertyId::MarginTop => apply_length(first, &mut self.margin.top, "auto"),
            PropertyId::MarginRight => apply_length(first, &mut self.margin.right, "auto"),
            PropertyId::MarginBottom => apply_length(first, &mut self.margin.bottom, "auto"),
            PropertyId::MarginLeft => apply_length(first, &mut self.margin.left, "auto"),
            PropertyId::PaddingTop => apply_length(first, &mut self.padding.top, ""),
            PropertyId::PaddingRight => apply_length(first, &mut self.padding.right, ""),
            PropertyId::PaddingBottom => apply_length(first, &mut self.padding.bottom, ""),
            PropertyId::PaddingLeft => apply_length(first, &mut self.padding.left, ""),

            PropertyId::BorderTopWidth => apply_border_width(first, &mut self.border_top.width),
            PropertyId::BorderRightWidth => {
                apply_border_width(first, &mut self.border_right.width);
            }
            PropertyId::BorderBottomWidth => {
                apply_border_width(first, &mut self.border_bottom.width);
            }
            PropertyId::BorderLeftWidth => apply_border_width(first, &mut self.border_left.width),
            PropertyId::BorderTopStyle => {
                apply_keyword(first, &mut self.border_top.style, BorderStyle::from_name);
            }
            PropertyId::BorderRightStyle => {
                apply_keyword(first, &mut self.border_right.style, BorderStyle::from_name);
            }
            PropertyId::BorderBottomStyle => {
                apply_keyword(first, &mut self.border_bottom.style, BorderStyle::from_name);
            }
            PropertyId::BorderLeftStyle => {
                apply_keyword(first, &mut self.border_left.style, BorderStyle::from_name);
            }
            PropertyId::BorderTopColor => {
                self.border_top.color = parse_color(first, env).or(self.border_top.color);
            }
            PropertyId::BorderRightColor => {
                self.border_right.color = parse_color(first, env).or(self.border_right.color);
            }
            PropertyId::BorderBottomColor => {
                self.border_bottom.color = parse_color(first, env).or(self.border_bottom.color);
            }
            PropertyId::BorderLeftColor => {
                self.border_left.color = parse_color(first, env).or(self.border_left.color);
            }
            PropertyId::BorderTopLeftRadius => {
                apply_length(first, &mut self.border_radius[0], "");
            }
            PropertyId::BorderTopRightRadius => {
                apply_length(first, &mut self.border_radius[1], "");
            }
            PropertyId::BorderBottomRightRadius => {
                apply_length(first, &mut self.border_radius[2], "");
            }
            PropertyId::BorderBottomLeftRadius => {
                apply_length(first, &mut self.border_radius[3], "");
            }

            PropertyId::Color => {
                if let Some(color) = parse_color(first, env) {
                    self.color = color;
                }
            }
            PropertyId::BackgroundColor => {
                if let Some(color) = parse_color(first, env) {
                    self.background_color = color;
                }
            }
            PropertyId::BackgroundImage => self.apply_background_image(value),
            PropertyId::BackgroundRepeat => {
                apply_keyword(first, &mut self.background_repeat, BackgroundRepeat::from_name);
            }
            PropertyId::BackgroundPosition => self.apply_background_position(value),
            PropertyId::BackgroundSize => {
                let lengths: Vec<Length> = value
                    .iter()
                    .filter(|v| !v.is_whitespace())
                    .filter_map(|v| Length::from_component(v, "auto;cover;contain", 0))
                    .collect();
                if let Some(x) = lengths.first() {
                    let y = lengths.get(1).unwrap_or(x);
                    self.background_size = Some((x.clone(), y.clone()));
                }
            }
            // Attachment does not affect a scroll-free engine; accepted
            // and discarded.
            PropertyId::BackgroundAttachment => {}

            PropertyId::FontFamily => {
                if let Some(family) = parse_font_family(value) {
                    self.font_family = family;
                }
            }
            PropertyId::FontSize => {
                if let Some(length) = first.and_then(|v| {
                    Length::from_component(v, FONT_SIZE_KEYWORDS, -1)
                }) {
                    if !(length.is_predefined() && length.predef() < 0) {
                        self.specified_font_size = length;
                    }
                }
            }
            PropertyId::FontWeight => self.apply_font_weight(first),
            PropertyId::FontStyle => {
                apply_keyword(first, &mut self.font_style, FontStyle::from_name);
            }
            PropertyId::LineHeight => self.apply_line_height(first),
            PropertyId::TextAlign => {
                apply_keyword(first, &mut self.text_align, TextAlign::from_name);
            }
            PropertyId::TextDecoration => self.apply_text_decoration(value),
            PropertyId::TextIndent => apply_length(first, &mut self.text_indent, ""),
            PropertyId::TextTransform => {
                apply_keyword(first, &mut self.text_transform, TextTransform::from_name);
            }
            PropertyId::VerticalAlign => {
                if let Some(cv) = first {
                    if let Some(keyword) = ident_of(cv).and_then(|k| VerticalAlign::from_name(&k)) {
                        self.vertical_align = keyword;
                        self.specified_vertical_align = None;
                    } else if let Some(length) = Length::from_component(cv, "", -1) {
                        if !length.is_predefined() {
                            self.specified_vertical_align = Some(length);
                        }
                    }
                }
            }
            PropertyId::WhiteSpace => {
                apply_keyword(first, &mut self.white_space, WhiteSpace::from_name);
            }
            PropertyId::LetterSpacing => {
                if first.and_then(ident_of).is_some_and(|k| k == "normal") {
                    self.letter_spacing = Length::zero();
                } else {
                    apply_length(first, &mut self.letter_spacing, "");
                }
            }
            PropertyId::WordSpacing => {
                if first.and_then(ident_of).is_some_and(|k| k == "normal") {
                    self.word_spacing = Length::zero();
                } else {
                    apply_length(first, &mut self.word_spacing, "");
                }
            }

            PropertyId::ListStyleType => {
                apply_keyword(first, &mut self.list_style_type, ListStyleType::from_name);
            }
            PropertyId::ListStylePosition => {
                apply_keyword(first, &mut self.list_style_position, ListStylePosition::from_name);
            }
            PropertyId::ListStyleImage => {
                self.list_style_image = first.and_then(url_of);
            }

            PropertyId::BorderCollapse => {
                apply_keyword(first, &mut self.border_collapse, BorderCollapse::from_name);
            }
            PropertyId::BorderSpacing => {
                let lengths: Vec<Length> = value
                    .iter()
                    .filter(|v| !v.is_whitespace())
                    .filter_map(|v| Length::from_component(v, "", -1))
                    .collect();
                if let Some(x) = lengths.first() {
                    let y = lengths.get(1).unwrap_or(x);
                    self.border_spacing = (x.clone(), y.clone());
                }
            }
            PropertyId::CaptionSide => {
                apply_keyword(first, &mut self.caption_side, CaptionSide::from_name);
            }
            PropertyId::TableLayout => {
                apply_keyword(first, &mut self.table_layout, TableLayoutMode::from_name);
            }

            PropertyId::FlexDirection => {
                apply_keyword(first, &mut self.flex_direction, FlexDirection::from_name);
            }
            PropertyId::FlexWrap => {
                apply_keyword(first, &mut self.flex_wrap, FlexWrap::from_name);
            }
            PropertyId::FlexGrow => {
                if let Some(n) = first.and_then(number_of) {
                    if n >= 0.0 {
                        self.flex_grow = n;
                    }
                }
            }
            PropertyId::FlexShrink => {
                if let Some(n) = first.and_then(number_of) {
                    if n >= 0.0 {
                        self.flex_shrink = n;
                    }
                }
            }
            PropertyId::FlexBasis => apply_length(first, &mut self.flex_basis, "auto;content"),
            PropertyId::JustifyContent => {
                apply_keyword(first, &mut self.justify_content, JustifyContent::from_name);
            }
            PropertyId::AlignItems => {
                apply_keyword(first, &mut self.align_items, AlignItems::from_name);
            }
            PropertyId::AlignSelf => {
                apply_keyword(first, &mut self.align_self, AlignItems::from_name);
            }
            // Multi-line cross-axis packing; accepted and discarded by
            // this engine's single-line flex layout.
            PropertyId::AlignContent => {}
            PropertyId::Order => {
                if let Some(n) = first.and_then(int_of) {
                    self.order = n;
                }
            }

            PropertyId::Content => {
                self.content = first.and_then(|v| match v {
                    ComponentValue::Token(CssToken::String(s)) => Some(s.clone()),
                    ComponentValue::Token(CssToken::Ident(word))
                        if word.eq_ignore_ascii_case("none") =>
                    {
                        None
                    }
                    _ => None,
                });
            }
            PropertyId::Cursor => {
                self.cursor = first.and_then(ident_of);
            }
        }
    }

    /// `bolder`/`lighter` resolve against the inherited weight, which is
    /// already in `self` when the declaration applies.
    fn apply_font_weight(&mut self, first: Option<&ComponentValue>) {
        let Some(cv) = first else { return };
        if let Some(word) = ident_of(cv) {
            self.font_weight = match word.as_str() {
                "normal" => 400,
                "bold" => 700,
                "bolder" => (self.font_weight + 300).min(900),
                "lighter" => self.font_weight.saturating_sub(300).max(100),
                _ => return,
            };
        } else if let Some(n) = number_of(cv) {
            if (1.0..=1000.0).contains(&n) {
                self.font_weight = (n as u16).clamp(100, 900);
            }
        }
    }

    fn apply_line_height(&mut self, first: Option<&ComponentValue>) {
        let Some(cv) = first else { return };
        if ident_of(cv).is_some_and(|k| k == "normal") {
            self.line_height = LineHeight::Normal;
            return;
        }
        match cv {
            ComponentValue::Token(CssToken::Number { value, .. }) if *value >= 0.0 => {
                self.line_height = LineHeight::Number(*value);
            }
            _ => {
                if let Some(length) = Length::from_component(cv, "", -1) {
                    if !length.is_predefined() {
                        self.line_height = LineHeight::Length(length);
                    }
                }
            }
        }
    }

    fn apply_text_decoration(&mut self, value: &[ComponentValue]) {
        let mut decoration = TextDecorationLine::default();
        let mut recognized = false;
        for cv in value.iter().filter(|v| !v.is_whitespace()) {
            match ident_of(cv).as_deref() {
                Some("none") => {
                    recognized = true;
                }
                Some("underline") => {
                    decoration.underline = true;
                    recognized = true;
                }
                Some("overline") => {
                    decoration.overline = true;
                    recognized = true;
                }
                Some("line-through") => {
                    decoration.line_through = true;
                    recognized = true;
                }
                _ => {}
            }
        }
        if recognized {
            self.text_decoration = decoration;
        }
    }

    fn apply_background_image(&mut self, value: &[ComponentValue]) {
        let mut images = Vec::new();
        let mut none = false;
        for cv in value.iter().filter(|v| !v.is_whitespace()) {
            if let Some(url) = url_of(cv) {
                images.push(url);
            } else if ident_of(cv).is_some_and(|k| k == "none") {
                none = true;
            }
        }
        if !images.is_empty() || none {
            self.background_image = images;
        }
    }

    fn apply_background_position(&mut self, value: &[ComponentValue]) {
        let mut x = None;
        let mut y = None;
        for cv in value.iter().filter(|v| !v.is_whitespace()) {
            match ident_of(cv).as_deref() {
                Some("left") => x = Some(Length::percent(0.0)),
                Some("right") => x = Some(Length::percent(100.0)),
                Some("top") => y = Some(Length::percent(0.0)),
                Some("bottom") => y = Some(Length::percent(100.0)),
                Some("center") => {
                    if x.is_none() {
                        x = Some(Length::percent(50.0));
                    } else {
                        y = Some(Length::percent(50.0));
                    }
                }
                _ => {
                    if let Some(length) = Length::from_component(cv, "", -1) {
                        if !length.is_predefined() {
                            if x.is_none() {
                                x = Some(length);
                            } else if y.is_none() {
                                y = Some(length);
                            }
                        }
                    }
                }
            }
        }
        if x.is_some() || y.is_some() {
            self.background_position = (
                x.unwrap_or(Length::percent(50.0)),
                y.unwrap_or(Length::percent(50.0)),
            );
        }
    }

    /// Settle order-independent resolutions after every declaration has
    /// applied: the computed font size and length-valued vertical-align.
    pub fn finish(&mut self, parent: Option<&Self>, root_font_size: f32, env: &dyn CascadeEnv) {
        let parent_size = parent.map_or_else(|| env.default_font_size(), |p| p.font_size);
        self.font_size =
            resolve_font_size(&self.specified_font_size, parent_size, root_font_size, env);

        if let Some(length) = self.specified_vertical_align.take() {
            let px = match length.units() {
                LengthUnit::Em => length.val() * self.font_size,
                // "Percentages refer to the line-height of the element."
                LengthUnit::Percent => {
                    let line = match &self.line_height {
                        LineHeight::Number(n) => self.font_size * n,
                        LineHeight::Length(l) => l.calc_percent(self.font_size),
                        LineHeight::Normal => self.font_size * 1.2,
                    };
                    length.calc_percent(line)
                }
                LengthUnit::Pt => env.pt_to_px(length.val()),
                _ => length.val(),
            };
            self.vertical_align = VerticalAlign::Length(px);
        }
    }
}

/// `font-size` keyword list; indexes feed [`resolve_font_size`].
const FONT_SIZE_KEYWORDS: &str = "xx-small;x-small;small;medium;large;x-large;xx-large;smaller;larger";

/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// "Percentages refer to the parent element's font size." Keyword sizes
/// scale the user's default; `smaller`/`larger` scale the inherited
/// size.
#[must_use]
pub fn resolve_font_size(
    specified: &Length,
    parent_px: f32,
    root_px: f32,
    env: &dyn CascadeEnv,
) -> f32 {
    let (vw, vh) = env.viewport_size();
    match specified {
        Length::Predef(tag) => {
            let medium = env.default_font_size();
            match tag {
                0 => medium * 3.0 / 5.0,
                1 => medium * 3.0 / 4.0,
                2 => medium * 8.0 / 9.0,
                3 => medium,
                4 => medium * 6.0 / 5.0,
                5 => medium * 3.0 / 2.0,
                6 => medium * 2.0,
                7 => parent_px / 1.2,
                8 => parent_px * 1.2,
                _ => parent_px,
            }
        }
        Length::Value { value, unit } => match unit {
            LengthUnit::Px => *value,
            LengthUnit::None => {
                if *value == 0.0 {
                    0.0
                } else {
                    parent_px
                }
            }
            LengthUnit::Percent => parent_px * value / 100.0,
            LengthUnit::Em => parent_px * value,
            LengthUnit::Rem => root_px * value,
            // x-height and zero-advance approximations for the font the
            // container has not created yet.
            LengthUnit::Ex => parent_px * value * 0.5,
            LengthUnit::Ch => parent_px * value * 0.5,
            LengthUnit::Pt => env.pt_to_px(*value),
            LengthUnit::In => env.pt_to_px(*value * 72.0),
            LengthUnit::Cm => env.pt_to_px(*value * 72.0 / 2.54),
            LengthUnit::Mm => env.pt_to_px(*value * 72.0 / 25.4),
            LengthUnit::Vw => vw * value / 100.0,
            LengthUnit::Vh => vh * value / 100.0,
            LengthUnit::Vmin => vw.min(vh) * value / 100.0,
            LengthUnit::Vmax => vw.max(vh) * value / 100.0,
        },
        Length::Calc(expr) => expr.evaluate(&|leaf| {
            resolve_font_size(leaf, parent_px, root_px, env)
        }),
    }
}

// ===== Small parsing helpers =====

fn first_value(value: &[ComponentValue]) -> Option<&ComponentValue> {
    value.iter().find(|v| !v.is_whitespace())
}

fn ident_of(value: &ComponentValue) -> Option<String> {
    match value {
        ComponentValue::Token(CssToken::Ident(word)) => Some(word.to_ascii_lowercase()),
        _ => None,
    }
}

fn number_of(value: &ComponentValue) -> Option<f32> {
    match value {
        ComponentValue::Token(CssToken::Number { value, .. }) => Some(*value),
        _ => None,
    }
}

fn int_of(value: &ComponentValue) -> Option<i32> {
    number_of(value).map(|n| n as i32)
}

fn url_of(value: &ComponentValue) -> Option<String> {
    match value {
        ComponentValue::Token(CssToken::Url(url)) => Some(url.clone()),
        ComponentValue::Function { name, value } if name == "url" => {
            value.iter().find_map(|v| match v {
                ComponentValue::Token(CssToken::String(s)) => Some(s.clone()),
                _ => None,
            })
        }
        _ => None,
    }
}

fn apply_keyword<T>(
    first: Option<&ComponentValue>,
    slot: &mut T,
    parse: impl Fn(&str) -> Option<T>,
) {
    if let Some(parsed) = first.and_then(ident_of).and_then(|k| parse(&k)) {
        *slot = parsed;
    }
}

fn apply_length(first: Option<&ComponentValue>, slot: &mut Length, predefs: &str) {
    if let Some(length) = first.and_then(|v| Length::from_component(v, predefs, -1)) {
        if !(length.is_predefined() && length.predef() < 0) {
            *slot = length;
        }
    }
}

/// `thin`/`medium`/`thick` or a length.
fn apply_border_width(first: Option<&ComponentValue>, slot: &mut Length) {
    if let Some(word) = first.and_then(ident_of) {
        let px = match word.as_str() {
            "thin" => 1.0,
            "medium" => MEDIUM_BORDER_WIDTH,
            "thick" => 5.0,
            _ => return,
        };
        *slot = Length::px(px);
        return;
    }
    apply_length(first, slot, "");
}

fn parse_color(first: Option<&ComponentValue>, env: &dyn CascadeEnv) -> Option<WebColor> {
    let resolver = |name: &str| env.resolve_color(name);
    WebColor::from_component(first?, Some(&resolver))
}

/// Join the family list back into its comma-separated computed form.
fn parse_font_family(value: &[ComponentValue]) -> Option<String> {
    let mut families = Vec::new();
    let mut current = String::new();
    for cv in value {
        match cv {
            ComponentValue::Token(CssToken::Ident(word)) => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            ComponentValue::Token(CssToken::String(s)) => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(s);
            }
            ComponentValue::Token(CssToken::Comma) => {
                if !current.is_empty() {
                    families.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }
    if !current.is_empty() {
        families.push(current);
    }
    if families.is_empty() {
        None
    } else {
        Some(families.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_declaration_block;

    fn styled(css: &str) -> ComputedStyle {
        let env = DefaultEnv;
        let mut style = ComputedStyle::initial(&env);
        for declaration in parse_declaration_block(css) {
            style.apply_declaration(&declaration, &env);
        }
        style.finish(None, 16.0, &env);
        style
    }

    #[test]
    fn initial_values() {
        let style = styled("");
        assert_eq!(style.display, Display::Inline);
        assert!((style.font_size - 16.0).abs() < f32::EPSILON);
        assert_eq!(style.color, WebColor::BLACK);
        assert!(style.background_color.is_transparent());
        assert!(style.width.is_predefined());
    }

    #[test]
    fn display_and_dimensions() {
        let style = styled("display: block; width: 50px; height: 40%");
        assert_eq!(style.display, Display::Block);
        assert!((style.width.val() - 50.0).abs() < f32::EPSILON);
        assert!(style.height.is_percent());
    }

    #[test]
    fn font_size_em_resolves_against_parent() {
        let env = DefaultEnv;
        let mut parent = ComputedStyle::initial(&env);
        for declaration in parse_declaration_block("font-size: 20px") {
            parent.apply_declaration(&declaration, &env);
        }
        parent.finish(None, 16.0, &env);
        assert!((parent.font_size - 20.0).abs() < f32::EPSILON);

        let mut child = ComputedStyle::inherit_from(&parent, &env);
        for declaration in parse_declaration_block("font-size: 1.5em") {
            child.apply_declaration(&declaration, &env);
        }
        child.finish(Some(&parent), 16.0, &env);
        assert!((child.font_size - 30.0).abs() < f32::EPSILON);

        // Without a declaration the child keeps the parent's size.
        let mut plain = ComputedStyle::inherit_from(&parent, &env);
        plain.finish(Some(&parent), 16.0, &env);
        assert!((plain.font_size - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn font_size_keywords_and_rem() {
        let style = styled("font-size: x-large");
        assert!((style.font_size - 24.0).abs() < f32::EPSILON);
        let style = styled("font-size: 2rem");
        assert!((style.font_size - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn font_weight_keywords() {
        assert_eq!(styled("font-weight: bold").font_weight, 700);
        assert_eq!(styled("font-weight: 550").font_weight, 550);
        assert_eq!(styled("font-weight: bolder").font_weight, 700);
    }

    #[test]
    fn border_sides_and_current_color() {
        let style = styled("border: 2px solid");
        assert_eq!(style.border_top.style, BorderStyle::Solid);
        assert!((style.border_left.width.val() - 2.0).abs() < f32::EPSILON);
        // No declared color: currentColor.
        assert!(style.border_top.color.is_none());

        let style = styled("border: 1px solid #ddd");
        assert_eq!(style.border_top.color, Some(WebColor::rgb(0xDD, 0xDD, 0xDD)));
    }

    #[test]
    fn invalid_value_keeps_previous() {
        let style = styled("display: bogus; width: 10q");
        assert_eq!(style.display, Display::Inline);
        assert!(style.width.is_predefined());
    }

    #[test]
    fn line_height_forms() {
        assert_eq!(styled("line-height: normal").line_height, LineHeight::Normal);
        assert_eq!(styled("line-height: 1.6").line_height, LineHeight::Number(1.6));
        assert!(matches!(
            styled("line-height: 24px").line_height,
            LineHeight::Length(_)
        ));
    }

    #[test]
    fn text_decoration_flags() {
        let style = styled("text-decoration: underline line-through");
        assert!(style.text_decoration.underline);
        assert!(style.text_decoration.line_through);
        assert!(!style.text_decoration.overline);
        assert!(styled("text-decoration: none").text_decoration.is_none());
    }

    #[test]
    fn vertical_align_length_resolves() {
        let style = styled("font-size: 20px; vertical-align: -0.5em");
        assert_eq!(style.vertical_align, VerticalAlign::Length(-10.0));
    }

    #[test]
    fn background_longhands() {
        let style = styled("background-image: url(a.png); background-repeat: no-repeat");
        assert_eq!(style.background_image, ["a.png"]);
        assert_eq!(style.background_repeat, BackgroundRepeat::NoRepeat);
    }

    #[test]
    fn calc_font_size() {
        let style = styled("font-size: calc(10px + 0.5em)");
        // 10px + 0.5 * 16px parent.
        assert!((style.font_size - 18.0).abs() < 0.01);
    }

    #[test]
    fn inheritance_partition() {
        let env = DefaultEnv;
        let mut parent = ComputedStyle::initial(&env);
        for declaration in
            parse_declaration_block("color: red; background-color: blue; margin-top: 10px")
        {
            parent.apply_declaration(&declaration, &env);
        }
        parent.finish(None, 16.0, &env);

        let child = ComputedStyle::inherit_from(&parent, &env);
        assert_eq!(child.color, WebColor::rgb(255, 0, 0));
        assert!(child.background_color.is_transparent());
        assert!((child.margin.top.val()).abs() < f32::EPSILON);
    }
}
