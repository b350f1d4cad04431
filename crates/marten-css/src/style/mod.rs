//! Computed style representation.
//!
//! Keyword property values are modeled as enums with `from_name`
//! constructors; [`computed::ComputedStyle`] aggregates every property
//! the engine understands. Parsing an unknown keyword yields `None` and
//! the declaration is dropped, per the invalid-value rule.

pub mod computed;

pub use computed::{resolve_font_size, CascadeEnv, ComputedStyle, DefaultEnv};

use serde::Serialize;

/// [CSS Display Level 3 § 2](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// The display principal of a box. `InlineText` is the internal display
/// of text-run boxes; it never parses from CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Display {
    /// `display: none` — the element generates no box.
    None,
    /// "The element generates a block-level box."
    Block,
    /// "The element generates an inline-level box."
    #[default]
    Inline,
    /// An atomic inline hosting a block formatting context.
    InlineBlock,
    /// A block-level list-item box with a marker.
    ListItem,
    /// `display: table`.
    Table,
    /// `display: inline-table` (laid out as an atomic inline table).
    InlineTable,
    /// `display: table-row`.
    TableRow,
    /// `display: table-row-group` (also header/footer groups).
    TableRowGroup,
    /// `display: table-header-group`.
    TableHeaderGroup,
    /// `display: table-footer-group`.
    TableFooterGroup,
    /// `display: table-cell`.
    TableCell,
    /// `display: table-caption`.
    TableCaption,
    /// `display: flex`.
    Flex,
    /// `display: inline-flex` (atomic inline flex container).
    InlineFlex,
    /// Internal: a run of text inside an inline formatting context.
    InlineText,
}

impl Display {
    /// Parse a `display` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => Self::None,
            "block" => Self::Block,
            "inline" => Self::Inline,
            "inline-block" => Self::InlineBlock,
            "list-item" => Self::ListItem,
            "table" => Self::Table,
            "inline-table" => Self::InlineTable,
            "table-row" => Self::TableRow,
            "table-row-group" => Self::TableRowGroup,
            "table-header-group" => Self::TableHeaderGroup,
            "table-footer-group" => Self::TableFooterGroup,
            "table-cell" => Self::TableCell,
            "table-caption" => Self::TableCaption,
            "flex" => Self::Flex,
            "inline-flex" => Self::InlineFlex,
            _ => return None,
        })
    }

    /// True for the block-level outer display types.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(
            self,
            Self::Block | Self::ListItem | Self::Table | Self::Flex
        )
    }

    /// True for inline-level display types (including atomic inlines).
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(
            self,
            Self::Inline
                | Self::InlineBlock
                | Self::InlineTable
                | Self::InlineFlex
                | Self::InlineText
        )
    }
}

/// [CSS2 § 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "Offset relative to its normal position."
    Relative,
    /// "The box's position is specified with the offset properties."
    Absolute,
    /// "The box is fixed with respect to the viewport."
    Fixed,
}

impl Position {
    /// Parse a `position` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "static" => Self::Static,
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            _ => return None,
        })
    }

    /// True if the element establishes a containing block for absolutes.
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// [CSS2 § 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FloatMode {
    /// "The box is not floated."
    #[default]
    None,
    /// "Floated to the left."
    Left,
    /// "Floated to the right."
    Right,
}

impl FloatMode {
    /// Parse a `float` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => Self::None,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => return None,
        })
    }
}

/// [CSS2 § 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Clear {
    /// "No constraint."
    #[default]
    None,
    /// "Below the bottom outer edge of any left-floating boxes."
    Left,
    /// "Below the bottom outer edge of any right-floating boxes."
    Right,
    /// "Below all earlier floats."
    Both,
}

impl Clear {
    /// Parse a `clear` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => Self::None,
            "left" => Self::Left,
            "right" => Self::Right,
            "both" => Self::Both,
            _ => return None,
        })
    }
}

/// `overflow` — the engine clips or lets content spill; scrolling is the
/// host's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Overflow {
    /// Content spills out of the box.
    #[default]
    Visible,
    /// Content is clipped to the padding box.
    Hidden,
    /// Clipped; the host may scroll.
    Scroll,
    /// Clipped; the host decides on scrollbars.
    Auto,
}

impl Overflow {
    /// Parse an `overflow` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "visible" => Self::Visible,
            "hidden" => Self::Hidden,
            "scroll" => Self::Scroll,
            "auto" => Self::Auto,
            _ => return None,
        })
    }

    /// True if the box clips its contents.
    #[must_use]
    pub const fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

/// `visibility`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Visibility {
    /// Painted normally.
    #[default]
    Visible,
    /// "The generated box is invisible but still affects layout."
    Hidden,
    /// Treated as `hidden` outside of tables.
    Collapse,
}

impl Visibility {
    /// Parse a `visibility` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "visible" => Self::Visible,
            "hidden" => Self::Hidden,
            "collapse" => Self::Collapse,
            _ => return None,
        })
    }
}

/// `box-sizing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BoxSizing {
    /// "width and height apply to the content box."
    #[default]
    ContentBox,
    /// "width and height apply to the border box."
    BorderBox,
}

impl BoxSizing {
    /// Parse a `box-sizing` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "content-box" => Self::ContentBox,
            "border-box" => Self::BorderBox,
            _ => return None,
        })
    }
}

/// [CSS2 § 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextAlign {
    /// "Aligned to the left line edge."
    #[default]
    Left,
    /// "Aligned to the right line edge."
    Right,
    /// "Centered within the line box."
    Center,
    /// "Spaced to line up both edges, except the last line."
    Justify,
}

impl TextAlign {
    /// Parse a `text-align` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "left" | "start" => Self::Left,
            "right" | "end" => Self::Right,
            "center" => Self::Center,
            "justify" => Self::Justify,
            _ => return None,
        })
    }
}

/// [CSS2 § 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum VerticalAlign {
    /// "Align the baseline of the box with the baseline of the parent."
    #[default]
    Baseline,
    /// "Lower the baseline to the proper position for subscripts."
    Sub,
    /// "Raise the baseline to the proper position for superscripts."
    Super,
    /// "Align the top of the box with the top of the line box."
    Top,
    /// "Align the top with the top of the parent's content area."
    TextTop,
    /// "Align the vertical midpoint with baseline + half x-height."
    Middle,
    /// "Align the bottom of the box with the bottom of the line box."
    Bottom,
    /// "Align the bottom with the bottom of the parent's content area."
    TextBottom,
    /// Shift from the baseline by a pixel amount (lengths resolve before
    /// line layout).
    Length(f32),
}

impl VerticalAlign {
    /// Parse a `vertical-align` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "baseline" => Self::Baseline,
            "sub" => Self::Sub,
            "super" => Self::Super,
            "top" => Self::Top,
            "text-top" => Self::TextTop,
            "middle" => Self::Middle,
            "bottom" => Self::Bottom,
            "text-bottom" => Self::TextBottom,
            _ => return None,
        })
    }
}

/// [CSS2 § 16.6 'white-space'](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WhiteSpace {
    /// Collapse whitespace, wrap lines.
    #[default]
    Normal,
    /// Collapse whitespace, never wrap.
    Nowrap,
    /// Preserve whitespace and newlines, never wrap.
    Pre,
    /// Preserve newlines, collapse other whitespace, wrap.
    PreLine,
    /// Preserve whitespace and newlines, wrap.
    PreWrap,
}

impl WhiteSpace {
    /// Parse a `white-space` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "normal" => Self::Normal,
            "nowrap" => Self::Nowrap,
            "pre" => Self::Pre,
            "pre-line" => Self::PreLine,
            "pre-wrap" => Self::PreWrap,
            _ => return None,
        })
    }

    /// True if runs of whitespace collapse to single spaces.
    #[must_use]
    pub const fn collapses(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// True if lines may break at whitespace.
    #[must_use]
    pub const fn wraps(self) -> bool {
        !matches!(self, Self::Nowrap | Self::Pre)
    }
}

/// [§ 3.3 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FontStyle {
    /// "Selects a face that is classified as a normal face."
    #[default]
    Normal,
    /// "Selects a font that is labeled as an italic face."
    Italic,
    /// "Selects a font that is labeled as an oblique face."
    Oblique,
}

impl FontStyle {
    /// Parse a `font-style` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "normal" => Self::Normal,
            "italic" => Self::Italic,
            "oblique" => Self::Oblique,
            _ => return None,
        })
    }
}

/// [§ 3 Text Decoration](https://www.w3.org/TR/css-text-decoration-3/#text-decoration-line-property)
///
/// "Values: none | [ underline || overline || line-through ]".
/// `Default` gives all `false` = `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextDecorationLine {
    /// "Each line of text has an underline."
    pub underline: bool,
    /// "Each line of text has a line over it."
    pub overline: bool,
    /// "Each line of text has a line through the middle."
    pub line_through: bool,
}

impl TextDecorationLine {
    /// True if no decoration lines are set.
    #[must_use]
    pub const fn is_none(self) -> bool {
        !(self.underline || self.overline || self.line_through)
    }
}

/// `text-transform`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextTransform {
    /// No transformation.
    #[default]
    None,
    /// "Puts the first character of each word in uppercase."
    Capitalize,
    /// "Puts all characters of each word in uppercase."
    Uppercase,
    /// "Puts all characters of each word in lowercase."
    Lowercase,
}

impl TextTransform {
    /// Parse a `text-transform` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => Self::None,
            "capitalize" => Self::Capitalize,
            "uppercase" => Self::Uppercase,
            "lowercase" => Self::Lowercase,
            _ => return None,
        })
    }
}

/// [CSS2 § 12.5.1 'list-style-type'](https://www.w3.org/TR/CSS2/generate.html#list-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ListStyleType {
    /// No marker.
    None,
    /// A filled circle.
    #[default]
    Disc,
    /// A hollow circle.
    Circle,
    /// A filled square.
    Square,
    /// "Decimal numbers, beginning with 1."
    Decimal,
    /// "Lowercase ascii letters."
    LowerAlpha,
    /// "Uppercase ascii letters."
    UpperAlpha,
    /// "Lowercase roman numerals."
    LowerRoman,
    /// "Uppercase roman numerals."
    UpperRoman,
    /// "Lowercase classical Greek."
    LowerGreek,
}

impl ListStyleType {
    /// Parse a `list-style-type` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => Self::None,
            "disc" => Self::Disc,
            "circle" => Self::Circle,
            "square" => Self::Square,
            "decimal" => Self::Decimal,
            "lower-alpha" | "lower-latin" => Self::LowerAlpha,
            "upper-alpha" | "upper-latin" => Self::UpperAlpha,
            "lower-roman" => Self::LowerRoman,
            "upper-roman" => Self::UpperRoman,
            "lower-greek" => Self::LowerGreek,
            _ => return None,
        })
    }
}

/// `list-style-position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ListStylePosition {
    /// "The marker box is outside the principal block box."
    #[default]
    Outside,
    /// "The marker box is the first inline box in the principal box."
    Inside,
}

impl ListStylePosition {
    /// Parse a `list-style-position` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "outside" => Self::Outside,
            "inside" => Self::Inside,
            _ => return None,
        })
    }
}

/// [CSS Backgrounds § 3.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BorderStyle {
    /// "No border; the border width is zero."
    #[default]
    None,
    /// Like `none`, but wins border-conflict resolution in tables.
    Hidden,
    /// "A series of round dots."
    Dotted,
    /// "A series of square-ended dashes."
    Dashed,
    /// "A single line segment."
    Solid,
    /// "Two parallel solid lines."
    Double,
    /// "Looks as if it were carved in the canvas."
    Groove,
    /// "Looks as if it were coming out of the canvas."
    Ridge,
    /// "Looks as if the content on the inside were sunken."
    Inset,
    /// "Looks as if the content on the inside were raised."
    Outset,
}

impl BorderStyle {
    /// Parse a `border-style` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => Self::None,
            "hidden" => Self::Hidden,
            "dotted" => Self::Dotted,
            "dashed" => Self::Dashed,
            "solid" => Self::Solid,
            "double" => Self::Double,
            "groove" => Self::Groove,
            "ridge" => Self::Ridge,
            "inset" => Self::Inset,
            "outset" => Self::Outset,
            _ => return None,
        })
    }

    /// True if the side paints nothing and contributes no width.
    #[must_use]
    pub const fn is_invisible(self) -> bool {
        matches!(self, Self::None | Self::Hidden)
    }
}

/// `background-repeat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BackgroundRepeat {
    /// Tile in both axes.
    #[default]
    Repeat,
    /// Tile horizontally only.
    RepeatX,
    /// Tile vertically only.
    RepeatY,
    /// Paint once.
    NoRepeat,
}

impl BackgroundRepeat {
    /// Parse a `background-repeat` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "repeat" => Self::Repeat,
            "repeat-x" => Self::RepeatX,
            "repeat-y" => Self::RepeatY,
            "no-repeat" => Self::NoRepeat,
            _ => return None,
        })
    }
}

/// `border-collapse`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BorderCollapse {
    /// "Each cell has its own border."
    #[default]
    Separate,
    /// "Borders are collapsed into a single border."
    Collapse,
}

impl BorderCollapse {
    /// Parse a `border-collapse` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "separate" => Self::Separate,
            "collapse" => Self::Collapse,
            _ => return None,
        })
    }
}

/// `table-layout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TableLayoutMode {
    /// The CSS2 automatic table layout algorithm.
    #[default]
    Auto,
    /// Column widths from the first row only.
    Fixed,
}

impl TableLayoutMode {
    /// Parse a `table-layout` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "auto" => Self::Auto,
            "fixed" => Self::Fixed,
            _ => return None,
        })
    }
}

/// [CSS Flexbox § 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FlexDirection {
    /// "The main axis is the inline axis."
    #[default]
    Row,
    /// Row, reversed.
    RowReverse,
    /// "The main axis is the block axis."
    Column,
    /// Column, reversed.
    ColumnReverse,
}

impl FlexDirection {
    /// Parse a `flex-direction` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "row" => Self::Row,
            "row-reverse" => Self::RowReverse,
            "column" => Self::Column,
            "column-reverse" => Self::ColumnReverse,
            _ => return None,
        })
    }

    /// True if the main axis is horizontal.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// True for the reversed variants.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// `flex-wrap`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FlexWrap {
    /// "The flex container is single-line."
    #[default]
    Nowrap,
    /// "Multi-line."
    Wrap,
    /// Multi-line, cross-axis reversed.
    WrapReverse,
}

impl FlexWrap {
    /// Parse a `flex-wrap` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "nowrap" => Self::Nowrap,
            "wrap" => Self::Wrap,
            "wrap-reverse" => Self::WrapReverse,
            _ => return None,
        })
    }
}

/// [CSS Flexbox § 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum JustifyContent {
    /// "Packed toward the start of the line."
    #[default]
    FlexStart,
    /// "Packed toward the end of the line."
    FlexEnd,
    /// "Packed toward the center of the line."
    Center,
    /// "Evenly distributed; first and last items flush."
    SpaceBetween,
    /// "Evenly distributed with half-size spaces on either end."
    SpaceAround,
    /// Equal space between and around every item.
    SpaceEvenly,
}

impl JustifyContent {
    /// Parse a `justify-content` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "flex-start" | "start" => Self::FlexStart,
            "flex-end" | "end" => Self::FlexEnd,
            "center" => Self::Center,
            "space-between" => Self::SpaceBetween,
            "space-around" => Self::SpaceAround,
            "space-evenly" => Self::SpaceEvenly,
            _ => return None,
        })
    }
}

/// [CSS Flexbox § 8.3 'align-items' / 'align-self'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AlignItems {
    /// "Stretch to fill the container" (the initial value).
    #[default]
    Stretch,
    /// Cross-start edge alignment.
    FlexStart,
    /// Cross-end edge alignment.
    FlexEnd,
    /// Centered in the cross axis.
    Center,
    /// "Participates in baseline alignment."
    Baseline,
    /// `align-self: auto` — defer to the container's `align-items`.
    Auto,
}

impl AlignItems {
    /// Parse an `align-items` / `align-self` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "stretch" => Self::Stretch,
            "flex-start" | "start" => Self::FlexStart,
            "flex-end" | "end" => Self::FlexEnd,
            "center" => Self::Center,
            "baseline" => Self::Baseline,
            "auto" => Self::Auto,
            _ => return None,
        })
    }
}

/// `caption-side`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CaptionSide {
    /// Caption above the table grid.
    #[default]
    Top,
    /// Caption below the table grid.
    Bottom,
}

impl CaptionSide {
    /// Parse a `caption-side` keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            _ => return None,
        })
    }
}

/// `line-height` computed value.
///
/// [CSS2 § 10.8.1](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
///
/// "normal: tells user agents to set the used value to a reasonable
/// value based on the font. number: the used value is the number
/// multiplied by the element's font size" — numbers inherit as numbers,
/// lengths as lengths.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum LineHeight {
    /// A font-derived default (the engine uses 1.2 × font-size).
    #[default]
    Normal,
    /// A multiplier on the element's own font size.
    Number(f32),
    /// An explicit length (resolved at layout).
    Length(crate::values::Length),
}
