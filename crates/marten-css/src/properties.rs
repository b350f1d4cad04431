//! Interned CSS property identifiers.
//!
//! Property names are mapped to [`PropertyId`] once, when a declaration
//! block is parsed; the cascade, inheritance, and style application all
//! work on integer ids. Shorthand names never appear here — they are
//! expanded into these longhands before storage (see
//! [`crate::parser::expand_declaration`]).

/// A longhand CSS property the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum PropertyId {
    // Box generation & positioning
    Display,
    Position,
    Float,
    Clear,
    Top,
    Right,
    Bottom,
    Left,
    ZIndex,
    Overflow,
    Visibility,
    BoxSizing,

    // Box geometry
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,

    // Borders
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    BorderTopStyle,
    BorderRightStyle,
    BorderBottomStyle,
    BorderLeftStyle,
    BorderTopColor,
    BorderRightColor,
    BorderBottomColor,
    BorderLeftColor,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderBottomRightRadius,
    BorderBottomLeftRadius,

    // Text & fonts
    Color,
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    LineHeight,
    TextAlign,
    TextDecoration,
    TextIndent,
    TextTransform,
    VerticalAlign,
    WhiteSpace,
    LetterSpacing,
    WordSpacing,

    // Backgrounds
    BackgroundColor,
    BackgroundImage,
    BackgroundRepeat,
    BackgroundPosition,
    BackgroundSize,
    BackgroundAttachment,

    // Lists
    ListStyleType,
    ListStylePosition,
    ListStyleImage,

    // Tables
    BorderCollapse,
    BorderSpacing,
    TableLayout,
    CaptionSide,

    // Flex
    FlexDirection,
    FlexWrap,
    FlexGrow,
    FlexShrink,
    FlexBasis,
    JustifyContent,
    AlignItems,
    AlignSelf,
    AlignContent,
    Order,

    // Generated content & UI
    Content,
    Cursor,
}

impl PropertyId {
    /// Intern a longhand property name (ASCII case-insensitive).
    /// Shorthands and unknown names return `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Some(match lower.as_str() {
            "display" => Self::Display,
            "position" => Self::Position,
            "float" => Self::Float,
            "clear" => Self::Clear,
            "top" => Self::Top,
            "right" => Self::Right,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "z-index" => Self::ZIndex,
            "overflow" => Self::Overflow,
            "visibility" => Self::Visibility,
            "box-sizing" => Self::BoxSizing,
            "width" => Self::Width,
            "height" => Self::Height,
            "min-width" => Self::MinWidth,
            "min-height" => Self::MinHeight,
            "max-width" => Self::MaxWidth,
            "max-height" => Self::MaxHeight,
            "margin-top" => Self::MarginTop,
            "margin-right" => Self::MarginRight,
            "margin-bottom" => Self::MarginBottom,
            "margin-left" => Self::MarginLeft,
            "padding-top" => Self::PaddingTop,
            "padding-right" => Self::PaddingRight,
            "padding-bottom" => Self::PaddingBottom,
            "padding-left" => Self::PaddingLeft,
            "border-top-width" => Self::BorderTopWidth,
            "border-right-width" => Self::BorderRightWidth,
            "border-bottom-width" => Self::BorderBottomWidth,
            "border-left-width" => Self::BorderLeftWidth,
            "border-top-style" => Self::BorderTopStyle,
            "border-right-style" => Self::BorderRightStyle,
            "border-bottom-style" => Self::BorderBottomStyle,
            "border-left-style" => Self::BorderLeftStyle,
            "border-top-color" => Self::BorderTopColor,
            "border-right-color" => Self::BorderRightColor,
            "border-bottom-color" => Self::BorderBottomColor,
            "border-left-color" => Self::BorderLeftColor,
            "border-top-left-radius" => Self::BorderTopLeftRadius,
            "border-top-right-radius" => Self::BorderTopRightRadius,
            "border-bottom-right-radius" => Self::BorderBottomRightRadius,
            "border-bottom-left-radius" => Self::BorderBottomLeftRadius,
            "color" => Self::Color,
            "font-family" => Self::FontFamily,
            "font-size" => Self::FontSize,
            "font-weight" => Self::FontWeight,
            "font-style" => Self::FontStyle,
            "line-height" => Self::LineHeight,
            "text-align" => Self::TextAlign,
            "text-decoration" | "text-decoration-line" => Self::TextDecoration,
            "text-indent" => Self::TextIndent,
            "text-transform" => Self::TextTransform,
            "vertical-align" => Self::VerticalAlign,
            "white-space" => Self::WhiteSpace,
            "letter-spacing" => Self::LetterSpacing,
            "word-spacing" => Self::WordSpacing,
            "background-color" => Self::BackgroundColor,
            "background-image" => Self::BackgroundImage,
            "background-repeat" => Self::BackgroundRepeat,
            "background-position" => Self::BackgroundPosition,
            "background-size" => Self::BackgroundSize,
            "background-attachment" => Self::BackgroundAttachment,
            "list-style-type" => Self::ListStyleType,
            "list-style-position" => Self::ListStylePosition,
            "list-style-image" => Self::ListStyleImage,
            "border-collapse" => Self::BorderCollapse,
            "border-spacing" => Self::BorderSpacing,
            "table-layout" => Self::TableLayout,
            "caption-side" => Self::CaptionSide,
            "flex-direction" => Self::FlexDirection,
            "flex-wrap" => Self::FlexWrap,
            "flex-grow" => Self::FlexGrow,
            "flex-shrink" => Self::FlexShrink,
            "flex-basis" => Self::FlexBasis,
            "justify-content" => Self::JustifyContent,
            "align-items" => Self::AlignItems,
            "align-self" => Self::AlignSelf,
            "align-content" => Self::AlignContent,
            "order" => Self::Order,
            "content" => Self::Content,
            "cursor" => Self::Cursor,
            _ => return None,
        })
    }

    /// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
    ///
    /// "Some properties are inherited from an ancestor element to its
    /// descendants." `text-decoration` is treated as inherited: the
    /// engine paints decorations through descendant fragments, which is
    /// observably the standard's propagation rule for non-replaced
    /// inlines.
    #[must_use]
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            Self::Color
                | Self::FontFamily
                | Self::FontSize
                | Self::FontWeight
                | Self::FontStyle
                | Self::LineHeight
                | Self::TextAlign
                | Self::TextDecoration
                | Self::TextIndent
                | Self::TextTransform
                | Self::WhiteSpace
                | Self::LetterSpacing
                | Self::WordSpacing
                | Self::ListStyleType
                | Self::ListStylePosition
                | Self::ListStyleImage
                | Self::Visibility
                | Self::Cursor
                | Self::BorderCollapse
                | Self::BorderSpacing
                | Self::CaptionSide
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longhand_interning() {
        assert_eq!(PropertyId::from_name("color"), Some(PropertyId::Color));
        assert_eq!(
            PropertyId::from_name("MARGIN-TOP"),
            Some(PropertyId::MarginTop)
        );
        // Shorthands are not longhand ids.
        assert_eq!(PropertyId::from_name("margin"), None);
        assert_eq!(PropertyId::from_name("bogus"), None);
    }

    #[test]
    fn inheritance_flags() {
        assert!(PropertyId::Color.is_inherited());
        assert!(PropertyId::FontSize.is_inherited());
        assert!(!PropertyId::Display.is_inherited());
        assert!(!PropertyId::MarginTop.is_inherited());
        assert!(!PropertyId::BackgroundColor.is_inherited());
    }
}
