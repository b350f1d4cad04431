//! Shorthand property expansion.
//!
//! [§ 5.2 Shorthand Properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
//!
//! "Declaring a shorthand property is equivalent to declaring all of its
//! longhand sub-properties." Expansion happens before storage: the
//! cascade and style application only ever see longhand
//! [`PropertyId`]s. An expansion that recognizes nothing contributes
//! nothing, which drops the declaration per the invalid-value rule.

use crate::properties::PropertyId;
use crate::tokenizer::CssToken;
use crate::values::WebColor;

use super::parser::{ComponentValue, Declaration};

/// Expand one raw declaration into longhand declarations on `out`.
pub fn expand_declaration(
    name: &str,
    value: &[ComponentValue],
    important: bool,
    out: &mut Vec<Declaration>,
) {
    // Longhands pass straight through.
    if let Some(property) = PropertyId::from_name(name) {
        out.push(Declaration {
            property,
            value: value.to_vec(),
            important,
        });
        return;
    }

    let items = split_items(value);
    match name {
        "margin" => expand_quad(
            &items,
            [
                PropertyId::MarginTop,
                PropertyId::MarginRight,
                PropertyId::MarginBottom,
                PropertyId::MarginLeft,
            ],
            important,
            out,
        ),
        "padding" => expand_quad(
            &items,
            [
                PropertyId::PaddingTop,
                PropertyId::PaddingRight,
                PropertyId::PaddingBottom,
                PropertyId::PaddingLeft,
            ],
            important,
            out,
        ),
        "border-width" => expand_quad(
            &items,
            [
                PropertyId::BorderTopWidth,
                PropertyId::BorderRightWidth,
                PropertyId::BorderBottomWidth,
                PropertyId::BorderLeftWidth,
            ],
            important,
            out,
        ),
        "border-style" => expand_quad(
            &items,
            [
                PropertyId::BorderTopStyle,
                PropertyId::BorderRightStyle,
                PropertyId::BorderBottomStyle,
                PropertyId::BorderLeftStyle,
            ],
            important,
            out,
        ),
        "border-color" => expand_quad(
            &items,
            [
                PropertyId::BorderTopColor,
                PropertyId::BorderRightColor,
                PropertyId::BorderBottomColor,
                PropertyId::BorderLeftColor,
            ],
            important,
            out,
        ),
        "border-radius" => expand_quad(
            &items,
            [
                PropertyId::BorderTopLeftRadius,
                PropertyId::BorderTopRightRadius,
                PropertyId::BorderBottomRightRadius,
                PropertyId::BorderBottomLeftRadius,
            ],
            important,
            out,
        ),
        "border" => expand_border(&items, Side::All, important, out),
        "border-top" => expand_border(&items, Side::Top, important, out),
        "border-right" => expand_border(&items, Side::Right, important, out),
        "border-bottom" => expand_border(&items, Side::Bottom, important, out),
        "border-left" => expand_border(&items, Side::Left, important, out),
        "background" => expand_background(&items, important, out),
        "font" => expand_font(&items, important, out),
        "list-style" => expand_list_style(&items, important, out),
        "flex" => expand_flex(&items, important, out),
        _ => {}
    }
}

/// Split a value on whitespace into single component-value items.
fn split_items(value: &[ComponentValue]) -> Vec<ComponentValue> {
    value
        .iter()
        .filter(|v| !v.is_whitespace())
        .cloned()
        .collect()
}

fn push(out: &mut Vec<Declaration>, property: PropertyId, value: ComponentValue, important: bool) {
    out.push(Declaration {
        property,
        value: vec![value],
        important,
    });
}

/// [CSS2 § 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// "If there is only one component value, it applies to all sides. If
/// there are two values, the top and bottom are set to the first value
/// and the right and left are set to the second. If there are three, the
/// top is set to the first, the left and right to the second, and the
/// bottom to the third. If there are four, they apply to the top, right,
/// bottom, and left, respectively."
fn expand_quad(
    items: &[ComponentValue],
    properties: [PropertyId; 4],
    important: bool,
    out: &mut Vec<Declaration>,
) {
    let picks: [usize; 4] = match items.len() {
        1 => [0, 0, 0, 0],
        2 => [0, 1, 0, 1],
        3 => [0, 1, 2, 1],
        4 => [0, 1, 2, 3],
        _ => return,
    };
    for (property, pick) in properties.into_iter().zip(picks) {
        push(out, property, items[pick].clone(), important);
    }
}

#[derive(Clone, Copy)]
enum Side {
    All,
    Top,
    Right,
    Bottom,
    Left,
}

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

fn is_border_style(value: &ComponentValue) -> bool {
    matches!(
        value,
        ComponentValue::Token(CssToken::Ident(word))
            if BORDER_STYLES.iter().any(|s| word.eq_ignore_ascii_case(s))
    )
}

fn is_border_width(value: &ComponentValue) -> bool {
    matches!(value, ComponentValue::Token(CssToken::Dimension { .. }))
        || matches!(
            value,
            ComponentValue::Token(CssToken::Number { value, .. }) if *value == 0.0
        )
        || matches!(
            value,
            ComponentValue::Token(CssToken::Ident(word))
                if ["thin", "medium", "thick"].iter().any(|s| word.eq_ignore_ascii_case(s))
        )
}

fn is_color(value: &ComponentValue) -> bool {
    WebColor::from_component(value, None).is_some()
}

/// `border: <width> || <style> || <color>`, applied to one or all sides.
fn expand_border(
    items: &[ComponentValue],
    side: Side,
    important: bool,
    out: &mut Vec<Declaration>,
) {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for item in items {
        if width.is_none() && is_border_width(item) {
            width = Some(item.clone());
        } else if style.is_none() && is_border_style(item) {
            style = Some(item.clone());
        } else if color.is_none() && is_color(item) {
            color = Some(item.clone());
        } else {
            return; // Unrecognized component invalidates the shorthand.
        }
    }
    if width.is_none() && style.is_none() && color.is_none() {
        return;
    }

    let widths = [
        PropertyId::BorderTopWidth,
        PropertyId::BorderRightWidth,
        PropertyId::BorderBottomWidth,
        PropertyId::BorderLeftWidth,
    ];
    let styles = [
        PropertyId::BorderTopStyle,
        PropertyId::BorderRightStyle,
        PropertyId::BorderBottomStyle,
        PropertyId::BorderLeftStyle,
    ];
    let colors = [
        PropertyId::BorderTopColor,
        PropertyId::BorderRightColor,
        PropertyId::BorderBottomColor,
        PropertyId::BorderLeftColor,
    ];
    let indices: &[usize] = match side {
        Side::All => &[0, 1, 2, 3],
        Side::Top => &[0],
        Side::Right => &[1],
        Side::Bottom => &[2],
        Side::Left => &[3],
    };
    for &index in indices {
        if let Some(width) = &width {
            push(out, widths[index], width.clone(), important);
        }
        if let Some(style) = &style {
            push(out, styles[index], style.clone(), important);
        }
        if let Some(color) = &color {
            push(out, colors[index], color.clone(), important);
        }
    }
}

/// `background: <color> || <image> || <repeat> || <position>`
fn expand_background(items: &[ComponentValue], important: bool, out: &mut Vec<Declaration>) {
    let mut position = Vec::new();
    for item in items {
        match item {
            ComponentValue::Token(CssToken::Url(_)) => {
                push(out, PropertyId::BackgroundImage, item.clone(), important);
            }
            ComponentValue::Function { name, .. } if name == "url" => {
                push(out, PropertyId::BackgroundImage, item.clone(), important);
            }
            ComponentValue::Token(CssToken::Ident(word))
                if ["repeat", "repeat-x", "repeat-y", "no-repeat"]
                    .iter()
                    .any(|s| word.eq_ignore_ascii_case(s)) =>
            {
                push(out, PropertyId::BackgroundRepeat, item.clone(), important);
            }
            ComponentValue::Token(CssToken::Ident(word))
                if ["left", "right", "top", "bottom", "center"]
                    .iter()
                    .any(|s| word.eq_ignore_ascii_case(s)) =>
            {
                position.push(item.clone());
            }
            ComponentValue::Token(
                CssToken::Dimension { .. } | CssToken::Percentage(_) | CssToken::Number { .. },
            ) => position.push(item.clone()),
            ComponentValue::Token(CssToken::Ident(word)) if word.eq_ignore_ascii_case("none") => {
                push(out, PropertyId::BackgroundImage, item.clone(), important);
            }
            item if is_color(item) => {
                push(out, PropertyId::BackgroundColor, item.clone(), important);
            }
            _ => {}
        }
    }
    if !position.is_empty() {
        out.push(Declaration {
            property: PropertyId::BackgroundPosition,
            value: position,
            important,
        });
    }
}

/// `font: [<style> || <weight>]? <size>[/<line-height>]? <family>`
fn expand_font(items: &[ComponentValue], important: bool, out: &mut Vec<Declaration>) {
    let mut index = 0;
    let mut saw_size = false;
    while index < items.len() {
        let item = &items[index];
        match item {
            ComponentValue::Token(CssToken::Ident(word)) if !saw_size => {
                let lower = word.to_ascii_lowercase();
                match lower.as_str() {
                    "italic" | "oblique" => {
                        push(out, PropertyId::FontStyle, item.clone(), important);
                    }
                    "bold" | "bolder" | "lighter" => {
                        push(out, PropertyId::FontWeight, item.clone(), important);
                    }
                    // `normal` is ambiguous between style/weight/variant;
                    // the initial values already cover it.
                    "normal" => {}
                    _ => {
                        // First non-keyword ident without a size: not a
                        // valid font shorthand.
                        return;
                    }
                }
                index += 1;
            }
            ComponentValue::Token(
                CssToken::Dimension { .. } | CssToken::Percentage(_),
            ) if !saw_size => {
                saw_size = true;
                push(out, PropertyId::FontSize, item.clone(), important);
                index += 1;
                // `<size>/<line-height>`
                if matches!(
                    items.get(index),
                    Some(ComponentValue::Token(CssToken::Delim('/')))
                ) {
                    if let Some(height) = items.get(index + 1) {
                        push(out, PropertyId::LineHeight, height.clone(), important);
                    }
                    index += 2;
                }
            }
            ComponentValue::Token(CssToken::Number { value, .. })
                if !saw_size && (100.0..=900.0).contains(value) =>
            {
                push(out, PropertyId::FontWeight, item.clone(), important);
                index += 1;
            }
            _ => break,
        }
    }

    // Everything after the size is the family list.
    if saw_size && index < items.len() {
        out.push(Declaration {
            property: PropertyId::FontFamily,
            value: items[index..].to_vec(),
            important,
        });
    }
}

/// `list-style: <type> || <position> || <image>`
fn expand_list_style(items: &[ComponentValue], important: bool, out: &mut Vec<Declaration>) {
    for item in items {
        match item {
            ComponentValue::Token(CssToken::Url(_)) => {
                push(out, PropertyId::ListStyleImage, item.clone(), important);
            }
            ComponentValue::Token(CssToken::Ident(word)) => {
                let lower = word.to_ascii_lowercase();
                if lower == "inside" || lower == "outside" {
                    push(out, PropertyId::ListStylePosition, item.clone(), important);
                } else {
                    push(out, PropertyId::ListStyleType, item.clone(), important);
                }
            }
            _ => {}
        }
    }
}

/// [CSS Flexbox § 7.1.1 Basic Values of flex](https://www.w3.org/TR/css-flexbox-1/#flex-common)
///
/// "flex: <number> — equivalent to flex: <number> 1 0%."
fn expand_flex(items: &[ComponentValue], important: bool, out: &mut Vec<Declaration>) {
    if let [ComponentValue::Token(CssToken::Ident(word))] = items {
        let lower = word.to_ascii_lowercase();
        let (grow, shrink, basis) = match lower.as_str() {
            // "flex: none — equivalent to flex: 0 0 auto."
            "none" => (0.0, 0.0, "auto"),
            // "flex: auto — equivalent to flex: 1 1 auto."
            "auto" => (1.0, 1.0, "auto"),
            // "flex: initial — equivalent to flex: 0 1 auto."
            "initial" => (0.0, 1.0, "auto"),
            _ => return,
        };
        push_flex_number(out, PropertyId::FlexGrow, grow, important);
        push_flex_number(out, PropertyId::FlexShrink, shrink, important);
        push(
            out,
            PropertyId::FlexBasis,
            ComponentValue::Token(CssToken::Ident(basis.to_string())),
            important,
        );
        return;
    }

    let mut numbers = Vec::new();
    let mut basis = None;
    for item in items {
        match item {
            ComponentValue::Token(CssToken::Number { value, .. }) => numbers.push(*value),
            ComponentValue::Token(CssToken::Dimension { .. } | CssToken::Percentage(_)) => {
                basis = Some(item.clone());
            }
            ComponentValue::Token(CssToken::Ident(word)) if word.eq_ignore_ascii_case("auto") => {
                basis = Some(item.clone());
            }
            _ => return,
        }
    }
    if numbers.is_empty() && basis.is_none() {
        return;
    }
    push_flex_number(out, PropertyId::FlexGrow, numbers.first().copied().unwrap_or(1.0), important);
    push_flex_number(
        out,
        PropertyId::FlexShrink,
        numbers.get(1).copied().unwrap_or(1.0),
        important,
    );
    match basis {
        Some(basis) => push(out, PropertyId::FlexBasis, basis, important),
        // "When omitted from the flex shorthand, its specified value is 0."
        None => push(
            out,
            PropertyId::FlexBasis,
            ComponentValue::Token(CssToken::Percentage(0.0)),
            important,
        ),
    }
}

fn push_flex_number(out: &mut Vec<Declaration>, property: PropertyId, value: f32, important: bool) {
    push(
        out,
        property,
        ComponentValue::Token(CssToken::Number {
            value,
            numeric_type: crate::tokenizer::NumericType::Number,
        }),
        important,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_declaration_block;

    fn properties_of(css: &str) -> Vec<PropertyId> {
        parse_declaration_block(css)
            .into_iter()
            .map(|d| d.property)
            .collect()
    }

    #[test]
    fn margin_quad_forms() {
        assert_eq!(
            properties_of("margin: 10px"),
            [
                PropertyId::MarginTop,
                PropertyId::MarginRight,
                PropertyId::MarginBottom,
                PropertyId::MarginLeft,
            ]
        );
        let two = parse_declaration_block("margin: 20px 0");
        assert_eq!(two.len(), 4);
        // top/bottom take the first value, right/left the second.
        assert_eq!(two[0].value, two[2].value);
        assert_eq!(two[1].value, two[3].value);
        assert_ne!(two[0].value, two[1].value);
    }

    #[test]
    fn border_expands_to_all_sides() {
        let decls = parse_declaration_block("border: 1px solid #ddd");
        assert_eq!(decls.len(), 12);
        assert!(decls.iter().any(|d| d.property == PropertyId::BorderLeftColor));
        assert!(decls.iter().any(|d| d.property == PropertyId::BorderBottomStyle));
    }

    #[test]
    fn border_side_expands_one_side() {
        let decls = parse_declaration_block("border-top: 2px dashed red");
        assert_eq!(decls.len(), 3);
        assert!(decls.iter().all(|d| matches!(
            d.property,
            PropertyId::BorderTopWidth | PropertyId::BorderTopStyle | PropertyId::BorderTopColor
        )));
    }

    #[test]
    fn font_shorthand() {
        let decls = parse_declaration_block("font: italic bold 12px/1.5 Georgia, serif");
        let properties: Vec<PropertyId> = decls.iter().map(|d| d.property).collect();
        assert!(properties.contains(&PropertyId::FontStyle));
        assert!(properties.contains(&PropertyId::FontWeight));
        assert!(properties.contains(&PropertyId::FontSize));
        assert!(properties.contains(&PropertyId::LineHeight));
        assert!(properties.contains(&PropertyId::FontFamily));
    }

    #[test]
    fn background_shorthand() {
        let decls = parse_declaration_block("background: #fff url(bg.png) no-repeat top left");
        let properties: Vec<PropertyId> = decls.iter().map(|d| d.property).collect();
        assert!(properties.contains(&PropertyId::BackgroundColor));
        assert!(properties.contains(&PropertyId::BackgroundImage));
        assert!(properties.contains(&PropertyId::BackgroundRepeat));
        assert!(properties.contains(&PropertyId::BackgroundPosition));
    }

    #[test]
    fn flex_single_number() {
        let decls = parse_declaration_block("flex: 1");
        let properties: Vec<PropertyId> = decls.iter().map(|d| d.property).collect();
        assert_eq!(
            properties,
            [
                PropertyId::FlexGrow,
                PropertyId::FlexShrink,
                PropertyId::FlexBasis,
            ]
        );
    }

    #[test]
    fn unknown_property_dropped() {
        assert!(parse_declaration_block("bogus-property: 1px").is_empty());
    }

    #[test]
    fn important_flag_survives_expansion() {
        let decls = parse_declaration_block("margin: 4px !important");
        assert_eq!(decls.len(), 4);
        assert!(decls.iter().all(|d| d.important));
    }
}
