//! Media queries and container-reported media features.
//!
//! [Media Queries Level 3](https://www.w3.org/TR/css3-mediaqueries/)
//!
//! "A media query consists of a media type and zero or more expressions
//! that check for the conditions of particular media features."
//!
//! The container fills a [`MediaFeatures`] snapshot; `@media` preludes
//! compile to a [`MediaQueryList`] evaluated against it whenever styles
//! are (re)resolved — `media_changed` re-runs the evaluation with fresh
//! features.

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;
use crate::values::{Length, LengthUnit};

/// "The media type" — the engine distinguishes the types it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MediaType {
    /// Matches every device.
    #[default]
    All,
    /// Continuous screen media.
    Screen,
    /// Paged print media.
    Print,
}

impl MediaType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "all" => Some(Self::All),
            "screen" => Some(Self::Screen),
            "print" => Some(Self::Print),
            _ => None,
        }
    }
}

/// The feature snapshot the container reports through
/// `get_media_features`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaFeatures {
    /// The rendering medium.
    pub media_type: MediaType,
    /// "the width of the targeted display area of the output device"
    pub width: i32,
    /// Viewport height in px.
    pub height: i32,
    /// Physical device width in px.
    pub device_width: i32,
    /// Physical device height in px.
    pub device_height: i32,
    /// "the number of bits per color component"; 0 for monochrome.
    pub color: i32,
    /// Bits per pixel on a monochrome device; 0 otherwise.
    pub monochrome: i32,
    /// Entries in the color lookup table; 0 without one.
    pub color_index: i32,
    /// Device resolution in dpi.
    pub resolution: i32,
}

impl Default for MediaFeatures {
    fn default() -> Self {
        Self {
            media_type: MediaType::Screen,
            width: 1280,
            height: 720,
            device_width: 1280,
            device_height: 720,
            color: 8,
            monochrome: 0,
            color_index: 0,
            resolution: 96,
        }
    }
}

/// One `(feature: value)` expression.
#[derive(Debug, Clone, PartialEq)]
enum Expression {
    Width(Ordering, f32),
    Height(Ordering, f32),
    DeviceWidth(Ordering, f32),
    DeviceHeight(Ordering, f32),
    Color(Ordering, i32),
    Monochrome(Ordering, i32),
    ColorIndex(Ordering, i32),
    Resolution(Ordering, i32),
    Orientation(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordering {
    Min,
    Max,
    Exact,
}

impl Expression {
    fn evaluate(&self, features: &MediaFeatures) -> bool {
        let compare_i = |ordering: Ordering, actual: i32, expected: i32| match ordering {
            Ordering::Min => actual >= expected,
            Ordering::Max => actual <= expected,
            Ordering::Exact => actual == expected,
        };
        let compare_f = |ordering: Ordering, actual: i32, expected: f32| match ordering {
            Ordering::Min => actual as f32 >= expected,
            Ordering::Max => actual as f32 <= expected,
            Ordering::Exact => (actual as f32 - expected).abs() < 0.5,
        };
        match self {
            Self::Width(o, v) => compare_f(*o, features.width, *v),
            Self::Height(o, v) => compare_f(*o, features.height, *v),
            Self::DeviceWidth(o, v) => compare_f(*o, features.device_width, *v),
            Self::DeviceHeight(o, v) => compare_f(*o, features.device_height, *v),
            Self::Color(o, v) => compare_i(*o, features.color, *v),
            Self::Monochrome(o, v) => compare_i(*o, features.monochrome, *v),
            Self::ColorIndex(o, v) => compare_i(*o, features.color_index, *v),
            Self::Resolution(o, v) => compare_i(*o, features.resolution, *v),
            // "portrait: the height is greater than or equal to the width"
            Self::Orientation(portrait) => (features.height >= features.width) == *portrait,
        }
    }
}

/// One media query: `[not]? <type>? [and (expr)]*`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    negated: bool,
    media_type: Option<MediaType>,
    expressions: Vec<Expression>,
}

impl MediaQuery {
    fn evaluate(&self, features: &MediaFeatures) -> bool {
        let type_ok = match self.media_type {
            None | Some(MediaType::All) => true,
            Some(t) => t == features.media_type,
        };
        let result = type_ok && self.expressions.iter().all(|e| e.evaluate(features));
        result != self.negated
    }
}

/// A comma-separated list of media queries.
///
/// "Several media queries can be combined in a media query list... the
/// list is true if any of its queries is true." An empty list is true.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQueryList {
    queries: Vec<MediaQuery>,
}

impl MediaQueryList {
    /// Compile a query list from an `@media`/`@import` prelude.
    /// Unparseable queries become `not all` (never true), per spec.
    #[must_use]
    pub fn parse(prelude: &[ComponentValue]) -> Self {
        let queries = prelude
            .split(|v| matches!(v, ComponentValue::Token(CssToken::Comma)))
            .map(|query| parse_query(query).unwrap_or(MediaQuery {
                negated: true,
                media_type: None,
                expressions: Vec::new(),
            }))
            .collect();
        Self { queries }
    }

    /// Compile from free-standing text (the `media` attribute of
    /// `<link>`).
    #[must_use]
    pub fn parse_text(text: &str) -> Self {
        Self::parse(&crate::parser::parse_component_values(text))
    }

    /// True if any query matches (or the list is empty).
    #[must_use]
    pub fn evaluate(&self, features: &MediaFeatures) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|q| q.evaluate(features))
    }
}

fn parse_query(values: &[ComponentValue]) -> Option<MediaQuery> {
    let values: Vec<&ComponentValue> = values.iter().filter(|v| !v.is_whitespace()).collect();
    let mut position = 0;
    let mut query = MediaQuery {
        negated: false,
        media_type: None,
        expressions: Vec::new(),
    };

    // `[only | not]?`
    if let Some(ComponentValue::Token(CssToken::Ident(word))) = values.first() {
        match word.to_ascii_lowercase().as_str() {
            "not" => {
                query.negated = true;
                position = 1;
            }
            "only" => position = 1,
            _ => {}
        }
    }

    // `<media-type>?`
    if let Some(ComponentValue::Token(CssToken::Ident(word))) = values.get(position) {
        query.media_type = Some(MediaType::from_name(&word.to_ascii_lowercase())?);
        position += 1;
    }

    // `[and (expr)]*` — a leading expression without a type is fine too.
    while position < values.len() {
        match values[position] {
            ComponentValue::Token(CssToken::Ident(word))
                if word.eq_ignore_ascii_case("and") =>
            {
                position += 1;
            }
            ComponentValue::Block { token: '(', value } => {
                query.expressions.push(parse_expression(value)?);
                position += 1;
            }
            _ => return None,
        }
    }

    Some(query)
}

/// `( feature [: value]? )`
fn parse_expression(values: &[ComponentValue]) -> Option<Expression> {
    let values: Vec<&ComponentValue> = values.iter().filter(|v| !v.is_whitespace()).collect();

    let ComponentValue::Token(CssToken::Ident(raw_name)) = values.first()? else {
        return None;
    };
    let name = raw_name.to_ascii_lowercase();
    let (ordering, feature) = if let Some(rest) = name.strip_prefix("min-") {
        (Ordering::Min, rest.to_string())
    } else if let Some(rest) = name.strip_prefix("max-") {
        (Ordering::Max, rest.to_string())
    } else {
        (Ordering::Exact, name)
    };

    let value = match values.get(1) {
        Some(ComponentValue::Token(CssToken::Colon)) => values.get(2).copied(),
        None => None,
        _ => return None,
    };

    let as_px = |value: Option<&ComponentValue>| -> Option<f32> {
        let length = Length::from_component(value?, "", 0)?;
        // Media lengths resolve against the initial font size (16px)
        // for font-relative units.
        match length.units() {
            LengthUnit::Px | LengthUnit::None => Some(length.val()),
            LengthUnit::Em | LengthUnit::Rem => Some(length.val() * 16.0),
            _ => None,
        }
    };
    let as_int = |value: Option<&ComponentValue>| -> Option<i32> {
        match value {
            Some(ComponentValue::Token(CssToken::Number { value, .. })) => Some(*value as i32),
            // `(color)` without a value tests for a non-zero feature.
            None => None,
            _ => None,
        }
    };

    Some(match feature.as_str() {
        "width" => Expression::Width(ordering, as_px(value)?),
        "height" => Expression::Height(ordering, as_px(value)?),
        "device-width" => Expression::DeviceWidth(ordering, as_px(value)?),
        "device-height" => Expression::DeviceHeight(ordering, as_px(value)?),
        "color" => Expression::Color(ordering.min_if_bare(value.is_none()), as_int(value).unwrap_or(1)),
        "monochrome" => {
            Expression::Monochrome(ordering.min_if_bare(value.is_none()), as_int(value).unwrap_or(1))
        }
        "color-index" => {
            Expression::ColorIndex(ordering.min_if_bare(value.is_none()), as_int(value).unwrap_or(1))
        }
        "resolution" => Expression::Resolution(ordering, as_int(value)?),
        "orientation" => {
            let ComponentValue::Token(CssToken::Ident(word)) = value? else {
                return None;
            };
            Expression::Orientation(word.eq_ignore_ascii_case("portrait"))
        }
        _ => return None,
    })
}

impl Ordering {
    /// A bare `(color)` means "at least one bit of color".
    const fn min_if_bare(self, bare: bool) -> Self {
        if bare {
            Self::Min
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_component_values;

    fn query(text: &str) -> MediaQueryList {
        MediaQueryList::parse(&parse_component_values(text))
    }

    fn features(width: i32, height: i32) -> MediaFeatures {
        MediaFeatures {
            width,
            height,
            ..MediaFeatures::default()
        }
    }

    #[test]
    fn empty_list_matches() {
        assert!(query("").evaluate(&features(800, 600)));
    }

    #[test]
    fn type_matching() {
        assert!(query("screen").evaluate(&features(800, 600)));
        assert!(!query("print").evaluate(&features(800, 600)));
        assert!(query("all").evaluate(&features(800, 600)));
        assert!(!query("not screen").evaluate(&features(800, 600)));
    }

    #[test]
    fn width_ranges() {
        let narrow = features(500, 800);
        let wide = features(1200, 800);
        let q = query("screen and (max-width: 600px)");
        assert!(q.evaluate(&narrow));
        assert!(!q.evaluate(&wide));
        let q = query("(min-width: 600px) and (max-width: 1300px)");
        assert!(!q.evaluate(&narrow));
        assert!(q.evaluate(&wide));
    }

    #[test]
    fn comma_list_is_or() {
        let q = query("print, (max-width: 600px)");
        assert!(q.evaluate(&features(500, 800)));
        assert!(!q.evaluate(&features(1200, 800)));
    }

    #[test]
    fn orientation() {
        assert!(query("(orientation: portrait)").evaluate(&features(600, 800)));
        assert!(query("(orientation: landscape)").evaluate(&features(800, 600)));
    }

    #[test]
    fn bare_color_feature() {
        let q = query("(color)");
        assert!(q.evaluate(&MediaFeatures::default()));
        let mono = MediaFeatures {
            color: 0,
            monochrome: 1,
            ..MediaFeatures::default()
        };
        assert!(!q.evaluate(&mono));
        assert!(query("(monochrome)").evaluate(&mono));
    }

    #[test]
    fn unknown_feature_never_matches() {
        assert!(!query("(hover: hover)").evaluate(&MediaFeatures::default()));
    }
}
