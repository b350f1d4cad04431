//! CSS length values.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//!
//! A [`Length`] carries a numeric value with a unit, a `calc()` tree, or a
//! *predefined* keyword collapsed to an integer tag. Properties that take
//! keyword values (`display`, `border-style`, `auto`, ...) store the
//! keyword's index in the same slot as a length would occupy, so one type
//! flows through declaration storage, the cascade, and layout.
//!
//! Percentages remember that they are percentages; resolution against the
//! referent is deferred to layout ([`Length::calc_percent`]).

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;
use crate::values::calc::CalcExpr;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Units a length value can carry. `None` is a bare number (valid where
/// an integer or number is expected, and for zero lengths).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LengthUnit {
    /// A unitless number.
    #[default]
    None,
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent,
    /// "1px = 1/96th of 1in"
    Px,
    /// "Equal to the computed value of font-size on the element"
    Em,
    /// "Equal to the used x-height of the first available font"
    Ex,
    /// "Equal to the advance measure of the '0' glyph"
    Ch,
    /// "Equal to the computed value of font-size on the root element"
    Rem,
    /// "1pt = 1/72nd of 1in"
    Pt,
    /// Inches.
    In,
    /// Centimeters.
    Cm,
    /// Millimeters.
    Mm,
    /// "1vw = 1% of viewport width"
    Vw,
    /// "1vh = 1% of viewport height"
    Vh,
    /// The smaller of `vw`/`vh`.
    Vmin,
    /// The larger of `vw`/`vh`.
    Vmax,
}

impl LengthUnit {
    /// Parse a unit identifier (already lowercased by the tokenizer).
    #[must_use]
    pub fn from_name(unit: &str) -> Option<Self> {
        match unit {
            "px" => Some(Self::Px),
            "em" => Some(Self::Em),
            "ex" => Some(Self::Ex),
            "ch" => Some(Self::Ch),
            "rem" => Some(Self::Rem),
            "pt" => Some(Self::Pt),
            "in" => Some(Self::In),
            "cm" => Some(Self::Cm),
            "mm" => Some(Self::Mm),
            "vw" => Some(Self::Vw),
            "vh" => Some(Self::Vh),
            "vmin" => Some(Self::Vmin),
            "vmax" => Some(Self::Vmax),
            _ => None,
        }
    }
}

/// A CSS length, keyword tag, or `calc()` expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Length {
    /// A keyword value collapsed to its index in the property's keyword
    /// list (`-1` when parsing fell back to the default).
    Predef(i32),
    /// A numeric value with a unit.
    Value {
        /// The numeric value.
        value: f32,
        /// Its unit.
        unit: LengthUnit,
    },
    /// An unresolved `calc()` tree; evaluated during unit resolution.
    Calc(Box<CalcExpr>),
}

impl Default for Length {
    fn default() -> Self {
        Self::Value {
            value: 0.0,
            unit: LengthUnit::None,
        }
    }
}

impl Length {
    /// A zero pixel length.
    #[must_use]
    pub const fn zero() -> Self {
        Self::Value {
            value: 0.0,
            unit: LengthUnit::Px,
        }
    }

    /// A pixel length.
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::Value {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// A percentage length.
    #[must_use]
    pub const fn percent(value: f32) -> Self {
        Self::Value {
            value,
            unit: LengthUnit::Percent,
        }
    }

    /// True if this is a predefined keyword tag.
    #[must_use]
    pub const fn is_predefined(&self) -> bool {
        matches!(self, Self::Predef(_))
    }

    /// The keyword tag, or 0 for non-keyword values.
    #[must_use]
    pub const fn predef(&self) -> i32 {
        match self {
            Self::Predef(tag) => *tag,
            _ => 0,
        }
    }

    /// The numeric value, or 0 for keywords and calc.
    #[must_use]
    pub const fn val(&self) -> f32 {
        match self {
            Self::Value { value, .. } => *value,
            _ => 0.0,
        }
    }

    /// The unit, or [`LengthUnit::None`] for keywords and calc.
    #[must_use]
    pub const fn units(&self) -> LengthUnit {
        match self {
            Self::Value { unit, .. } => *unit,
            _ => LengthUnit::None,
        }
    }

    /// True if this is a percentage.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(
            self,
            Self::Value {
                unit: LengthUnit::Percent,
                ..
            }
        )
    }

    /// Resolve a percentage against its referent, pass pixel values
    /// through, and return 0 for anything else.
    ///
    /// Percentages remember their referent: "resolution is deferred to
    /// layout", which supplies it here.
    #[must_use]
    pub fn calc_percent(&self, referent: f32) -> f32 {
        match self {
            Self::Value {
                value,
                unit: LengthUnit::Percent,
            } => referent * value / 100.0,
            Self::Value { value, .. } => *value,
            _ => 0.0,
        }
    }

    /// Parse from a string, with an optional `;`-separated keyword list.
    ///
    /// Keywords are matched case-insensitively and collapse to their
    /// index; an unrecognized non-numeric value collapses to
    /// `Predef(default_predef)`. A bare number keeps
    /// [`LengthUnit::None`].
    #[must_use]
    pub fn from_string(value: &str, predefs: &str, default_predef: i32) -> Self {
        let value = value.trim();
        if !predefs.is_empty() {
            for (index, keyword) in predefs.split(';').enumerate() {
                if value.eq_ignore_ascii_case(keyword) {
                    return Self::Predef(index as i32);
                }
            }
        }

        // Split the numeric part from a trailing unit.
        let split = value
            .char_indices()
            .find(|&(i, c)| {
                !(c.is_ascii_digit() || c == '.' || ((c == '+' || c == '-') && i == 0))
            })
            .map_or(value.len(), |(i, _)| i);
        let (number, unit) = value.split_at(split);
        let Ok(number) = number.parse::<f32>() else {
            return Self::Predef(default_predef);
        };

        let unit = unit.trim();
        if unit.is_empty() {
            return Self::Value {
                value: number,
                unit: LengthUnit::None,
            };
        }
        if unit == "%" {
            return Self::percent(number);
        }
        match LengthUnit::from_name(&unit.to_ascii_lowercase()) {
            Some(unit) => Self::Value {
                value: number,
                unit,
            },
            None => Self::Predef(default_predef),
        }
    }

    /// Parse from a single component value, with an optional keyword list.
    #[must_use]
    pub fn from_component(
        value: &ComponentValue,
        predefs: &str,
        default_predef: i32,
    ) -> Option<Self> {
        match value {
            ComponentValue::Token(CssToken::Dimension { value, unit }) => {
                LengthUnit::from_name(unit).map(|unit| Self::Value {
                    value: *value,
                    unit,
                })
            }
            ComponentValue::Token(CssToken::Percentage(value)) => Some(Self::percent(*value)),
            ComponentValue::Token(CssToken::Number { value, .. }) => Some(Self::Value {
                value: *value,
                unit: LengthUnit::None,
            }),
            ComponentValue::Token(CssToken::Ident(ident)) => {
                if predefs.is_empty() {
                    return None;
                }
                predefs
                    .split(';')
                    .position(|k| ident.eq_ignore_ascii_case(k))
                    .map(|index| Self::Predef(index as i32))
            }
            ComponentValue::Function { name, value } if name == "calc" => {
                CalcExpr::parse(value).map(|expr| Self::Calc(Box::new(expr)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_list_collapses_to_index() {
        let top = Length::from_string("top", "top;bottom", -1);
        assert!(top.is_predefined());
        assert_eq!(top.predef(), 0);

        let bottom = Length::from_string("bottom", "top;bottom", -1);
        assert_eq!(bottom.predef(), 1);

        let bad = Length::from_string("bad", "top;bottom", -1);
        assert!(bad.is_predefined());
        assert_eq!(bad.predef(), -1);
    }

    #[test]
    fn bare_number_has_no_unit() {
        let len = Length::from_string("123", "top;bottom", -1);
        assert!(!len.is_predefined());
        assert!((len.val() - 123.0).abs() < f32::EPSILON);
        assert_eq!(len.units(), LengthUnit::None);
    }

    #[test]
    fn pixel_dimension() {
        let len = Length::from_string("123px", "", 0);
        assert!((len.val() - 123.0).abs() < f32::EPSILON);
        assert_eq!(len.units(), LengthUnit::Px);
    }

    #[test]
    fn percentage_resolution_is_deferred() {
        let len = Length::from_string("10%", "", 0);
        assert!(len.is_percent());
        assert!((len.calc_percent(100.0) - 10.0).abs() < f32::EPSILON);
        assert!((len.calc_percent(250.0) - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn negative_and_fractional_values() {
        let len = Length::from_string("-2.5em", "", 0);
        assert!((len.val() + 2.5).abs() < f32::EPSILON);
        assert_eq!(len.units(), LengthUnit::Em);
    }

    #[test]
    fn viewport_units_parse() {
        assert_eq!(Length::from_string("10vw", "", 0).units(), LengthUnit::Vw);
        assert_eq!(
            Length::from_string("10vmin", "", 0).units(),
            LengthUnit::Vmin
        );
        assert_eq!(
            Length::from_string("10vmax", "", 0).units(),
            LengthUnit::Vmax
        );
    }

    #[test]
    fn unknown_unit_falls_back_to_default() {
        let len = Length::from_string("10q", "", -1);
        assert!(len.is_predefined());
        assert_eq!(len.predef(), -1);
    }
}
