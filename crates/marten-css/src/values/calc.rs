//! `calc()` expression trees.
//!
//! [§ 10 Mathematical Expressions](https://www.w3.org/TR/css-values-4/#calc-func)
//!
//! "The calc() function allows mathematical expressions with addition
//! (+), subtraction (-), multiplication (*), and division (/)."
//!
//! Unit rules enforced at parse time: lengths add and subtract with
//! lengths; multiplication takes exactly one number operand; division
//! takes a number divisor. The tree stays unevaluated until unit
//! resolution supplies a leaf resolver (em, %, viewport units all need
//! context the parser does not have).

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;
use crate::values::length::{Length, LengthUnit};

/// A parsed `calc()` expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CalcExpr {
    /// A length, percentage, or number operand.
    Leaf(Length),
    /// `a + b`
    Add(Box<CalcExpr>, Box<CalcExpr>),
    /// `a - b`
    Sub(Box<CalcExpr>, Box<CalcExpr>),
    /// `a * n` (the number side is already folded out).
    Mul(Box<CalcExpr>, f32),
    /// `a / n`
    Div(Box<CalcExpr>, f32),
}

impl CalcExpr {
    /// Parse the contents of a `calc(...)` function.
    #[must_use]
    pub fn parse(values: &[ComponentValue]) -> Option<Self> {
        let mut parser = CalcParser {
            values,
            position: 0,
        };
        let expr = parser.parse_sum()?;
        parser.skip_whitespace();
        if parser.position == values.len() {
            Some(expr)
        } else {
            None
        }
    }

    /// Evaluate the tree, resolving each leaf through `resolve` (which
    /// supplies font, viewport, and percentage context).
    pub fn evaluate(&self, resolve: &dyn Fn(&Length) -> f32) -> f32 {
        match self {
            Self::Leaf(length) => resolve(length),
            Self::Add(l, r) => l.evaluate(resolve) + r.evaluate(resolve),
            Self::Sub(l, r) => l.evaluate(resolve) - r.evaluate(resolve),
            Self::Mul(e, n) => e.evaluate(resolve) * n,
            // Division by zero makes the expression invalid at parse
            // time per spec; a zero that appears anyway resolves to 0.
            Self::Div(e, n) => {
                if *n == 0.0 {
                    0.0
                } else {
                    e.evaluate(resolve) / n
                }
            }
        }
    }

    /// True if the tree contains no percentage leaves (it can then be
    /// resolved without a referent).
    #[must_use]
    pub fn is_percentage_free(&self) -> bool {
        match self {
            Self::Leaf(length) => !length.is_percent(),
            Self::Add(l, r) | Self::Sub(l, r) => l.is_percentage_free() && r.is_percentage_free(),
            Self::Mul(e, _) | Self::Div(e, _) => e.is_percentage_free(),
        }
    }
}

struct CalcParser<'a> {
    values: &'a [ComponentValue],
    position: usize,
}

impl CalcParser<'_> {
    fn skip_whitespace(&mut self) {
        while matches!(
            self.values.get(self.position),
            Some(ComponentValue::Token(CssToken::Whitespace))
        ) {
            self.position += 1;
        }
    }

    fn peek_delim(&mut self) -> Option<char> {
        self.skip_whitespace();
        match self.values.get(self.position) {
            Some(ComponentValue::Token(CssToken::Delim(c))) => Some(*c),
            _ => None,
        }
    }

    /// `sum := product [ ['+'|'-'] product ]*`
    fn parse_sum(&mut self) -> Option<CalcExpr> {
        let mut left = self.parse_product()?;
        while let Some(op @ ('+' | '-')) = self.peek_delim() {
            self.position += 1;
            let right = self.parse_product()?;
            left = if op == '+' {
                CalcExpr::Add(Box::new(left), Box::new(right))
            } else {
                CalcExpr::Sub(Box::new(left), Box::new(right))
            };
        }
        Some(left)
    }

    /// `product := term [ ['*'|'/'] term ]*`
    ///
    /// "At a * one of the operands must be a number; at a / the right
    /// side must be a number."
    fn parse_product(&mut self) -> Option<CalcExpr> {
        let mut left = self.parse_term()?;
        while let Some(op @ ('*' | '/')) = self.peek_delim() {
            self.position += 1;
            let right = self.parse_term()?;
            left = match op {
                '*' => match (number_of(&left), number_of(&right)) {
                    (_, Some(n)) => CalcExpr::Mul(Box::new(left), n),
                    (Some(n), None) => CalcExpr::Mul(Box::new(right), n),
                    (None, None) => return None,
                },
                _ => {
                    let divisor = number_of(&right)?;
                    if divisor == 0.0 {
                        return None;
                    }
                    CalcExpr::Div(Box::new(left), divisor)
                }
            };
        }
        Some(left)
    }

    /// `term := length | percentage | number | '(' sum ')' | calc(...)`
    fn parse_term(&mut self) -> Option<CalcExpr> {
        self.skip_whitespace();
        let value = self.values.get(self.position)?;
        match value {
            ComponentValue::Token(
                CssToken::Dimension { .. } | CssToken::Percentage(_) | CssToken::Number { .. },
            ) => {
                let length = Length::from_component(value, "", 0)?;
                self.position += 1;
                Some(CalcExpr::Leaf(length))
            }
            ComponentValue::Block { token: '(', value } => {
                self.position += 1;
                CalcExpr::parse(value)
            }
            ComponentValue::Function { name, value } if name == "calc" => {
                self.position += 1;
                CalcExpr::parse(value)
            }
            _ => None,
        }
    }
}

/// The numeric value of a bare-number leaf, if that is what `expr` is.
fn number_of(expr: &CalcExpr) -> Option<f32> {
    match expr {
        CalcExpr::Leaf(Length::Value {
            value,
            unit: LengthUnit::None,
        }) => Some(*value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_component_values;

    fn parse_calc(body: &str) -> Option<CalcExpr> {
        CalcExpr::parse(&parse_component_values(body))
    }

    fn resolve_px(length: &Length) -> f32 {
        // px and bare numbers pass through; em = 16px; % of 200.
        match length.units() {
            LengthUnit::Em => length.val() * 16.0,
            LengthUnit::Percent => length.val() * 200.0 / 100.0,
            _ => length.val(),
        }
    }

    #[test]
    fn addition_of_lengths() {
        let expr = parse_calc("10px + 2em").expect("parse");
        assert!((expr.evaluate(&resolve_px) - 42.0).abs() < f32::EPSILON);
    }

    #[test]
    fn subtraction_with_percentage() {
        let expr = parse_calc("100% - 20px").expect("parse");
        assert!((expr.evaluate(&resolve_px) - 180.0).abs() < f32::EPSILON);
        assert!(!expr.is_percentage_free());
    }

    #[test]
    fn multiplication_requires_number() {
        let expr = parse_calc("2 * 10px").expect("parse");
        assert!((expr.evaluate(&resolve_px) - 20.0).abs() < f32::EPSILON);
        assert!(parse_calc("10px * 2px").is_none());
    }

    #[test]
    fn division_by_number_only() {
        let expr = parse_calc("10px / 4").expect("parse");
        assert!((expr.evaluate(&resolve_px) - 2.5).abs() < f32::EPSILON);
        assert!(parse_calc("10 / 2px").is_none());
        assert!(parse_calc("10px / 0").is_none());
    }

    #[test]
    fn nested_parentheses() {
        let expr = parse_calc("(10px + 10px) * 3").expect("parse");
        assert!((expr.evaluate(&resolve_px) - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn trailing_garbage_rejected() {
        assert!(parse_calc("10px 20px").is_none());
    }
}
