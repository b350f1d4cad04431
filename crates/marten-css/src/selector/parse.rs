//! Selector compilation from rule preludes.
//!
//! [§ 19 Grammar](https://www.w3.org/TR/selectors-4/#grammar)
//!
//! The prelude arrives as component values from the rule parser; commas
//! split the selector list, whitespace and `>`/`+`/`~` delimiters split
//! compound groups. A selector that fails to compile is dropped on its
//! own — the rest of the list stays usable.

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;

use super::{
    compile_tag, AttrOp, AttributeSelector, Combinator, CompoundSelector, PseudoClass,
    PseudoElement, Selector, Specificity, TagMatch,
};

/// Compile a selector list from a rule prelude. Invalid selectors are
/// skipped; the returned list may be empty.
#[must_use]
pub fn parse_selector_list(prelude: &[ComponentValue]) -> Vec<Selector> {
    prelude
        .split(|v| matches!(v, ComponentValue::Token(CssToken::Comma)))
        .filter_map(parse_complex_selector)
        .collect()
}

/// Running specificity counts while compiling one selector.
#[derive(Default)]
struct Counts {
    a: u32,
    b: u32,
    c: u32,
}

/// Compile one complex selector (compound groups + combinators).
fn parse_complex_selector(values: &[ComponentValue]) -> Option<Selector> {
    let mut parser = SelectorParser {
        values,
        position: 0,
        counts: Counts::default(),
        pseudo_element: None,
    };

    let mut parts = Vec::new();
    let _ = parser.skip_whitespace();
    let first = parser.parse_compound()?;
    parts.push((Combinator::Descendant, first));

    while let Some(combinator) = parser.parse_combinator() {
        let compound = parser.parse_compound()?;
        parts.push((combinator, compound));
    }

    let _ = parser.skip_whitespace();
    if parser.position < parser.values.len() {
        return None;
    }

    Some(Selector {
        parts,
        pseudo_element: parser.pseudo_element,
        specificity: Specificity::new(parser.counts.a, parser.counts.b, parser.counts.c),
    })
}

struct SelectorParser<'a> {
    values: &'a [ComponentValue],
    position: usize,
    counts: Counts,
    pseudo_element: Option<PseudoElement>,
}

impl SelectorParser<'_> {
    fn peek(&self) -> Option<&ComponentValue> {
        self.values.get(self.position)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(ComponentValue::is_whitespace) {
            self.position += 1;
            skipped = true;
        }
        skipped
    }

    /// Returns the combinator to the next compound, or `None` at the end
    /// of the selector.
    fn parse_combinator(&mut self) -> Option<Combinator> {
        let had_space = self.skip_whitespace();
        match self.peek() {
            Some(ComponentValue::Token(CssToken::Delim(c @ ('>' | '+' | '~')))) => {
                let combinator = match *c {
                    '>' => Combinator::Child,
                    '+' => Combinator::Adjacent,
                    _ => Combinator::GeneralSibling,
                };
                self.position += 1;
                let _ = self.skip_whitespace();
                Some(combinator)
            }
            Some(_) if had_space => Some(Combinator::Descendant),
            _ => None,
        }
    }

    /// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    fn parse_compound(&mut self) -> Option<CompoundSelector> {
        let mut compound = CompoundSelector::default();
        let mut any = false;

        loop {
            match self.peek() {
                // A type selector may only open the compound.
                Some(ComponentValue::Token(CssToken::Ident(name))) if !any => {
                    let tag = compile_tag(name);
                    if !matches!(tag, TagMatch::Any) {
                        self.counts.c += 1;
                    }
                    compound.tag = Some(tag);
                    self.position += 1;
                    any = true;
                }
                Some(ComponentValue::Token(CssToken::Delim('*'))) if !any => {
                    compound.tag = Some(TagMatch::Any);
                    self.position += 1;
                    any = true;
                }
                Some(ComponentValue::Token(CssToken::Hash { value, .. })) => {
                    compound.ids.push(value.clone());
                    self.counts.a += 1;
                    self.position += 1;
                    any = true;
                }
                Some(ComponentValue::Token(CssToken::Delim('.'))) => {
                    self.position += 1;
                    let Some(ComponentValue::Token(CssToken::Ident(class))) = self.peek() else {
                        return None;
                    };
                    compound.classes.push(class.clone());
                    self.counts.b += 1;
                    self.position += 1;
                    any = true;
                }
                Some(ComponentValue::Block { token: '[', value }) => {
                    let attr = parse_attribute(value)?;
                    compound.attrs.push(attr);
                    self.counts.b += 1;
                    self.position += 1;
                    any = true;
                }
                Some(ComponentValue::Token(CssToken::Colon)) => {
                    self.position += 1;
                    if matches!(self.peek(), Some(ComponentValue::Token(CssToken::Colon))) {
                        // `::name` — a pseudo-element.
                        self.position += 1;
                        self.parse_pseudo_element()?;
                        any = true;
                        continue;
                    }
                    // Legacy single-colon pseudo-element forms.
                    if let Some(ComponentValue::Token(CssToken::Ident(name))) = self.peek() {
                        let lower = name.to_ascii_lowercase();
                        if lower == "before" || lower == "after" {
                            self.parse_pseudo_element()?;
                            any = true;
                            continue;
                        }
                    }
                    let pseudo = self.parse_pseudo_class()?;
                    compound.pseudo_classes.push(pseudo);
                    self.counts.b += 1;
                    any = true;
                }
                _ => break,
            }
        }

        any.then_some(compound)
    }

    /// `::before` / `::after`; anything else invalidates the selector.
    fn parse_pseudo_element(&mut self) -> Option<()> {
        let Some(ComponentValue::Token(CssToken::Ident(name))) = self.peek() else {
            return None;
        };
        let pseudo = match name.to_ascii_lowercase().as_str() {
            "before" => PseudoElement::Before,
            "after" => PseudoElement::After,
            _ => return None,
        };
        self.pseudo_element = Some(pseudo);
        self.counts.c += 1;
        self.position += 1;
        Some(())
    }

    fn parse_pseudo_class(&mut self) -> Option<PseudoClass> {
        match self.peek() {
            Some(ComponentValue::Token(CssToken::Ident(name))) => {
                let lower = name.to_ascii_lowercase();
                self.position += 1;
                Some(match lower.as_str() {
                    "root" => PseudoClass::Root,
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "empty" => PseudoClass::Empty,
                    "link" => PseudoClass::Link,
                    "hover" => PseudoClass::Hover,
                    "active" => PseudoClass::Active,
                    "focus" => PseudoClass::Focus,
                    "disabled" => PseudoClass::Disabled,
                    "enabled" => PseudoClass::Enabled,
                    "checked" => PseudoClass::Checked,
                    // Recognized names the engine does not model; the
                    // selector parses but never matches.
                    "visited" | "first-of-type" | "last-of-type" | "only-of-type" | "target" => {
                        PseudoClass::NeverMatch
                    }
                    _ => return None,
                })
            }
            Some(ComponentValue::Function { name, value }) => {
                let lower = name.to_ascii_lowercase();
                let value = value.clone();
                self.position += 1;
                match lower.as_str() {
                    "nth-child" => {
                        let (a, b) = parse_nth(&value)?;
                        Some(PseudoClass::NthChild { a, b })
                    }
                    "not" => {
                        let inner = parse_not_argument(&value)?;
                        // ":not() adds the specificity of its argument."
                        self.counts.a += inner.1.a;
                        self.counts.b += inner.1.b;
                        self.counts.c += inner.1.c;
                        Some(PseudoClass::Not(Box::new(inner.0)))
                    }
                    "lang" => {
                        let lang = value.iter().find_map(|v| match v {
                            ComponentValue::Token(CssToken::Ident(s) | CssToken::String(s)) => {
                                Some(s.clone())
                            }
                            _ => None,
                        })?;
                        Some(PseudoClass::Lang(lang))
                    }
                    "nth-of-type" | "nth-last-child" | "nth-last-of-type" => {
                        Some(PseudoClass::NeverMatch)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Parse the inside of `[...]`.
fn parse_attribute(values: &[ComponentValue]) -> Option<AttributeSelector> {
    let values: Vec<&ComponentValue> = values.iter().filter(|v| !v.is_whitespace()).collect();
    let mut iter = values.into_iter();

    let name = match iter.next()? {
        ComponentValue::Token(CssToken::Ident(name)) => name.to_ascii_lowercase(),
        _ => return None,
    };

    let Some(first) = iter.next() else {
        return Some(AttributeSelector {
            name,
            op: AttrOp::Exists,
            value: String::new(),
        });
    };

    // `=` directly, or `~= |= ^= $= *=` as two delim tokens.
    let op = match first {
        ComponentValue::Token(CssToken::Delim('=')) => AttrOp::Equals,
        ComponentValue::Token(CssToken::Delim(c)) => {
            let op = match *c {
                '~' => AttrOp::Includes,
                '|' => AttrOp::DashMatch,
                '^' => AttrOp::Prefix,
                '$' => AttrOp::Suffix,
                '*' => AttrOp::Substring,
                _ => return None,
            };
            if !matches!(
                iter.next(),
                Some(ComponentValue::Token(CssToken::Delim('=')))
            ) {
                return None;
            }
            op
        }
        _ => return None,
    };

    let value = match iter.next()? {
        ComponentValue::Token(CssToken::Ident(s) | CssToken::String(s)) => s.clone(),
        ComponentValue::Token(CssToken::Number { value, .. }) => {
            let mut text = format!("{value}");
            if text.ends_with(".0") {
                text.truncate(text.len() - 2);
            }
            text
        }
        _ => return None,
    };

    if iter.next().is_some() {
        return None;
    }
    Some(AttributeSelector { name, op, value })
}

/// Compile the argument of `:not(...)`: a single compound selector.
/// Returns the compound and its specificity contribution.
fn parse_not_argument(values: &[ComponentValue]) -> Option<(CompoundSelector, Counts)> {
    let mut parser = SelectorParser {
        values,
        position: 0,
        counts: Counts::default(),
        pseudo_element: None,
    };
    let _ = parser.skip_whitespace();
    let compound = parser.parse_compound()?;
    let _ = parser.skip_whitespace();
    if parser.position < values.len() || parser.pseudo_element.is_some() {
        return None;
    }
    Some((compound, parser.counts))
}

/// [§ 4.12.3 The an+b notation](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// The tokenizer folds `an+b` text into dimension/number/ident tokens;
/// this reassembles `(a, b)` from the handful of shapes that produces.
fn parse_nth(values: &[ComponentValue]) -> Option<(i32, i32)> {
    let values: Vec<&ComponentValue> = values.iter().filter(|v| !v.is_whitespace()).collect();

    let int = |f: f32| -> i32 { f as i32 };

    match values.as_slice() {
        // odd / even / n / -n
        [ComponentValue::Token(CssToken::Ident(word))] => {
            match word.to_ascii_lowercase().as_str() {
                "odd" => Some((2, 1)),
                "even" => Some((2, 0)),
                other => parse_n_ident(other),
            }
        }
        // A bare integer: 0n+b.
        [ComponentValue::Token(CssToken::Number { value, .. })] => Some((0, int(*value))),
        // `<a>n` as one dimension token, unit "n" or "n-<b>".
        [ComponentValue::Token(CssToken::Dimension { value, unit })] => {
            parse_n_unit(unit, int(*value))
        }
        // `<a>n` followed by a signed integer b.
        [ComponentValue::Token(CssToken::Dimension { value, unit }), ComponentValue::Token(CssToken::Number { value: b, .. })] =>
        {
            if unit != "n" {
                return None;
            }
            Some((int(*value), int(*b)))
        }
        // `n+b` / `-n+b` (the sign of b is part of the number token).
        [ComponentValue::Token(CssToken::Ident(word)), ComponentValue::Token(CssToken::Number { value: b, .. })] =>
        {
            let a = match word.to_ascii_lowercase().as_str() {
                "n" => 1,
                "-n" => -1,
                _ => return None,
            };
            Some((a, int(*b)))
        }
        // `n + b` with an explicit sign delim: n '+' 3.
        [ComponentValue::Token(CssToken::Ident(word)), ComponentValue::Token(CssToken::Delim(sign @ ('+' | '-'))), ComponentValue::Token(CssToken::Number { value: b, .. })] =>
        {
            let a = match word.to_ascii_lowercase().as_str() {
                "n" => 1,
                "-n" => -1,
                _ => return None,
            };
            let b = int(*b);
            Some((a, if *sign == '-' { -b } else { b }))
        }
        [ComponentValue::Token(CssToken::Dimension { value, unit }), ComponentValue::Token(CssToken::Delim(sign @ ('+' | '-'))), ComponentValue::Token(CssToken::Number { value: b, .. })] =>
        {
            if unit != "n" {
                return None;
            }
            let b = int(*b);
            Some((int(*value), if *sign == '-' { -b } else { b }))
        }
        _ => None,
    }
}

/// `n`, `-n`, `n-3`, `-n-2` folded into a single ident token.
fn parse_n_ident(word: &str) -> Option<(i32, i32)> {
    let (a, rest) = if let Some(rest) = word.strip_prefix("-n") {
        (-1, rest)
    } else if let Some(rest) = word.strip_prefix('n') {
        (1, rest)
    } else {
        return None;
    };
    if rest.is_empty() {
        return Some((a, 0));
    }
    // Only a `-<digits>` suffix can be folded into the ident.
    let b: i32 = rest.strip_prefix('-')?.parse().ok()?;
    Some((a, -b))
}

/// A dimension token's unit of `n` or `n-<digits>`.
fn parse_n_unit(unit: &str, a: i32) -> Option<(i32, i32)> {
    if unit == "n" {
        return Some((a, 0));
    }
    let rest = unit.strip_prefix('n')?;
    let b: i32 = rest.strip_prefix('-')?.parse().ok()?;
    Some((a, -b))
}
