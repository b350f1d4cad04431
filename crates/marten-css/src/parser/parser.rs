//! CSS rule and declaration parsing.
//!
//! [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//!
//! "The input to the parsing stage is a stream of tokens from the
//! tokenization stage." Tokens are first grouped into component values
//! (preserved tokens, functions, and simple blocks), then rules are cut
//! from the component-value stream: an at-keyword opens an at-rule,
//! anything else opens a qualified rule whose prelude is a selector list.
//!
//! Error recovery follows CSS Syntax: a rule whose selectors all fail to
//! compile is dropped with its block; an invalid declaration is dropped
//! individually; unknown at-rules are consumed and discarded.

use core::fmt;

use marten_common::warn_once;

use crate::media::MediaQueryList;
use crate::properties::PropertyId;
use crate::selector::{parse_selector_list, Selector};
use crate::tokenizer::{CssToken, CssTokenizer};

use super::shorthand::expand_declaration;

/// [§ 5.3.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-a-component-value)
///
/// A component value in a prelude or declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A preserved token.
    Token(CssToken),
    /// A function with its contents.
    Function {
        /// The function name, lowercased.
        name: String,
        /// The function arguments.
        value: Vec<ComponentValue>,
    },
    /// A simple block.
    Block {
        /// The opening token character (`{`, `[`, or `(`).
        token: char,
        /// The block contents.
        value: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    /// True for a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Token(CssToken::Whitespace))
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{token}"),
            Self::Function { name, value } => {
                write!(f, "{name}(")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Self::Block { token, value } => {
                let (open, close) = match token {
                    '[' => ('[', ']'),
                    '(' => ('(', ')'),
                    _ => ('{', '}'),
                };
                write!(f, "{open}")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                write!(f, "{close}")
            }
        }
    }
}

/// [§ 5.4.4 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-a-declaration)
///
/// A longhand declaration after shorthand expansion: interned property
/// id, component values, and the `!important` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The interned property.
    pub property: PropertyId,
    /// The property value as component values.
    pub value: Vec<ComponentValue>,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-a-qualified-rule)
///
/// A style rule: compiled selectors plus expanded declarations.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// The compiled selector list (invalid selectors already dropped).
    pub selectors: Vec<Selector>,
    /// The declarations in this rule block.
    pub declarations: Vec<Declaration>,
}

/// `@media <query-list> { <rules> }`
#[derive(Debug, Clone)]
pub struct MediaRule {
    /// The media query list guarding the nested rules.
    pub query: MediaQueryList,
    /// The nested rules.
    pub rules: Vec<Rule>,
}

/// `@import <url> <query-list>?;` — fetched by the engine through the
/// container, then spliced in place.
#[derive(Debug, Clone)]
pub struct ImportRule {
    /// The stylesheet URL.
    pub url: String,
    /// An optional media query guarding the import.
    pub query: Option<MediaQueryList>,
}

/// `@font-face { <descriptors> }` — stored raw; only the font resolver
/// reads the descriptors.
#[derive(Debug, Clone)]
pub struct FontFaceRule {
    /// Raw `(descriptor, value)` pairs.
    pub descriptors: Vec<(String, Vec<ComponentValue>)>,
}

/// `@page { ... }` — preserved but not consumed by the rendering core.
#[derive(Debug, Clone)]
pub struct PageRule {
    /// The page declarations, kept for hosts that paginate.
    pub declarations: Vec<Declaration>,
}

/// [§ 5.3.3 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
#[derive(Debug, Clone)]
pub enum Rule {
    /// A style (qualified) rule.
    Style(StyleRule),
    /// An `@media` rule.
    Media(MediaRule),
    /// An `@import` rule.
    Import(ImportRule),
    /// An `@font-face` rule.
    FontFace(FontFaceRule),
    /// An `@page` rule.
    Page(PageRule),
}

/// [§ 5.3.2 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    /// The rules in source order.
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Parse a stylesheet from CSS text. Never fails; unparseable
    /// constructs are dropped per the recovery rules.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut tokenizer = CssTokenizer::new(text);
        tokenizer.run();
        let mut parser = CssParser::new(tokenizer.into_tokens());
        parser.parse_stylesheet()
    }
}

/// The rule parser over a token stream.
pub struct CssParser {
    tokens: Vec<CssToken>,
    position: usize,
}

impl CssParser {
    /// Create a parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<CssToken>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// [§ 5.3.2 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        let values = self.consume_component_values();
        Stylesheet {
            rules: parse_rules(&values),
        }
    }

    /// Group the remaining tokens into component values, nesting blocks
    /// and functions.
    fn consume_component_values(&mut self) -> Vec<ComponentValue> {
        let mut out = Vec::new();
        while let Some(value) = self.consume_component_value(None) {
            out.push(value);
        }
        out
    }

    /// [§ 5.3.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-a-component-value)
    fn consume_component_value(&mut self, closing: Option<&CssToken>) -> Option<ComponentValue> {
        let token = self.tokens.get(self.position)?.clone();
        if token == CssToken::Eof {
            return None;
        }
        if let Some(close) = closing {
            if token == *close {
                return None;
            }
        }
        self.position += 1;

        if let Some(close) = token.closing_pair() {
            let mut value = Vec::new();
            while let Some(inner) = self.consume_component_value(Some(&close)) {
                value.push(inner);
            }
            // Consume the closing token if present (EOF closes all
            // open blocks).
            if self.tokens.get(self.position) == Some(&close) {
                self.position += 1;
            }
            return Some(match token {
                CssToken::Function(name) => ComponentValue::Function { name, value },
                CssToken::LeftBracket => ComponentValue::Block { token: '[', value },
                CssToken::LeftParen => ComponentValue::Block { token: '(', value },
                _ => ComponentValue::Block { token: '{', value },
            });
        }
        Some(ComponentValue::Token(token))
    }
}

/// Parse rules from a component-value stream (the whole sheet, or the
/// inside of an `@media` block).
fn parse_rules(values: &[ComponentValue]) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut position = 0;

    while position < values.len() {
        match &values[position] {
            v if v.is_whitespace() => position += 1,
            // "<CDO-token>, <CDC-token>: do nothing."
            ComponentValue::Token(CssToken::Cdo | CssToken::Cdc) => position += 1,
            ComponentValue::Token(CssToken::AtKeyword(name)) => {
                position += 1;
                let (rule, next) = parse_at_rule(name, values, position);
                if let Some(rule) = rule {
                    rules.push(rule);
                }
                position = next;
            }
            _ => {
                let (rule, next) = parse_qualified_rule(values, position);
                if let Some(rule) = rule {
                    rules.push(rule);
                }
                position = next;
            }
        }
    }
    rules
}

/// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-an-at-rule)
fn parse_at_rule(
    name: &str,
    values: &[ComponentValue],
    mut position: usize,
) -> (Option<Rule>, usize) {
    let prelude_start = position;
    while position < values.len() {
        match &values[position] {
            ComponentValue::Token(CssToken::Semicolon) => {
                let prelude = &values[prelude_start..position];
                return (parse_statement_at_rule(name, prelude), position + 1);
            }
            ComponentValue::Block { token: '{', value } => {
                let prelude = &values[prelude_start..position];
                return (parse_block_at_rule(name, prelude, value), position + 1);
            }
            _ => position += 1,
        }
    }
    let prelude = &values[prelude_start..];
    (parse_statement_at_rule(name, prelude), values.len())
}

/// At-rules terminated by `;` — only `@import` among the supported set.
fn parse_statement_at_rule(name: &str, prelude: &[ComponentValue]) -> Option<Rule> {
    if name != "import" {
        warn_once("CSS", &format!("unsupported at-rule '@{name}' dropped"));
        return None;
    }
    let mut url = None;
    let mut rest = prelude.len();
    for (index, value) in prelude.iter().enumerate() {
        if value.is_whitespace() {
            continue;
        }
        url = match value {
            ComponentValue::Token(CssToken::Url(u) | CssToken::String(u)) => Some(u.clone()),
            ComponentValue::Function { name, value } if name == "url" => {
                value.iter().find_map(|v| match v {
                    ComponentValue::Token(CssToken::String(u)) => Some(u.clone()),
                    _ => None,
                })
            }
            _ => None,
        };
        rest = index + 1;
        break;
    }
    let url = url?;
    let media = &prelude[rest..];
    let query = if media.iter().all(ComponentValue::is_whitespace) {
        None
    } else {
        Some(MediaQueryList::parse(media))
    };
    Some(Rule::Import(ImportRule { url, query }))
}

/// At-rules with a `{}` block: `@media`, `@font-face`, `@page`.
fn parse_block_at_rule(
    name: &str,
    prelude: &[ComponentValue],
    block: &[ComponentValue],
) -> Option<Rule> {
    match name {
        "media" => Some(Rule::Media(MediaRule {
            query: MediaQueryList::parse(prelude),
            rules: parse_rules(block),
        })),
        "font-face" => Some(Rule::FontFace(FontFaceRule {
            descriptors: parse_raw_declarations(block),
        })),
        "page" => Some(Rule::Page(PageRule {
            declarations: parse_declarations(block),
        })),
        _ => {
            warn_once("CSS", &format!("unsupported at-rule '@{name}' dropped"));
            None
        }
    }
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-a-qualified-rule)
fn parse_qualified_rule(values: &[ComponentValue], mut position: usize) -> (Option<Rule>, usize) {
    let prelude_start = position;
    while position < values.len() {
        if let ComponentValue::Block { token: '{', value } = &values[position] {
            let prelude = &values[prelude_start..position];
            let selectors = parse_selector_list(prelude);
            if selectors.is_empty() {
                // "Bad selectors are skipped with their declaration
                // block intact but unreachable."
                warn_once("CSS", "rule with no valid selectors dropped");
                return (None, position + 1);
            }
            let declarations = parse_declarations(value);
            return (
                Some(Rule::Style(StyleRule {
                    selectors,
                    declarations,
                })),
                position + 1,
            );
        }
        position += 1;
    }
    // "EOF: This is a parse error. Return nothing."
    (None, values.len())
}

/// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-a-list-of-declarations)
///
/// Splits a block on top-level semicolons, interns each property name,
/// and expands shorthands. Invalid declarations are dropped one by one.
fn parse_declarations(block: &[ComponentValue]) -> Vec<Declaration> {
    let mut out = Vec::new();
    for (name, value, important) in split_declarations(block) {
        let before = out.len();
        expand_declaration(&name, &value, important, &mut out);
        if out.len() == before {
            warn_once("CSS", &format!("unknown or invalid property '{name}' dropped"));
        }
    }
    out
}

/// Raw `(name, value)` pairs, for `@font-face` descriptors.
fn parse_raw_declarations(block: &[ComponentValue]) -> Vec<(String, Vec<ComponentValue>)> {
    split_declarations(block)
        .into_iter()
        .map(|(name, value, _)| (name, value))
        .collect()
}

/// Cut `name : value [!important]` segments at top-level semicolons.
fn split_declarations(block: &[ComponentValue]) -> Vec<(String, Vec<ComponentValue>, bool)> {
    let mut out = Vec::new();
    for segment in block.split(|v| matches!(v, ComponentValue::Token(CssToken::Semicolon))) {
        // `name`, optional whitespace, `:` — whitespace inside the value
        // stays significant.
        let mut position = 0;
        while segment.get(position).is_some_and(ComponentValue::is_whitespace) {
            position += 1;
        }
        let Some(ComponentValue::Token(CssToken::Ident(name))) = segment.get(position) else {
            continue;
        };
        position += 1;
        while segment.get(position).is_some_and(ComponentValue::is_whitespace) {
            position += 1;
        }
        if !matches!(
            segment.get(position),
            Some(ComponentValue::Token(CssToken::Colon))
        ) {
            continue;
        }
        position += 1;
        let mut value: Vec<ComponentValue> = segment[position..].to_vec();

        // Trim surrounding whitespace.
        while value.first().is_some_and(ComponentValue::is_whitespace) {
            let _ = value.remove(0);
        }
        while value.last().is_some_and(ComponentValue::is_whitespace) {
            let _ = value.pop();
        }

        // "If the last two non-whitespace tokens are '!' and 'important',
        // remove them and set the important flag."
        let mut important = false;
        if value.len() >= 2 {
            let is_important = matches!(
                &value[value.len() - 1],
                ComponentValue::Token(CssToken::Ident(word)) if word.eq_ignore_ascii_case("important")
            ) && matches!(
                &value[value.len() - 2],
                ComponentValue::Token(CssToken::Delim('!'))
            );
            if is_important {
                important = true;
                value.truncate(value.len() - 2);
                while value.last().is_some_and(ComponentValue::is_whitespace) {
                    let _ = value.pop();
                }
            }
        }

        out.push((name.to_ascii_lowercase(), value, important));
    }
    out
}

/// Tokenize free-standing CSS text into component values. Used for
/// `style="..."` attributes and value-level tests.
#[must_use]
pub fn parse_component_values(text: &str) -> Vec<ComponentValue> {
    let mut tokenizer = CssTokenizer::new(text);
    tokenizer.run();
    let mut parser = CssParser::new(tokenizer.into_tokens());
    parser.consume_component_values()
}

/// Parse a bare declaration block (the contents of a `style` attribute).
#[must_use]
pub fn parse_declaration_block(text: &str) -> Vec<Declaration> {
    parse_declarations(&parse_component_values(text))
}
