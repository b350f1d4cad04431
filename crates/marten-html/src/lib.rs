//! Permissive HTML tokenizer and tree constructor for the Marten engine.
//!
//! # Scope
//!
//! - **Tokenizer** ([§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   — a reduced, never-failing state machine over raw bytes with
//!   character-reference decoding and single-token raw-text bodies.
//! - **Tree constructor** ([§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   — implicit document structure, auto-closing rules, table fostering,
//!   generic handling of unknown tags.
//! - **Serializer** — HTML text back out, parse-stable for trees this
//!   parser produced.
//!
//! Malformed input never fails: every recovery path produces a tree.

mod entities;
mod parser;
mod serializer;
mod token;
mod tokenizer;

pub use parser::{HtmlParser, ParseIssue};
pub use serializer::serialize;
pub use token::{Attribute, Token};
pub use tokenizer::{HtmlTokenizer, TokenizerState};

use marten_dom::DomTree;

/// Parse an HTML byte stream into a DOM tree.
///
/// Convenience wrapper over [`HtmlTokenizer`] + [`HtmlParser`]. Invalid
/// UTF-8 decodes to U+FFFD; malformed markup is recovered per the parser
/// rules. This function cannot fail.
#[must_use]
pub fn parse_document(input: &[u8]) -> DomTree {
    let mut tokenizer = HtmlTokenizer::new(input);
    tokenizer.run();
    HtmlParser::new(tokenizer.into_tokens()).run()
}
