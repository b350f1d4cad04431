//! HTML tokenizer state machine.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! A permissive tokenizer over raw bytes. Input is decoded lazily through
//! [`marten_common::read_utf8_char`] (invalid bytes become U+FFFD), so the
//! machine is restartable at any byte boundary and lookahead is a saved
//! index, not a buffer copy.
//!
//! The state set is deliberately smaller than the WHATWG machine: the
//! markup-declaration, comment, DOCTYPE, CDATA, and raw-text states scan
//! to their terminator in one step instead of one state per character
//! class. Raw-text element bodies (`<script>`, `<style>`, ...) come out
//! as a single [`Token::RawText`].
//!
//! The tokenizer never fails; every malformed construct has a recovery
//! rule and truncated input ends with a clean [`Token::EndOfFile`].

use strum_macros::Display;

use marten_common::{read_utf8_char, text::is_html_space, warn_once};

use super::entities::{named_reference, numeric_reference};
use super::token::{Attribute, Token};

/// Tokenizer states. Each corresponds to a handler on [`HtmlTokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Plain document text; `&` and `<` are significant.
    Data,
    /// Just consumed `<`.
    TagOpen,
    /// Just consumed `</`.
    EndTagOpen,
    /// Accumulating a tag name.
    TagName,
    /// Between attributes.
    BeforeAttributeName,
    /// Accumulating an attribute name.
    AttributeName,
    /// After an attribute name, before `=` or the next attribute.
    AfterAttributeName,
    /// Just consumed `=`.
    BeforeAttributeValue,
    /// Inside a `"`-quoted value.
    AttributeValueDoubleQuoted,
    /// Inside a `'`-quoted value.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// After the closing quote of a value.
    AfterAttributeValueQuoted,
    /// Just consumed `/` inside a tag.
    SelfClosingStartTag,
    /// Just consumed `<!`; dispatches to comment, CDATA, or DOCTYPE.
    MarkupDeclaration,
    /// Inside `</` followed by a non-letter; consumed to `>`.
    BogusComment,
}

/// The tokenizer: input bytes, a cursor, and the token under construction.
pub struct HtmlTokenizer {
    state: TokenizerState,
    input: Vec<u8>,
    /// Byte cursor; always at a sequence boundary between reads.
    pos: usize,
    /// The current input character for the active handler.
    current: Option<char>,
    /// "Reconsume in the X state": the next loop iteration keeps the
    /// current character instead of reading a new one.
    reconsume: bool,
    /// True once the end-of-file token has been emitted.
    done: bool,
    current_tag: Option<Token>,
    current_attr: Option<Attribute>,
    tokens: Vec<Token>,
}

impl HtmlTokenizer {
    /// Create a tokenizer over a byte stream.
    #[must_use]
    pub fn new(input: &[u8]) -> Self {
        Self {
            state: TokenizerState::Data,
            input: input.to_vec(),
            pos: 0,
            current: None,
            reconsume: false,
            done: false,
            current_tag: None,
            current_attr: None,
            tokens: Vec::new(),
        }
    }

    /// Run the machine to completion.
    pub fn run(&mut self) {
        while !self.done {
            if self.reconsume {
                self.reconsume = false;
            } else {
                self.current = read_utf8_char(&self.input, &mut self.pos);
            }
            match self.state {
                TokenizerState::Data => self.handle_data(),
                TokenizerState::TagOpen => self.handle_tag_open(),
                TokenizerState::EndTagOpen => self.handle_end_tag_open(),
                TokenizerState::TagName => self.handle_tag_name(),
                TokenizerState::BeforeAttributeName => self.handle_before_attribute_name(),
                TokenizerState::AttributeName => self.handle_attribute_name(),
                TokenizerState::AfterAttributeName => self.handle_after_attribute_name(),
                TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value(),
                TokenizerState::AttributeValueDoubleQuoted => self.handle_attribute_value_quoted('"'),
                TokenizerState::AttributeValueSingleQuoted => self.handle_attribute_value_quoted('\''),
                TokenizerState::AttributeValueUnquoted => self.handle_attribute_value_unquoted(),
                TokenizerState::AfterAttributeValueQuoted => self.handle_after_attribute_value_quoted(),
                TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag(),
                TokenizerState::MarkupDeclaration => self.handle_markup_declaration(),
                TokenizerState::BogusComment => self.handle_bogus_comment(),
            }
        }
    }

    /// Consume the tokenizer and return the token stream.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn switch_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    fn reconsume_in(&mut self, state: TokenizerState) {
        self.reconsume = true;
        self.state = state;
    }

    fn emit(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn emit_eof(&mut self) {
        self.tokens.push(Token::EndOfFile);
        self.done = true;
    }

    fn log_parse_error(&self, what: &str) {
        warn_once("HTML", what);
    }

    // ===== Lookahead over raw bytes =====

    /// True if the bytes at the cursor match `pat` (ASCII,
    /// case-insensitive); consumes them on a match.
    fn eat_ascii_ci(&mut self, pat: &str) -> bool {
        let end = self.pos + pat.len();
        if end > self.input.len() {
            return false;
        }
        if self.input[self.pos..end].eq_ignore_ascii_case(pat.as_bytes()) {
            self.pos = end;
            return true;
        }
        false
    }

    /// Read one character without committing the cursor.
    fn peek_char(&self) -> Option<char> {
        let mut probe = self.pos;
        read_utf8_char(&self.input, &mut probe)
    }

    // ===== Character references =====

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Called with the cursor just past a `&`. Returns the decoded
    /// character and commits the cursor, or returns `None` and leaves the
    /// cursor untouched (the `&` stays literal).
    fn consume_character_reference(&mut self) -> Option<char> {
        let mut probe = self.pos;
        match read_utf8_char(&self.input, &mut probe) {
            Some('#') => self.consume_numeric_reference(),
            Some(c) if c.is_ascii_alphanumeric() => {
                let mut name = String::new();
                name.push(c);
                loop {
                    match read_utf8_char(&self.input, &mut probe) {
                        Some(';') => {
                            let decoded = named_reference(&name)?;
                            self.pos = probe;
                            return Some(decoded);
                        }
                        Some(c) if c.is_ascii_alphanumeric() && name.len() < 32 => name.push(c),
                        // No semicolon: leave everything in the text.
                        _ => return None,
                    }
                }
            }
            _ => None,
        }
    }

    /// `&#n;` / `&#xn;` forms. Cursor sits just past the `&`.
    fn consume_numeric_reference(&mut self) -> Option<char> {
        let mut probe = self.pos;
        if read_utf8_char(&self.input, &mut probe) != Some('#') {
            return None;
        }
        let mut hex = false;
        let mut digits = String::new();
        match read_utf8_char(&self.input, &mut probe) {
            Some('x' | 'X') => hex = true,
            Some(c) if c.is_ascii_digit() => digits.push(c),
            _ => return None,
        }
        loop {
            match read_utf8_char(&self.input, &mut probe) {
                Some(';') => {
                    let decoded = numeric_reference(&digits, hex)?;
                    self.pos = probe;
                    return Some(decoded);
                }
                Some(c) if (hex && c.is_ascii_hexdigit()) || (!hex && c.is_ascii_digit()) => {
                    digits.push(c);
                }
                _ => return None,
            }
        }
    }

    // ===== Per-character states =====

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data(&mut self) {
        match self.current {
            Some('&') => {
                if let Some(c) = self.consume_character_reference() {
                    self.emit(Token::Character { data: c });
                } else {
                    self.emit(Token::Character { data: '&' });
                }
            }
            Some('<') => self.switch_to(TokenizerState::TagOpen),
            Some(c) => self.emit(Token::Character { data: c }),
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open(&mut self) {
        match self.current {
            Some('!') => self.switch_to(TokenizerState::MarkupDeclaration),
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_tag = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "Anything else - emit a U+003C ... character token.
            // Reconsume in the data state."
            Some(_) => {
                self.log_parse_error("invalid first character of tag name");
                self.emit(Token::Character { data: '<' });
                self.reconsume_in(TokenizerState::Data);
            }
            None => {
                self.emit(Token::Character { data: '<' });
                self.emit_eof();
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open(&mut self) {
        match self.current {
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_tag = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            Some('>') => {
                self.log_parse_error("missing end tag name");
                self.switch_to(TokenizerState::Data);
            }
            Some(_) => {
                self.log_parse_error("invalid first character of end tag name");
                self.reconsume_in(TokenizerState::BogusComment);
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name(&mut self) {
        match self.current {
            Some(c) if is_html_space(c) => self.switch_to(TokenizerState::BeforeAttributeName),
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some(c) => {
                if let Some(Token::StartTag { name, .. } | Token::EndTag { name }) =
                    self.current_tag.as_mut()
                {
                    name.push(c.to_ascii_lowercase());
                }
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name(&mut self) {
        match self.current {
            Some(c) if is_html_space(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some(_) => {
                self.current_attr = Some(Attribute::new(String::new(), String::new()));
                self.reconsume_in(TokenizerState::AttributeName);
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name(&mut self) {
        match self.current {
            Some(c) if is_html_space(c) => self.switch_to(TokenizerState::AfterAttributeName),
            Some('/') => {
                self.finish_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => {
                self.finish_attribute();
                self.emit_current_tag();
            }
            Some(c) => {
                if let Some(attr) = self.current_attr.as_mut() {
                    attr.name.push(c.to_ascii_lowercase());
                }
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name(&mut self) {
        match self.current {
            Some(c) if is_html_space(c) => {}
            Some('/') => {
                self.finish_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => {
                self.finish_attribute();
                self.emit_current_tag();
            }
            Some(_) => {
                // A new, valueless attribute begins.
                self.finish_attribute();
                self.current_attr = Some(Attribute::new(String::new(), String::new()));
                self.reconsume_in(TokenizerState::AttributeName);
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value(&mut self) {
        match self.current {
            Some(c) if is_html_space(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            Some('>') => {
                self.log_parse_error("missing attribute value");
                self.finish_attribute();
                self.emit_current_tag();
            }
            Some(_) => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.36–37 Attribute value (quoted) states](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    fn handle_attribute_value_quoted(&mut self, quote: char) {
        match self.current {
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            Some('&') => {
                let c = self.consume_character_reference().unwrap_or('&');
                if let Some(attr) = self.current_attr.as_mut() {
                    attr.value.push(c);
                }
            }
            Some(c) => {
                if let Some(attr) = self.current_attr.as_mut() {
                    attr.value.push(c);
                }
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted(&mut self) {
        match self.current {
            Some(c) if is_html_space(c) => {
                self.finish_attribute();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => {
                let c = self.consume_character_reference().unwrap_or('&');
                if let Some(attr) = self.current_attr.as_mut() {
                    attr.value.push(c);
                }
            }
            Some('>') => {
                self.finish_attribute();
                self.emit_current_tag();
            }
            Some(c) => {
                if let Some(attr) = self.current_attr.as_mut() {
                    attr.value.push(c);
                }
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted(&mut self) {
        match self.current {
            Some(c) if is_html_space(c) => {
                self.finish_attribute();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => {
                self.finish_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') => {
                self.finish_attribute();
                self.emit_current_tag();
            }
            Some(_) => {
                self.log_parse_error("missing whitespace between attributes");
                self.finish_attribute();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            None => self.emit_eof(),
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag(&mut self) {
        match self.current {
            Some('>') => {
                if let Some(Token::StartTag { self_closing, .. }) = self.current_tag.as_mut() {
                    *self_closing = true;
                }
                self.emit_current_tag();
            }
            Some(_) => {
                self.log_parse_error("unexpected solidus in tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            None => self.emit_eof(),
        }
    }

    // ===== Scanning states =====

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "If the next few characters are: Two U+002D HYPHEN-MINUS
    /// characters — comment. ASCII case-insensitive match for the word
    /// 'DOCTYPE' — DOCTYPE. The string '[CDATA[' — CDATA section.
    /// Anything else — bogus comment."
    fn handle_markup_declaration(&mut self) {
        let current = self.current;
        match current {
            Some('-') if self.peek_char() == Some('-') => {
                let _ = self.eat_ascii_ci("-");
                self.scan_comment();
            }
            Some('d' | 'D') if self.eat_ascii_ci("octype") => self.scan_doctype(),
            Some('[') if self.eat_ascii_ci("CDATA[") => self.scan_cdata(),
            Some(_) => {
                self.log_parse_error("incorrectly opened comment");
                self.reconsume_in(TokenizerState::BogusComment);
            }
            None => self.emit_eof(),
        }
    }

    /// `<!-- ... -->`, scanned to the terminator in one step.
    fn scan_comment(&mut self) {
        let mut data = String::new();
        loop {
            match read_utf8_char(&self.input, &mut self.pos) {
                Some('-') if self.eat_ascii_ci("->") => break,
                Some(c) => data.push(c),
                None => {
                    self.log_parse_error("eof in comment");
                    break;
                }
            }
        }
        self.emit(Token::Comment { data });
        self.switch_to(TokenizerState::Data);
    }

    /// `<!DOCTYPE name ...>`. Only the name matters to this engine.
    fn scan_doctype(&mut self) {
        let mut name = String::new();
        let mut seen_name = false;
        loop {
            match read_utf8_char(&self.input, &mut self.pos) {
                Some('>') => break,
                Some(c) if is_html_space(c) => {
                    if seen_name {
                        // Public/system identifiers are skipped to `>`.
                        self.skip_to_close();
                        break;
                    }
                }
                Some(c) => {
                    seen_name = true;
                    name.push(c.to_ascii_lowercase());
                }
                None => {
                    self.log_parse_error("eof in doctype");
                    break;
                }
            }
        }
        self.emit(Token::Doctype {
            name: if name.is_empty() { None } else { Some(name) },
        });
        self.switch_to(TokenizerState::Data);
    }

    /// `<![CDATA[ ... ]]>`, kept verbatim.
    fn scan_cdata(&mut self) {
        let mut data = String::new();
        loop {
            match read_utf8_char(&self.input, &mut self.pos) {
                Some(']') if self.eat_ascii_ci("]>") => break,
                Some(c) => data.push(c),
                None => {
                    self.log_parse_error("eof in cdata section");
                    break;
                }
            }
        }
        self.emit(Token::Cdata { data });
        self.switch_to(TokenizerState::Data);
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment(&mut self) {
        let mut data = String::new();
        if let Some(c) = self.current {
            if c != '>' {
                data.push(c);
                self.skip_to_close_collecting(&mut data);
            }
        }
        self.emit(Token::Comment { data });
        if self.current.is_none() {
            self.emit_eof();
        } else {
            self.switch_to(TokenizerState::Data);
        }
    }

    fn skip_to_close(&mut self) {
        loop {
            match read_utf8_char(&self.input, &mut self.pos) {
                Some('>') | None => break,
                Some(_) => {}
            }
        }
    }

    fn skip_to_close_collecting(&mut self, data: &mut String) {
        loop {
            match read_utf8_char(&self.input, &mut self.pos) {
                Some('>') => break,
                Some(c) => data.push(c),
                None => {
                    self.current = None;
                    break;
                }
            }
        }
    }

    // ===== Tag emission and raw text =====

    fn finish_attribute(&mut self) {
        let Some(attr) = self.current_attr.take() else {
            return;
        };
        if attr.name.is_empty() {
            return;
        }
        if let Some(Token::StartTag { attributes, .. }) = self.current_tag.as_mut() {
            attributes.push(attr);
        }
        // Attributes on end tags are a parse error; drop them.
    }

    /// Emit the tag under construction. A start tag naming a raw-text
    /// element switches into the raw-text scan before returning to data.
    fn emit_current_tag(&mut self) {
        self.finish_attribute();
        let Some(tag) = self.current_tag.take() else {
            self.switch_to(TokenizerState::Data);
            return;
        };

        let raw_text = match &tag {
            Token::StartTag {
                name,
                self_closing: false,
                ..
            } => match name.as_str() {
                "script" | "style" | "xmp" => Some((name.clone(), false)),
                // RCDATA: character references still decode.
                "title" | "textarea" => Some((name.clone(), true)),
                _ => None,
            },
            _ => None,
        };

        self.emit(tag);
        self.switch_to(TokenizerState::Data);

        if let Some((name, decode_refs)) = raw_text {
            self.scan_raw_text(&name, decode_refs);
        }
    }

    /// Consume raw element content up to the matching `</name` end tag.
    ///
    /// "The text in script and style elements must all be emitted as one
    /// text token." Truncated input emits whatever was collected; the
    /// end tag is then synthesized by the tree builder's EOF handling.
    fn scan_raw_text(&mut self, name: &str, decode_refs: bool) {
        let mut data = String::new();
        let closed = loop {
            match read_utf8_char(&self.input, &mut self.pos) {
                Some('<') => {
                    let mut probe = self.pos;
                    if read_utf8_char(&self.input, &mut probe) == Some('/') {
                        let end = probe + name.len();
                        let name_matches = end <= self.input.len()
                            && self.input[probe..end].eq_ignore_ascii_case(name.as_bytes());
                        let mut after = end;
                        let next = read_utf8_char(&self.input, &mut after);
                        if name_matches
                            && (next.is_none() || matches!(next, Some(c) if is_html_space(c) || c == '>' || c == '/'))
                        {
                            // Consume through the closing `>`.
                            self.pos = end;
                            self.skip_to_close();
                            break true;
                        }
                    }
                    data.push('<');
                }
                Some('&') if decode_refs => {
                    let c = self.consume_character_reference().unwrap_or('&');
                    data.push(c);
                }
                Some(c) => data.push(c),
                None => break false,
            }
        };

        self.emit(Token::RawText { data });
        if closed {
            self.emit(Token::EndTag {
                name: name.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut tokenizer = HtmlTokenizer::new(input.as_bytes());
        tokenizer.run();
        tokenizer.into_tokens()
    }

    fn text_of(tokens: &[Token]) -> String {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Character { data } => Some(*data),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plain_text() {
        let tokens = tokenize("ab");
        assert_eq!(
            tokens,
            vec![
                Token::Character { data: 'a' },
                Token::Character { data: 'b' },
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn simple_tag_with_attributes() {
        let tokens = tokenize(r#"<a href="x" CLASS='y' checked>"#);
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "a".to_string(),
                self_closing: false,
                attributes: vec![
                    Attribute::new("href".to_string(), "x".to_string()),
                    Attribute::new("class".to_string(), "y".to_string()),
                    Attribute::new("checked".to_string(), String::new()),
                ],
            }
        );
    }

    #[test]
    fn unquoted_attribute_value() {
        let tokens = tokenize("<img width=100 height=50>");
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "img".to_string(),
                self_closing: false,
                attributes: vec![
                    Attribute::new("width".to_string(), "100".to_string()),
                    Attribute::new("height".to_string(), "50".to_string()),
                ],
            }
        );
    }

    #[test]
    fn self_closing_flag() {
        let tokens = tokenize("<br/>");
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "br".to_string(),
                self_closing: true,
                attributes: vec![],
            }
        );
    }

    #[test]
    fn end_tag_lowercased() {
        let tokens = tokenize("</DIV>");
        assert_eq!(
            tokens[0],
            Token::EndTag {
                name: "div".to_string()
            }
        );
    }

    #[test]
    fn character_references_in_data() {
        assert_eq!(text_of(&tokenize("a &amp; b")), "a & b");
        assert_eq!(text_of(&tokenize("&#65;&#x42;")), "AB");
        // Unknown or unterminated stays literal.
        assert_eq!(text_of(&tokenize("a &bogus; &amp b")), "a &bogus; &amp b");
    }

    #[test]
    fn character_reference_in_attribute() {
        let tokens = tokenize(r#"<a title="x &amp; y">"#);
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "a".to_string(),
                self_closing: false,
                attributes: vec![Attribute::new("title".to_string(), "x & y".to_string())],
            }
        );
    }

    #[test]
    fn comment_token() {
        let tokens = tokenize("<!-- hi -->x");
        assert_eq!(
            tokens[0],
            Token::Comment {
                data: " hi ".to_string()
            }
        );
        assert_eq!(tokens[1], Token::Character { data: 'x' });
    }

    #[test]
    fn doctype_name() {
        let tokens = tokenize("<!DOCTYPE html>");
        assert_eq!(
            tokens[0],
            Token::Doctype {
                name: Some("html".to_string())
            }
        );
    }

    #[test]
    fn cdata_section() {
        let tokens = tokenize("<![CDATA[1 < 2]]>");
        assert_eq!(
            tokens[0],
            Token::Cdata {
                data: "1 < 2".to_string()
            }
        );
    }

    #[test]
    fn script_body_is_single_raw_text() {
        let tokens = tokenize("<script>if (a < b) { x(\"</div>\"); }</script>");
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "script".to_string(),
                self_closing: false,
                attributes: vec![],
            }
        );
        assert_eq!(
            tokens[1],
            Token::RawText {
                data: "if (a < b) { x(\"</div>\"); }".to_string()
            }
        );
        assert_eq!(
            tokens[2],
            Token::EndTag {
                name: "script".to_string()
            }
        );
    }

    #[test]
    fn style_body_keeps_selectors_raw() {
        let tokens = tokenize("<style>p > a { color: red }</style>");
        assert_eq!(
            tokens[1],
            Token::RawText {
                data: "p > a { color: red }".to_string()
            }
        );
    }

    #[test]
    fn unterminated_script_is_recovered() {
        let tokens = tokenize("<script>var x = 1;");
        assert_eq!(
            tokens[1],
            Token::RawText {
                data: "var x = 1;".to_string()
            }
        );
        assert_eq!(*tokens.last().unwrap(), Token::EndOfFile);
    }

    #[test]
    fn stray_less_than_is_text() {
        assert_eq!(text_of(&tokenize("1 < 2")), "1 < 2");
    }

    #[test]
    fn bogus_comment_from_bad_end_tag() {
        let tokens = tokenize("</ x>y");
        assert_eq!(
            tokens[0],
            Token::Comment {
                data: " x".to_string()
            }
        );
        assert_eq!(tokens[1], Token::Character { data: 'y' });
    }
}
