//! CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "Implementations must act as if they used the following algorithms to
//! tokenize CSS." Comments are consumed and discarded; escape sequences
//! (`\` followed by hex digits or any code point) are resolved into the
//! token values; the tokenizer never fails — unterminated constructs
//! produce `BadString`/`BadUrl` tokens and the parser skips them.

use super::token::{CssToken, HashType, NumericType};

/// The tokenizer: a character cursor over the stylesheet text.
pub struct CssTokenizer {
    input: Vec<char>,
    pos: usize,
    tokens: Vec<CssToken>,
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
const fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    matches!(first, Some('\\')) && !matches!(second, Some('\n') | None)
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

const fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

impl CssTokenizer {
    /// Create a tokenizer over stylesheet text.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Run the tokenizer to completion.
    pub fn run(&mut self) {
        loop {
            let token = self.consume_token();
            let done = token == CssToken::Eof;
            self.tokens.push(token);
            if done {
                break;
            }
        }
    }

    /// Consume the tokenizer and return the token stream.
    #[must_use]
    pub fn into_tokens(self) -> Vec<CssToken> {
        self.tokens
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.input.get(self.pos + ahead).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        Some(c)
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> CssToken {
        self.consume_comments();

        let Some(c) = self.advance() else {
            return CssToken::Eof;
        };

        match c {
            c if is_css_whitespace(c) => {
                while matches!(self.peek(0), Some(c) if is_css_whitespace(c)) {
                    let _ = self.advance();
                }
                CssToken::Whitespace
            }
            '"' | '\'' => self.consume_string(c),
            '#' => {
                // "If the next input code point is an ident code point or
                // the next two are a valid escape, consume an ident
                // sequence" — otherwise it is a delim token.
                if matches!(self.peek(0), Some(c) if is_ident_char(c))
                    || is_valid_escape(self.peek(0), self.peek(1))
                {
                    let hash_type = if self.would_start_ident() {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    let value = self.consume_ident_sequence();
                    CssToken::Hash { value, hash_type }
                } else {
                    CssToken::Delim('#')
                }
            }
            '(' => CssToken::LeftParen,
            ')' => CssToken::RightParen,
            '[' => CssToken::LeftBracket,
            ']' => CssToken::RightBracket,
            '{' => CssToken::LeftBrace,
            '}' => CssToken::RightBrace,
            ',' => CssToken::Comma,
            ':' => CssToken::Colon,
            ';' => CssToken::Semicolon,
            '+' | '.' => {
                if self.starts_number(Some(c)) {
                    self.pos -= 1;
                    self.consume_numeric()
                } else {
                    CssToken::Delim(c)
                }
            }
            '-' => {
                if self.starts_number(Some('-')) {
                    self.pos -= 1;
                    self.consume_numeric()
                } else if self.peek(0) == Some('-') && self.peek(1) == Some('>') {
                    self.pos += 2;
                    CssToken::Cdc
                } else if matches!(self.peek(0), Some(c) if is_ident_char(c))
                    || is_valid_escape(self.peek(0), self.peek(1))
                {
                    self.pos -= 1;
                    self.consume_ident_like()
                } else {
                    CssToken::Delim('-')
                }
            }
            '<' => {
                if self.peek(0) == Some('!') && self.peek(1) == Some('-') && self.peek(2) == Some('-')
                {
                    self.pos += 3;
                    CssToken::Cdo
                } else {
                    CssToken::Delim('<')
                }
            }
            '@' => {
                if self.would_start_ident() {
                    let name = self.consume_ident_sequence();
                    CssToken::AtKeyword(name.to_ascii_lowercase())
                } else {
                    CssToken::Delim('@')
                }
            }
            '\\' => {
                if is_valid_escape(Some('\\'), self.peek(0)) {
                    self.pos -= 1;
                    self.consume_ident_like()
                } else {
                    CssToken::Delim('\\')
                }
            }
            c if c.is_ascii_digit() => {
                self.pos -= 1;
                self.consume_numeric()
            }
            c if is_ident_start(c) => {
                self.pos -= 1;
                self.consume_ident_like()
            }
            c => CssToken::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn consume_comments(&mut self) {
        while self.peek(0) == Some('/') && self.peek(1) == Some('*') {
            self.pos += 2;
            loop {
                match self.advance() {
                    Some('*') if self.peek(0) == Some('/') => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => {}
                    // "If the preceding paragraph ended by consuming an
                    // EOF code point, this is a parse error." Recover by
                    // treating the comment as closed.
                    None => return,
                }
            }
        }
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string(&mut self, quote: char) -> CssToken {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return CssToken::String(value),
                // "Newline: This is a parse error. Reconsume the current
                // input code point, create a <bad-string-token>."
                Some('\n') => {
                    self.pos -= 1;
                    return CssToken::BadString;
                }
                Some('\\') => match self.peek(0) {
                    // Escaped newline: the string continues.
                    Some('\n') => {
                        let _ = self.advance();
                    }
                    None => {}
                    Some(_) => value.push(self.consume_escape()),
                },
                Some(c) => value.push(c),
                // "EOF: This is a parse error. Return the string token."
                None => return CssToken::String(value),
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// "Consume as many hex digits as possible, but no more than 5 [after
    /// the first]... If the next input code point is whitespace, consume
    /// it as well."
    fn consume_escape(&mut self) -> char {
        let Some(c) = self.advance() else {
            return '\u{FFFD}';
        };
        if !c.is_ascii_hexdigit() {
            return c;
        }
        let mut code = c.to_digit(16).unwrap_or(0);
        let mut count = 1;
        while count < 6 {
            match self.peek(0) {
                Some(h) if h.is_ascii_hexdigit() => {
                    code = code * 16 + h.to_digit(16).unwrap_or(0);
                    let _ = self.advance();
                    count += 1;
                }
                _ => break,
            }
        }
        if matches!(self.peek(0), Some(c) if is_css_whitespace(c)) {
            let _ = self.advance();
        }
        char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}')
    }

    /// [§ 4.3.3 Would start an identifier](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident(&self) -> bool {
        match self.peek(0) {
            Some('-') => {
                matches!(self.peek(1), Some(c) if is_ident_start(c) || c == '-')
                    || is_valid_escape(self.peek(1), self.peek(2))
            }
            Some(c) if is_ident_start(c) => true,
            Some('\\') => is_valid_escape(self.peek(0), self.peek(1)),
            _ => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn starts_number(&self, first: Option<char>) -> bool {
        match first {
            Some('+' | '-') => {
                matches!(self.peek(0), Some(c) if c.is_ascii_digit())
                    || (self.peek(0) == Some('.')
                        && matches!(self.peek(1), Some(c) if c.is_ascii_digit()))
            }
            Some('.') => matches!(self.peek(0), Some(c) if c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut out = String::new();
        loop {
            match self.peek(0) {
                Some(c) if is_ident_char(c) => {
                    out.push(c);
                    let _ = self.advance();
                }
                Some('\\') if is_valid_escape(self.peek(0), self.peek(1)) => {
                    let _ = self.advance();
                    out.push(self.consume_escape());
                }
                _ => return out,
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> (f32, NumericType) {
        let mut repr = String::new();
        let mut numeric_type = NumericType::Integer;

        if matches!(self.peek(0), Some('+' | '-')) {
            repr.push(self.advance().unwrap_or('+'));
        }
        while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
            repr.push(self.advance().unwrap_or('0'));
        }
        if self.peek(0) == Some('.') && matches!(self.peek(1), Some(c) if c.is_ascii_digit()) {
            numeric_type = NumericType::Number;
            repr.push(self.advance().unwrap_or('.'));
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                repr.push(self.advance().unwrap_or('0'));
            }
        }
        if matches!(self.peek(0), Some('e' | 'E')) {
            let sign_offset = usize::from(matches!(self.peek(1), Some('+' | '-')));
            if matches!(self.peek(1 + sign_offset), Some(c) if c.is_ascii_digit()) {
                numeric_type = NumericType::Number;
                repr.push(self.advance().unwrap_or('e'));
                if sign_offset == 1 {
                    repr.push(self.advance().unwrap_or('+'));
                }
                while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                    repr.push(self.advance().unwrap_or('0'));
                }
            }
        }

        (repr.parse().unwrap_or(0.0), numeric_type)
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric(&mut self) -> CssToken {
        let (value, numeric_type) = self.consume_number();
        if self.would_start_ident() {
            let unit = self.consume_ident_sequence().to_ascii_lowercase();
            CssToken::Dimension { value, unit }
        } else if self.peek(0) == Some('%') {
            let _ = self.advance();
            CssToken::Percentage(value)
        } else {
            CssToken::Number {
                value,
                numeric_type,
            }
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_ident_sequence();
        if self.peek(0) == Some('(') {
            let _ = self.advance();
            if name.eq_ignore_ascii_case("url") {
                // "If the next one or two input code points are ... a
                // quotation mark, return a <function-token>"; the quoted
                // form is parsed as a normal function with a string
                // argument.
                let mut ahead = 0;
                while matches!(self.peek(ahead), Some(c) if is_css_whitespace(c)) {
                    ahead += 1;
                }
                if matches!(self.peek(ahead), Some('"' | '\'')) {
                    return CssToken::Function(name.to_ascii_lowercase());
                }
                return self.consume_url();
            }
            return CssToken::Function(name.to_ascii_lowercase());
        }
        CssToken::Ident(name)
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url(&mut self) -> CssToken {
        while matches!(self.peek(0), Some(c) if is_css_whitespace(c)) {
            let _ = self.advance();
        }
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(')') => return CssToken::Url(value),
                None => return CssToken::Url(value),
                Some(c) if is_css_whitespace(c) => {
                    while matches!(self.peek(0), Some(c) if is_css_whitespace(c)) {
                        let _ = self.advance();
                    }
                    match self.advance() {
                        Some(')') | None => return CssToken::Url(value),
                        Some(_) => return self.consume_bad_url(),
                    }
                }
                Some('"' | '\'' | '(') => return self.consume_bad_url(),
                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek(0)) {
                        value.push(self.consume_escape());
                    } else {
                        return self.consume_bad_url();
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url(&mut self) -> CssToken {
        loop {
            match self.advance() {
                Some(')') | None => return CssToken::BadUrl,
                Some('\\') if is_valid_escape(Some('\\'), self.peek(0)) => {
                    let _ = self.consume_escape();
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<CssToken> {
        let mut tokenizer = CssTokenizer::new(input);
        tokenizer.run();
        let mut tokens = tokenizer.into_tokens();
        assert_eq!(tokens.pop(), Some(CssToken::Eof));
        tokens
    }

    #[test]
    fn ident_and_braces() {
        assert_eq!(
            tokenize("p{}"),
            vec![
                CssToken::Ident("p".to_string()),
                CssToken::LeftBrace,
                CssToken::RightBrace,
            ]
        );
    }

    #[test]
    fn declaration_tokens() {
        assert_eq!(
            tokenize("color:red;"),
            vec![
                CssToken::Ident("color".to_string()),
                CssToken::Colon,
                CssToken::Ident("red".to_string()),
                CssToken::Semicolon,
            ]
        );
    }

    #[test]
    fn numbers_and_dimensions() {
        assert_eq!(
            tokenize("10px 1.5em 50% -3 .5"),
            vec![
                CssToken::Dimension {
                    value: 10.0,
                    unit: "px".to_string()
                },
                CssToken::Whitespace,
                CssToken::Dimension {
                    value: 1.5,
                    unit: "em".to_string()
                },
                CssToken::Whitespace,
                CssToken::Percentage(50.0),
                CssToken::Whitespace,
                CssToken::Number {
                    value: -3.0,
                    numeric_type: NumericType::Integer
                },
                CssToken::Whitespace,
                CssToken::Number {
                    value: 0.5,
                    numeric_type: NumericType::Number
                },
            ]
        );
    }

    #[test]
    fn hash_tokens() {
        assert_eq!(
            tokenize("#main #fff"),
            vec![
                CssToken::Hash {
                    value: "main".to_string(),
                    hash_type: HashType::Id
                },
                CssToken::Whitespace,
                CssToken::Hash {
                    value: "fff".to_string(),
                    hash_type: HashType::Id
                },
            ]
        );
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(
            tokenize(r#""a\"b" '\2014' "#),
            vec![
                CssToken::String("a\"b".to_string()),
                CssToken::Whitespace,
                CssToken::String("\u{2014}".to_string()),
                CssToken::Whitespace,
            ]
        );
    }

    #[test]
    fn unterminated_string_at_newline_is_bad() {
        let tokens = tokenize("\"abc\nx");
        assert_eq!(tokens[0], CssToken::BadString);
    }

    #[test]
    fn url_forms() {
        assert_eq!(
            tokenize("url(a.png)"),
            vec![CssToken::Url("a.png".to_string())]
        );
        assert_eq!(
            tokenize("url( spaced.png )"),
            vec![CssToken::Url("spaced.png".to_string())]
        );
        assert_eq!(
            tokenize("url(\"quoted.png\")"),
            vec![
                CssToken::Function("url".to_string()),
                CssToken::String("quoted.png".to_string()),
                CssToken::RightParen,
            ]
        );
    }

    #[test]
    fn at_keyword_and_function() {
        assert_eq!(
            tokenize("@media calc("),
            vec![
                CssToken::AtKeyword("media".to_string()),
                CssToken::Whitespace,
                CssToken::Function("calc".to_string()),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokenize("a/* x */b"),
            vec![
                CssToken::Ident("a".to_string()),
                CssToken::Ident("b".to_string()),
            ]
        );
    }

    #[test]
    fn cdo_cdc_tokens() {
        assert_eq!(tokenize("<!-- -->"), vec![
            CssToken::Cdo,
            CssToken::Whitespace,
            CssToken::Cdc,
        ]);
    }

    #[test]
    fn escaped_ident() {
        assert_eq!(
            tokenize(r"\64 iv"),
            vec![CssToken::Ident("div".to_string())]
        );
    }
}
