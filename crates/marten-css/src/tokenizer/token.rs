//! CSS token types per [CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "The output of the tokenization step is a stream of zero or more of the
//! following tokens: <ident-token>, <function-token>, <at-keyword-token>,
//! <hash-token>, <string-token>, <bad-string-token>, <url-token>,
//! <bad-url-token>, <delim-token>, <number-token>, <percentage-token>,
//! <dimension-token>, <whitespace-token>, <CDO-token>, <CDC-token>,
//! <colon-token>, <semicolon-token>, <comma-token>, <[-token>, <]-token>,
//! <(-token>, <)-token>, <{-token>, and <}-token>."

use core::fmt;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A <hash-token> with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// The hash token's value is a valid identifier.
    Id,
    /// The hash token's value is not a valid identifier.
    Unrestricted,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A <number-token> has a type flag set to either 'integer' or 'number'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// The number is an integer.
    Integer,
    /// The number has a decimal point or exponent.
    Number,
}

/// CSS tokens as defined by CSS Syntax Module Level 3.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    /// `<ident-token>`
    Ident(String),

    /// `<function-token>` — an identifier immediately followed by `(`.
    Function(String),

    /// `<at-keyword-token>` — `@` followed by an identifier.
    AtKeyword(String),

    /// `<hash-token>` — `#` followed by name code points.
    Hash {
        /// The name after the `#`.
        value: String,
        /// "a type flag set to either 'id' or 'unrestricted'"
        hash_type: HashType,
    },

    /// `<string-token>`
    String(String),

    /// `<bad-string-token>` — "represents a parsing error"
    BadString,

    /// `<url-token>` — the unquoted form of `url(...)`.
    Url(String),

    /// `<bad-url-token>` — "represents a parsing error"
    BadUrl,

    /// `<delim-token>` — "has a value composed of a single code point"
    Delim(char),

    /// `<number-token>`
    Number {
        /// Numeric value.
        value: f32,
        /// Integer or real.
        numeric_type: NumericType,
    },

    /// `<percentage-token>` — the numeric value without the `%`.
    Percentage(f32),

    /// `<dimension-token>` — a number with a unit identifier.
    Dimension {
        /// Numeric value.
        value: f32,
        /// Unit identifier, lowercased.
        unit: String,
    },

    /// `<whitespace-token>` — one or more whitespace code points.
    Whitespace,

    /// `<CDO-token>` — `<!--`, ignored at the top level.
    Cdo,

    /// `<CDC-token>` — `-->`, ignored at the top level.
    Cdc,

    /// `:`
    Colon,

    /// `;`
    Semicolon,

    /// `,`
    Comma,

    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,

    /// End of input.
    Eof,
}

impl CssToken {
    /// The block-closing partner for an opening token, if this opens one.
    #[must_use]
    pub const fn closing_pair(&self) -> Option<Self> {
        match self {
            Self::LeftBracket => Some(Self::RightBracket),
            Self::LeftParen | Self::Function(_) => Some(Self::RightParen),
            Self::LeftBrace => Some(Self::RightBrace),
            _ => None,
        }
    }
}

impl fmt::Display for CssToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "{s}"),
            Self::Function(s) => write!(f, "{s}("),
            Self::AtKeyword(s) => write!(f, "@{s}"),
            Self::Hash { value, .. } => write!(f, "#{value}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::BadString => write!(f, "<bad-string>"),
            Self::Url(s) => write!(f, "url({s})"),
            Self::BadUrl => write!(f, "<bad-url>"),
            Self::Delim(c) => write!(f, "{c}"),
            Self::Number { value, .. } => write!(f, "{value}"),
            Self::Percentage(value) => write!(f, "{value}%"),
            Self::Dimension { value, unit } => write!(f, "{value}{unit}"),
            Self::Whitespace => write!(f, " "),
            Self::Cdo => write!(f, "<!--"),
            Self::Cdc => write!(f, "-->"),
            Self::Colon => write!(f, ":"),
            Self::Semicolon => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBrace => write!(f, "{{"),
            Self::RightBrace => write!(f, "}}"),
            Self::Eof => Ok(()),
        }
    }
}
