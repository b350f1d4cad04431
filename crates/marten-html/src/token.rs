//! HTML token types.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! "The output of the tokenization step is a series of zero or more of
//! the following tokens: DOCTYPE, start tag, end tag, comment, character,
//! end-of-file."
//!
//! One deviation from the WHATWG token set: the bodies of raw-text
//! elements (`<script>`, `<style>`, ...) are emitted as a single
//! [`Token::RawText`] rather than a character stream, so the tree builder
//! can attach them as one text node.

/// An attribute on a start tag token.
///
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// Tokens emitted to the tree construction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A `<!DOCTYPE ...>` declaration. Only the name is kept; the engine
    /// has no quirks mode.
    Doctype {
        /// The doctype name, lowercased, if present.
        name: Option<String>,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag,
    /// and a list of attributes."
    StartTag {
        /// Tag name, lowercased during tokenization.
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes on end tags are a parse error and are
    /// dropped during tokenization.
    EndTag {
        /// Tag name, lowercased during tokenization.
        name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// The comment text between `<!--` and `-->`.
        data: String,
    },

    /// A single code point of document text.
    Character {
        /// "data"
        data: char,
    },

    /// The complete body of a raw-text element, emitted as one token.
    RawText {
        /// Verbatim element content.
        data: String,
    },

    /// A `<![CDATA[ ... ]]>` section, retained verbatim.
    Cdata {
        /// The bytes between the brackets.
        data: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// Create an empty start tag token.
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// Create an empty end tag token.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// The tag name, if this is a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }
}
