//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! References are decoded only in the data and attribute-value states.
//! Numeric forms `&#n;` and `&#xn;` map through code-point validation
//! (out-of-range and surrogate values become U+FFFD); named forms match
//! the table below and require the terminating semicolon. Anything else
//! is left in the text as a literal ampersand.

use marten_common::REPLACEMENT;

/// Named references the engine recognizes. A pragmatic subset of the
/// WHATWG table: the ASCII escapes plus the Latin-1 and typographic names
/// that appear in real documents.
const NAMED: &[(&str, char)] = &[
    ("AMP", '&'),
    ("GT", '>'),
    ("LT", '<'),
    ("QUOT", '"'),
    ("amp", '&'),
    ("apos", '\''),
    ("gt", '>'),
    ("lt", '<'),
    ("quot", '"'),
    ("nbsp", '\u{A0}'),
    ("iexcl", '¡'),
    ("cent", '¢'),
    ("pound", '£'),
    ("curren", '¤'),
    ("yen", '¥'),
    ("brvbar", '¦'),
    ("sect", '§'),
    ("uml", '¨'),
    ("copy", '©'),
    ("ordf", 'ª'),
    ("laquo", '«'),
    ("not", '¬'),
    ("shy", '\u{AD}'),
    ("reg", '®'),
    ("macr", '¯'),
    ("deg", '°'),
    ("plusmn", '±'),
    ("sup2", '²'),
    ("sup3", '³'),
    ("acute", '´'),
    ("micro", 'µ'),
    ("para", '¶'),
    ("middot", '·'),
    ("cedil", '¸'),
    ("sup1", '¹'),
    ("ordm", 'º'),
    ("raquo", '»'),
    ("frac14", '¼'),
    ("frac12", '½'),
    ("frac34", '¾'),
    ("iquest", '¿'),
    ("Agrave", 'À'),
    ("Aacute", 'Á'),
    ("Ccedil", 'Ç'),
    ("Egrave", 'È'),
    ("Eacute", 'É'),
    ("Ntilde", 'Ñ'),
    ("Ouml", 'Ö'),
    ("Uuml", 'Ü'),
    ("szlig", 'ß'),
    ("agrave", 'à'),
    ("aacute", 'á'),
    ("acirc", 'â'),
    ("auml", 'ä'),
    ("aring", 'å'),
    ("aelig", 'æ'),
    ("ccedil", 'ç'),
    ("egrave", 'è'),
    ("eacute", 'é'),
    ("ecirc", 'ê'),
    ("euml", 'ë'),
    ("igrave", 'ì'),
    ("iacute", 'í'),
    ("ntilde", 'ñ'),
    ("ograve", 'ò'),
    ("oacute", 'ó'),
    ("ouml", 'ö'),
    ("divide", '÷'),
    ("oslash", 'ø'),
    ("ugrave", 'ù'),
    ("uacute", 'ú'),
    ("uuml", 'ü'),
    ("times", '×'),
    ("OElig", 'Œ'),
    ("oelig", 'œ'),
    ("ndash", '–'),
    ("mdash", '—'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("sbquo", '\u{201A}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
    ("bdquo", '\u{201E}'),
    ("dagger", '†'),
    ("Dagger", '‡'),
    ("bull", '•'),
    ("hellip", '…'),
    ("permil", '‰'),
    ("prime", '′'),
    ("Prime", '″'),
    ("lsaquo", '‹'),
    ("rsaquo", '›'),
    ("euro", '€'),
    ("trade", '™'),
    ("larr", '←'),
    ("uarr", '↑'),
    ("rarr", '→'),
    ("darr", '↓'),
    ("minus", '−'),
    ("infin", '∞'),
    ("ne", '≠'),
    ("le", '≤'),
    ("ge", '≥'),
];

/// Look up a named reference (without `&` and `;`).
#[must_use]
pub fn named_reference(name: &str) -> Option<char> {
    NAMED
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, c)| c)
}

/// Decode a numeric reference body (the part between `&#` and `;`,
/// without the `x` prefix for hex).
///
/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is ... a surrogate, ... greater than 0x10FFFF, then
/// ... set the character reference code to 0xFFFD."
#[must_use]
pub fn numeric_reference(digits: &str, hex: bool) -> Option<char> {
    if digits.is_empty() {
        return None;
    }
    let radix = if hex { 16 } else { 10 };
    // Overflow is treated like any other out-of-range value.
    let code = u32::from_str_radix(digits, radix).unwrap_or(0x0011_0000);
    if code == 0 {
        return Some(REPLACEMENT);
    }
    Some(char::from_u32(code).unwrap_or(REPLACEMENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup() {
        assert_eq!(named_reference("amp"), Some('&'));
        assert_eq!(named_reference("nbsp"), Some('\u{A0}'));
        assert_eq!(named_reference("mdash"), Some('—'));
        assert_eq!(named_reference("bogus"), None);
    }

    #[test]
    fn numeric_decimal_and_hex() {
        assert_eq!(numeric_reference("65", false), Some('A'));
        assert_eq!(numeric_reference("41", true), Some('A'));
        assert_eq!(numeric_reference("1F600", true), Some('😀'));
    }

    #[test]
    fn numeric_out_of_range_replaced() {
        assert_eq!(numeric_reference("0", false), Some('\u{FFFD}'));
        assert_eq!(numeric_reference("D800", true), Some('\u{FFFD}'));
        assert_eq!(numeric_reference("110000", true), Some('\u{FFFD}'));
        assert_eq!(numeric_reference("", false), None);
    }
}
