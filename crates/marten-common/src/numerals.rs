//! List-marker numeral conversion.
//!
//! [CSS 2.1 § 12.5.1 'list-style-type'](https://www.w3.org/TR/CSS2/generate.html#list-style)
//!
//! "decimal — Decimal numbers, beginning with 1. lower-roman — Lowercase
//! roman numerals. upper-roman — Uppercase roman numerals. lower-greek —
//! Lowercase classical Greek. lower-latin — Lowercase ascii letters.
//! upper-latin — Uppercase ascii letters."
//!
//! Ordinals are 1-based; callers pass the item's position among its
//! `list-item` siblings.

const LATIN_LOWER: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const LATIN_UPPER: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

const GREEK_LOWER: &[char] = &[
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ',
    'τ', 'υ', 'φ', 'χ', 'ψ', 'ω',
];

/// Bijective base-N conversion over an alphabet: 1 → "a", 26 → "z",
/// 27 → "aa". Zero and negative ordinals produce an empty string.
fn to_mapped_alpha(num: i32, map: &[char]) -> String {
    let base = map.len() as i32;
    let mut dividend = num;
    let mut out = String::new();
    while dividend > 0 {
        let modulo = (dividend - 1) % base;
        out.insert(0, map[modulo as usize]);
        dividend = (dividend - modulo) / base;
    }
    out
}

/// Additive-subtractive roman conversion over a value table.
fn to_roman(mut value: i32, table: &[(i32, &str)]) -> String {
    let mut out = String::new();
    for &(step, numeral) in table {
        while value >= step {
            out.push_str(numeral);
            value -= step;
        }
    }
    out
}

/// `list-style-type: decimal`.
#[must_use]
pub fn to_decimal(value: i32) -> String {
    value.to_string()
}

/// `list-style-type: lower-latin` / `lower-alpha`.
#[must_use]
pub fn to_latin_lower(value: i32) -> String {
    to_mapped_alpha(value, LATIN_LOWER)
}

/// `list-style-type: upper-latin` / `upper-alpha`.
#[must_use]
pub fn to_latin_upper(value: i32) -> String {
    to_mapped_alpha(value, LATIN_UPPER)
}

/// `list-style-type: lower-greek`.
#[must_use]
pub fn to_greek_lower(value: i32) -> String {
    to_mapped_alpha(value, GREEK_LOWER)
}

/// `list-style-type: lower-roman`.
#[must_use]
pub fn to_roman_lower(value: i32) -> String {
    to_roman(
        value,
        &[
            (1000, "m"),
            (900, "cm"),
            (500, "d"),
            (400, "cd"),
            (100, "c"),
            (90, "xc"),
            (50, "l"),
            (40, "xl"),
            (10, "x"),
            (9, "ix"),
            (5, "v"),
            (4, "iv"),
            (1, "i"),
        ],
    )
}

/// `list-style-type: upper-roman`.
#[must_use]
pub fn to_roman_upper(value: i32) -> String {
    to_roman(
        value,
        &[
            (1000, "M"),
            (900, "CM"),
            (500, "D"),
            (400, "CD"),
            (100, "C"),
            (90, "XC"),
            (50, "L"),
            (40, "XL"),
            (10, "X"),
            (9, "IX"),
            (5, "V"),
            (4, "IV"),
            (1, "I"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_wraps_bijectively() {
        assert_eq!(to_latin_lower(1), "a");
        assert_eq!(to_latin_lower(26), "z");
        assert_eq!(to_latin_lower(27), "aa");
        assert_eq!(to_latin_upper(28), "AB");
    }

    #[test]
    fn roman_subtractive_forms() {
        assert_eq!(to_roman_lower(4), "iv");
        assert_eq!(to_roman_lower(1994), "mcmxciv");
        assert_eq!(to_roman_upper(9), "IX");
    }

    #[test]
    fn greek_alphabet() {
        assert_eq!(to_greek_lower(1), "α");
        assert_eq!(to_greek_lower(24), "ω");
        assert_eq!(to_greek_lower(25), "αα");
    }

    #[test]
    fn zero_and_negative_are_empty() {
        assert_eq!(to_latin_lower(0), "");
        assert_eq!(to_roman_lower(-3), "");
    }
}
