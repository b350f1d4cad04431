//! CSS color values.
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! An sRGB color with 8-bit channels. Parsed from `#rgb`/`#rrggbb` (and
//! their alpha forms), `rgb()`/`rgba()` with channel clamping, the named
//! color table, and — for system color names — a resolver callback the
//! container supplies. Equality is 4-byte identity.

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
///
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebColor {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

/// Resolves system color names (`windowtext`, ...) to `#rrggbb` strings.
/// Supplied by the container; colors outside the CSS named table go
/// through this.
pub type SystemColorResolver<'a> = &'a dyn Fn(&str) -> Option<String>;

impl WebColor {
    /// Opaque black (#000000).
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque white (#ffffff).
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// True if the alpha channel is zero.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    ///
    /// "The syntax of a <hex-color> is a <hash-token> token whose value
    /// consists of 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digit = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        // "The three-digit RGB notation (#RGB) is converted into
        // six-digit form (#RRGGBB) by replicating digits."
        let wide = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        match hex.len() {
            3 => Some(Self {
                r: wide(0)?,
                g: wide(1)?,
                b: wide(2)?,
                a: 255,
            }),
            4 => Some(Self {
                r: wide(0)?,
                g: wide(1)?,
                b: wide(2)?,
                a: wide(3)?,
            }),
            6 => Some(Self {
                r: digit(0..2)?,
                g: digit(2..4)?,
                b: digit(4..6)?,
                a: 255,
            }),
            8 => Some(Self {
                r: digit(0..2)?,
                g: digit(2..4)?,
                b: digit(4..6)?,
                a: digit(6..8)?,
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        named_color(&name.to_ascii_lowercase())
    }

    /// Parse any color form from text: hex, `rgb()`/`rgba()`, named, or
    /// a system color via the container's resolver.
    ///
    /// Unparseable input yields opaque black, matching the "draw what we
    /// can" recovery rule.
    #[must_use]
    pub fn from_string(value: &str, resolver: Option<SystemColorResolver<'_>>) -> Self {
        Self::try_from_string(value, resolver).unwrap_or(Self::BLACK)
    }

    /// Like [`Self::from_string`], but reports failure.
    #[must_use]
    pub fn try_from_string(value: &str, resolver: Option<SystemColorResolver<'_>>) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            let inner = value.find('(').map(|open| {
                let close = value.rfind(')').unwrap_or(value.len());
                &value[open + 1..close]
            })?;
            return Self::from_channel_text(inner);
        }
        if let Some(color) = named_color(&lower) {
            return Some(color);
        }
        if let Some(resolver) = resolver {
            if let Some(resolved) = resolver(&lower) {
                return Self::from_hex(resolved.strip_prefix('#').unwrap_or(&resolved));
            }
        }
        None
    }

    /// Parse `r, g, b [, a]` channel text from an `rgb()`/`rgba()` body.
    ///
    /// "Values outside these ranges are not invalid, but are clamped to
    /// the ranges defined here at parsed-value time."
    fn from_channel_text(inner: &str) -> Option<Self> {
        let parts: Vec<&str> = inner
            .split(|c: char| c == ',' || c.is_ascii_whitespace() || c == '/')
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() < 3 {
            return None;
        }
        let channel = |text: &str| -> Option<u8> {
            if let Some(percent) = text.strip_suffix('%') {
                let value: f32 = percent.trim().parse().ok()?;
                Some(clamp_channel(value * 255.0 / 100.0))
            } else {
                let value: f32 = text.trim().parse().ok()?;
                Some(clamp_channel(value))
            }
        };
        let alpha = if parts.len() >= 4 {
            let text = parts[3];
            if let Some(percent) = text.strip_suffix('%') {
                let value: f32 = percent.trim().parse().ok()?;
                clamp_channel(value * 255.0 / 100.0)
            } else {
                let value: f32 = text.trim().parse().ok()?;
                clamp_channel(value * 255.0)
            }
        } else {
            255
        };
        Some(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a: alpha,
        })
    }

    /// Parse a color from declaration component values.
    #[must_use]
    pub fn from_component(
        value: &ComponentValue,
        resolver: Option<SystemColorResolver<'_>>,
    ) -> Option<Self> {
        match value {
            ComponentValue::Token(CssToken::Hash { value, .. }) => Self::from_hex(value),
            ComponentValue::Token(CssToken::Ident(name)) => {
                named_color(&name.to_ascii_lowercase()).or_else(|| {
                    resolver.and_then(|r| {
                        r(&name.to_ascii_lowercase())
                            .and_then(|hex| Self::from_hex(hex.strip_prefix('#').unwrap_or(&hex)))
                    })
                })
            }
            ComponentValue::Function { name, value } if name == "rgb" || name == "rgba" => {
                let text: String = value.iter().map(ToString::to_string).collect();
                Self::from_channel_text(&text)
            }
            _ => None,
        }
    }
}

/// Clamp a channel to 0..=255, rounding half away from zero.
fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The full CSS named color table. Lookup is by lowercase name.
#[allow(clippy::too_many_lines)]
fn named_color(name: &str) -> Option<WebColor> {
    let (r, g, b) = match name {
        "transparent" => return Some(WebColor::TRANSPARENT),
        "aliceblue" => (0xF0, 0xF8, 0xFF),
        "antiquewhite" => (0xFA, 0xEB, 0xD7),
        "aqua" | "cyan" => (0x00, 0xFF, 0xFF),
        "aquamarine" => (0x7F, 0xFF, 0xD4),
        "azure" => (0xF0, 0xFF, 0xFF),
        "beige" => (0xF5, 0xF5, 0xDC),
        "bisque" => (0xFF, 0xE4, 0xC4),
        "black" => (0x00, 0x00, 0x00),
        "blanchedalmond" => (0xFF, 0xEB, 0xCD),
        "blue" => (0x00, 0x00, 0xFF),
        "blueviolet" => (0x8A, 0x2B, 0xE2),
        "brown" => (0xA5, 0x2A, 0x2A),
        "burlywood" => (0xDE, 0xB8, 0x87),
        "cadetblue" => (0x5F, 0x9E, 0xA0),
        "chartreuse" => (0x7F, 0xFF, 0x00),
        "chocolate" => (0xD2, 0x69, 0x1E),
        "coral" => (0xFF, 0x7F, 0x50),
        "cornflowerblue" => (0x64, 0x95, 0xED),
        "cornsilk" => (0xFF, 0xF8, 0xDC),
        "crimson" => (0xDC, 0x14, 0x3C),
        "darkblue" => (0x00, 0x00, 0x8B),
        "darkcyan" => (0x00, 0x8B, 0x8B),
        "darkgoldenrod" => (0xB8, 0x86, 0x0B),
        "darkgray" | "darkgrey" => (0xA9, 0xA9, 0xA9),
        "darkgreen" => (0x00, 0x64, 0x00),
        "darkkhaki" => (0xBD, 0xB7, 0x6B),
        "darkmagenta" => (0x8B, 0x00, 0x8B),
        "darkolivegreen" => (0x55, 0x6B, 0x2F),
        "darkorange" => (0xFF, 0x8C, 0x00),
        "darkorchid" => (0x99, 0x32, 0xCC),
        "darkred" => (0x8B, 0x00, 0x00),
        "darksalmon" => (0xE9, 0x96, 0x7A),
        "darkseagreen" => (0x8F, 0xBC, 0x8F),
        "darkslateblue" => (0x48, 0x3D, 0x8B),
        "darkslategray" | "darkslategrey" => (0x2F, 0x4F, 0x4F),
        "darkturquoise" => (0x00, 0xCE, 0xD1),
        "darkviolet" => (0x94, 0x00, 0xD3),
        "deeppink" => (0xFF, 0x14, 0x93),
        "deepskyblue" => (0x00, 0xBF, 0xFF),
        "dimgray" | "dimgrey" => (0x69, 0x69, 0x69),
        "dodgerblue" => (0x1E, 0x90, 0xFF),
        "firebrick" => (0xB2, 0x22, 0x22),
        "floralwhite" => (0xFF, 0xFA, 0xF0),
        "forestgreen" => (0x22, 0x8B, 0x22),
        "fuchsia" | "magenta" => (0xFF, 0x00, 0xFF),
        "gainsboro" => (0xDC, 0xDC, 0xDC),
        "ghostwhite" => (0xF8, 0xF8, 0xFF),
        "gold" => (0xFF, 0xD7, 0x00),
        "goldenrod" => (0xDA, 0xA5, 0x20),
        "gray" | "grey" => (0x80, 0x80, 0x80),
        "green" => (0x00, 0x80, 0x00),
        "greenyellow" => (0xAD, 0xFF, 0x2F),
        "honeydew" => (0xF0, 0xFF, 0xF0),
        "hotpink" => (0xFF, 0x69, 0xB4),
        "indianred" => (0xCD, 0x5C, 0x5C),
        "indigo" => (0x4B, 0x00, 0x82),
        "ivory" => (0xFF, 0xFF, 0xF0),
        "khaki" => (0xF0, 0xE6, 0x8C),
        "lavender" => (0xE6, 0xE6, 0xFA),
        "lavenderblush" => (0xFF, 0xF0, 0xF5),
        "lawngreen" => (0x7C, 0xFC, 0x00),
        "lemonchiffon" => (0xFF, 0xFA, 0xCD),
        "lightblue" => (0xAD, 0xD8, 0xE6),
        "lightcoral" => (0xF0, 0x80, 0x80),
        "lightcyan" => (0xE0, 0xFF, 0xFF),
        "lightgoldenrodyellow" => (0xFA, 0xFA, 0xD2),
        "lightgray" | "lightgrey" => (0xD3, 0xD3, 0xD3),
        "lightgreen" => (0x90, 0xEE, 0x90),
        "lightpink" => (0xFF, 0xB6, 0xC1),
        "lightsalmon" => (0xFF, 0xA0, 0x7A),
        "lightseagreen" => (0x20, 0xB2, 0xAA),
        "lightskyblue" => (0x87, 0xCE, 0xFA),
        "lightslategray" | "lightslategrey" => (0x77, 0x88, 0x99),
        "lightsteelblue" => (0xB0, 0xC4, 0xDE),
        "lightyellow" => (0xFF, 0xFF, 0xE0),
        "lime" => (0x00, 0xFF, 0x00),
        "limegreen" => (0x32, 0xCD, 0x32),
        "linen" => (0xFA, 0xF0, 0xE6),
        "maroon" => (0x80, 0x00, 0x00),
        "mediumaquamarine" => (0x66, 0xCD, 0xAA),
        "mediumblue" => (0x00, 0x00, 0xCD),
        "mediumorchid" => (0xBA, 0x55, 0xD3),
        "mediumpurple" => (0x93, 0x70, 0xDB),
        "mediumseagreen" => (0x3C, 0xB3, 0x71),
        "mediumslateblue" => (0x7B, 0x68, 0xEE),
        "mediumspringgreen" => (0x00, 0xFA, 0x9A),
        "mediumturquoise" => (0x48, 0xD1, 0xCC),
        "mediumvioletred" => (0xC7, 0x15, 0x85),
        "midnightblue" => (0x19, 0x19, 0x70),
        "mintcream" => (0xF5, 0xFF, 0xFA),
        "mistyrose" => (0xFF, 0xE4, 0xE1),
        "moccasin" => (0xFF, 0xE4, 0xB5),
        "navajowhite" => (0xFF, 0xDE, 0xAD),
        "navy" => (0x00, 0x00, 0x80),
        "oldlace" => (0xFD, 0xF5, 0xE6),
        "olive" => (0x80, 0x80, 0x00),
        "olivedrab" => (0x6B, 0x8E, 0x23),
        "orange" => (0xFF, 0xA5, 0x00),
        "orangered" => (0xFF, 0x45, 0x00),
        "orchid" => (0xDA, 0x70, 0xD6),
        "palegoldenrod" => (0xEE, 0xE8, 0xAA),
        "palegreen" => (0x98, 0xFB, 0x98),
        "paleturquoise" => (0xAF, 0xEE, 0xEE),
        "palevioletred" => (0xDB, 0x70, 0x93),
        "papayawhip" => (0xFF, 0xEF, 0xD5),
        "peachpuff" => (0xFF, 0xDA, 0xB9),
        "peru" => (0xCD, 0x85, 0x3F),
        "pink" => (0xFF, 0xC0, 0xCB),
        "plum" => (0xDD, 0xA0, 0xDD),
        "powderblue" => (0xB0, 0xE0, 0xE6),
        "purple" => (0x80, 0x00, 0x80),
        "rebeccapurple" => (0x66, 0x33, 0x99),
        "red" => (0xFF, 0x00, 0x00),
        "rosybrown" => (0xBC, 0x8F, 0x8F),
        "royalblue" => (0x41, 0x69, 0xE1),
        "saddlebrown" => (0x8B, 0x45, 0x13),
        "salmon" => (0xFA, 0x80, 0x72),
        "sandybrown" => (0xF4, 0xA4, 0x60),
        "seagreen" => (0x2E, 0x8B, 0x57),
        "seashell" => (0xFF, 0xF5, 0xEE),
        "sienna" => (0xA0, 0x52, 0x2D),
        "silver" => (0xC0, 0xC0, 0xC0),
        "skyblue" => (0x87, 0xCE, 0xEB),
        "slateblue" => (0x6A, 0x5A, 0xCD),
        "slategray" | "slategrey" => (0x70, 0x80, 0x90),
        "snow" => (0xFF, 0xFA, 0xFA),
        "springgreen" => (0x00, 0xFF, 0x7F),
        "steelblue" => (0x46, 0x82, 0xB4),
        "tan" => (0xD2, 0xB4, 0x8C),
        "teal" => (0x00, 0x80, 0x80),
        "thistle" => (0xD8, 0xBF, 0xD8),
        "tomato" => (0xFF, 0x63, 0x47),
        "turquoise" => (0x40, 0xE0, 0xD0),
        "violet" => (0xEE, 0x82, 0xEE),
        "wheat" => (0xF5, 0xDE, 0xB3),
        "white" => (0xFF, 0xFF, 0xFF),
        "whitesmoke" => (0xF5, 0xF5, 0xF5),
        "yellow" => (0xFF, 0xFF, 0x00),
        "yellowgreen" => (0x9A, 0xCD, 0x32),
        _ => return None,
    };
    Some(WebColor::rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hex() {
        let c = WebColor::from_string("#f0f", None);
        assert_eq!(c, WebColor::rgb(255, 0, 255));
    }

    #[test]
    fn long_hex_and_alpha() {
        assert_eq!(
            WebColor::from_string("#ff00ff", None),
            WebColor::rgb(255, 0, 255)
        );
        assert_eq!(
            WebColor::from_string("#ff00ff80", None),
            WebColor {
                r: 255,
                g: 0,
                b: 255,
                a: 0x80
            }
        );
    }

    #[test]
    fn rgb_function() {
        assert_eq!(
            WebColor::from_string("rgb(255,0,255)", None),
            WebColor::rgb(255, 0, 255)
        );
        assert_eq!(
            WebColor::from_string("rgba(0, 128, 0, 0.5)", None),
            WebColor {
                r: 0,
                g: 128,
                b: 0,
                a: 128
            }
        );
    }

    #[test]
    fn out_of_range_channels_clamp() {
        assert_eq!(
            WebColor::from_string("rgb(256, -1, 128)", None),
            WebColor::rgb(255, 0, 128)
        );
    }

    #[test]
    fn named_colors() {
        assert_eq!(WebColor::from_string("red", None), WebColor::rgb(255, 0, 0));
        assert_eq!(
            WebColor::from_string("rebeccapurple", None),
            WebColor::rgb(0x66, 0x33, 0x99)
        );
        assert!(WebColor::from_string("transparent", None).is_transparent());
    }

    #[test]
    fn unknown_name_is_black() {
        assert_eq!(WebColor::from_string("unknown", None), WebColor::BLACK);
        assert_eq!(WebColor::from_string("", None), WebColor::BLACK);
        assert!(WebColor::try_from_string("unknown", None).is_none());
    }

    #[test]
    fn system_color_resolver() {
        let resolver = |name: &str| {
            (name == "windowtext").then(|| "#102030".to_string())
        };
        let c = WebColor::from_string("WindowText", Some(&resolver));
        assert_eq!(c, WebColor::rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn percentage_channels() {
        assert_eq!(
            WebColor::from_string("rgb(100%, 0%, 50%)", None),
            WebColor::rgb(255, 0, 128)
        );
    }

    #[test]
    fn empty_rgb_is_invalid() {
        assert!(WebColor::try_from_string("rgb()", None).is_none());
    }
}
