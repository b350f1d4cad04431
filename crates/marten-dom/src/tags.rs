//! Interned tag names.
//!
//! Tag names are lowercased and interned to integer ids once, at parse
//! time; every later comparison (tree construction rules, selector
//! matching, default styles) is an integer compare. Known HTML tags map
//! to fixed ids; author-defined tags get per-document ids above
//! [`TagId::KNOWN_COUNT`] from [`crate::DomTree`]'s interner.

/// An interned tag name.
///
/// Ids below [`TagId::KNOWN_COUNT`] are the built-in HTML tags listed in
/// this module; ids at or above it index the owning document's custom-tag
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub u32);

macro_rules! known_tags {
    ($(($idx:expr, $konst:ident, $name:literal)),+ $(,)?) => {
        #[allow(missing_docs)]
        impl TagId {
            $(pub const $konst: Self = Self($idx);)+
        }

        /// Names of the built-in tags, indexed by id.
        pub(crate) const KNOWN_TAG_NAMES: &[&str] = &[$($name),+];

        /// Map a lowercase tag name to its built-in id, if known.
        #[must_use]
        pub fn known_tag_id(name: &str) -> Option<TagId> {
            match name {
                $($name => Some(TagId($idx)),)+
                _ => None,
            }
        }
    };
}

known_tags! {
    (0, HTML, "html"),
    (1, HEAD, "head"),
    (2, BODY, "body"),
    (3, TITLE, "title"),
    (4, STYLE, "style"),
    (5, SCRIPT, "script"),
    (6, LINK, "link"),
    (7, META, "meta"),
    (8, BASE, "base"),
    (9, DIV, "div"),
    (10, P, "p"),
    (11, SPAN, "span"),
    (12, A, "a"),
    (13, IMG, "img"),
    (14, BR, "br"),
    (15, WBR, "wbr"),
    (16, HR, "hr"),
    (17, UL, "ul"),
    (18, OL, "ol"),
    (19, LI, "li"),
    (20, DL, "dl"),
    (21, DT, "dt"),
    (22, DD, "dd"),
    (23, TABLE, "table"),
    (24, CAPTION, "caption"),
    (25, COLGROUP, "colgroup"),
    (26, COL, "col"),
    (27, THEAD, "thead"),
    (28, TBODY, "tbody"),
    (29, TFOOT, "tfoot"),
    (30, TR, "tr"),
    (31, TD, "td"),
    (32, TH, "th"),
    (33, H1, "h1"),
    (34, H2, "h2"),
    (35, H3, "h3"),
    (36, H4, "h4"),
    (37, H5, "h5"),
    (38, H6, "h6"),
    (39, EM, "em"),
    (40, STRONG, "strong"),
    (41, B, "b"),
    (42, I, "i"),
    (43, U, "u"),
    (44, S, "s"),
    (45, SMALL, "small"),
    (46, BIG, "big"),
    (47, SUB, "sub"),
    (48, SUP, "sup"),
    (49, CODE, "code"),
    (50, PRE, "pre"),
    (51, BLOCKQUOTE, "blockquote"),
    (52, ARTICLE, "article"),
    (53, SECTION, "section"),
    (54, NAV, "nav"),
    (55, ASIDE, "aside"),
    (56, HEADER, "header"),
    (57, FOOTER, "footer"),
    (58, MAIN, "main"),
    (59, FIGURE, "figure"),
    (60, FIGCAPTION, "figcaption"),
    (61, FORM, "form"),
    (62, INPUT, "input"),
    (63, BUTTON, "button"),
    (64, LABEL, "label"),
    (65, SELECT, "select"),
    (66, OPTION, "option"),
    (67, TEXTAREA, "textarea"),
    (68, FONT, "font"),
    (69, CENTER, "center"),
    (70, IFRAME, "iframe"),
    (71, OBJECT, "object"),
    (72, EMBED, "embed"),
    (73, NOSCRIPT, "noscript"),
    (74, TEMPLATE, "template"),
    (75, ADDRESS, "address"),
    (76, FIELDSET, "fieldset"),
    (77, LEGEND, "legend"),
    (78, DETAILS, "details"),
    (79, SUMMARY, "summary"),
    (80, DIALOG, "dialog"),
    (81, MARK, "mark"),
    (82, TIME, "time"),
    (83, ABBR, "abbr"),
    (84, CITE, "cite"),
    (85, Q, "q"),
    (86, KBD, "kbd"),
    (87, SAMP, "samp"),
    (88, VAR, "var"),
    (89, INS, "ins"),
    (90, DEL, "del"),
    (91, DFN, "dfn"),
    (92, RUBY, "ruby"),
    (93, TT, "tt"),
    (94, NOBR, "nobr"),
    (95, STRIKE, "strike"),
    (96, XMP, "xmp"),
    (97, LISTING, "listing"),
    (98, PLAINTEXT, "plaintext"),
    (99, MENU, "menu"),
    (100, DIR, "dir"),
    (101, HGROUP, "hgroup"),
    (102, SEARCH, "search"),
    (103, AREA, "area"),
    (104, BASEFONT, "basefont"),
    (105, DATALIST, "datalist"),
    (106, NOEMBED, "noembed"),
    (107, NOFRAMES, "noframes"),
    (108, PARAM, "param"),
    (109, RP, "rp"),
    (110, VIDEO, "video"),
    (111, AUDIO, "audio"),
    (112, CANVAS, "canvas"),
}

impl TagId {
    /// Number of built-in tags; custom ids start here.
    pub const KNOWN_COUNT: u32 = KNOWN_TAG_NAMES.len() as u32;

    /// True if this id is one of the built-in HTML tags.
    #[must_use]
    pub const fn is_known(self) -> bool {
        self.0 < Self::KNOWN_COUNT
    }

    /// Name of a built-in tag id; `None` for custom ids (resolve those
    /// through the owning [`crate::DomTree`]).
    #[must_use]
    pub fn known_name(self) -> Option<&'static str> {
        KNOWN_TAG_NAMES.get(self.0 as usize).copied()
    }

    /// True for void elements, which never take children or end tags.
    ///
    /// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
    ///
    /// "Void elements: area, base, br, col, embed, hr, img, input, link,
    /// meta, param, source, track, wbr"
    #[must_use]
    pub fn is_void(self) -> bool {
        matches!(
            self,
            Self::AREA
                | Self::BASE
                | Self::BR
                | Self::COL
                | Self::EMBED
                | Self::HR
                | Self::IMG
                | Self::INPUT
                | Self::LINK
                | Self::META
                | Self::PARAM
                | Self::WBR
                | Self::BASEFONT
        )
    }

    /// True for elements whose content is raw text: no tags, no character
    /// references, terminated only by the matching end tag.
    #[must_use]
    pub fn is_raw_text(self) -> bool {
        matches!(self, Self::SCRIPT | Self::STYLE | Self::XMP | Self::TEXTAREA | Self::TITLE)
    }

    /// True for the table-internal tags that may legally sit inside a
    /// `<table>` subtree. Anything else found there is fostered out.
    #[must_use]
    pub fn is_table_internal(self) -> bool {
        matches!(
            self,
            Self::CAPTION
                | Self::COLGROUP
                | Self::COL
                | Self::THEAD
                | Self::TBODY
                | Self::TFOOT
                | Self::TR
                | Self::TD
                | Self::TH
        )
    }

    /// Block-level tags that implicitly close an open `<p>`.
    ///
    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "If the stack of open elements has a p element in button scope,
    /// then close a p element."
    #[must_use]
    pub fn closes_paragraph(self) -> bool {
        matches!(
            self,
            Self::ADDRESS
                | Self::ARTICLE
                | Self::ASIDE
                | Self::BLOCKQUOTE
                | Self::CENTER
                | Self::DETAILS
                | Self::DIALOG
                | Self::DIR
                | Self::DIV
                | Self::DL
                | Self::FIELDSET
                | Self::FIGCAPTION
                | Self::FIGURE
                | Self::FOOTER
                | Self::FORM
                | Self::H1
                | Self::H2
                | Self::H3
                | Self::H4
                | Self::H5
                | Self::H6
                | Self::HEADER
                | Self::HGROUP
                | Self::HR
                | Self::MAIN
                | Self::MENU
                | Self::NAV
                | Self::OL
                | Self::P
                | Self::PRE
                | Self::SECTION
                | Self::SUMMARY
                | Self::TABLE
                | Self::UL
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_lookup_roundtrip() {
        assert_eq!(known_tag_id("div"), Some(TagId::DIV));
        assert_eq!(TagId::DIV.known_name(), Some("div"));
        assert_eq!(known_tag_id("made-up"), None);
    }

    #[test]
    fn ids_match_name_table() {
        for (index, name) in KNOWN_TAG_NAMES.iter().enumerate() {
            assert_eq!(known_tag_id(name), Some(TagId(index as u32)));
        }
    }

    #[test]
    fn category_checks() {
        assert!(TagId::BR.is_void());
        assert!(!TagId::DIV.is_void());
        assert!(TagId::SCRIPT.is_raw_text());
        assert!(TagId::TR.is_table_internal());
        assert!(TagId::DIV.closes_paragraph());
        assert!(!TagId::SPAN.closes_paragraph());
    }
}
