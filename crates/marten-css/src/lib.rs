//! CSS engine for Marten: tokenizer, parser, selectors, cascade, and
//! computed styles.
//!
//! # Scope
//!
//! - **Tokenizer** ([CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization))
//! - **Rule/declaration parser** with `@media`, `@import`, `@font-face`,
//!   `@page` and shorthand expansion before storage
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/)):
//!   compiled compound groups, right-to-left matching, packed
//!   specificity, structural and dynamic pseudo-classes,
//!   `::before`/`::after`
//! - **Values**: lengths with deferred percentages, full named-color
//!   table with clamping, `calc()` trees
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/)):
//!   origin + importance + specificity + order, inheritance, computed
//!   font sizes
//! - **Media queries** evaluated against container-reported features
//!
//! All parse paths recover: malformed CSS drops the smallest invalid
//! unit (a declaration, a selector, a rule) and keeps going.

pub mod cascade;
pub mod media;
pub mod parser;
pub mod properties;
pub mod selector;
pub mod style;
pub mod tokenizer;
pub mod values;

pub use cascade::{compute_styles, CascadeInput, Origin, StyleMaps};
pub use media::{MediaFeatures, MediaQueryList, MediaType};
pub use parser::{
    parse_component_values, parse_declaration_block, ComponentValue, CssParser, Declaration, Rule,
    Stylesheet,
};
pub use properties::PropertyId;
pub use selector::{
    parse_selector_list, ElementStates, MatchContext, PseudoElement, Selector, Specificity,
};
pub use style::{CascadeEnv, ComputedStyle, DefaultEnv, Display};
pub use tokenizer::{CssToken, CssTokenizer};
pub use values::{CalcExpr, Length, LengthUnit, WebColor};

use marten_dom::{DomTree, NodeId, NodeKind, TagId};

/// Extract CSS text from all `<style>` elements, in document order.
///
/// [HTML § 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
#[must_use]
pub fn extract_style_content(tree: &DomTree) -> String {
    let mut css = String::new();
    for id in tree.iter_all() {
        if tree.tag(id) == Some(TagId::STYLE) {
            for &child in tree.children(id) {
                if let Some(text) = tree.as_text(child) {
                    css.push_str(text);
                    css.push('\n');
                }
            }
        }
    }
    css
}

/// A `<link rel="stylesheet">` reference found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetLink {
    /// The node that carried the link.
    pub node: NodeId,
    /// The `href` attribute.
    pub href: String,
    /// The raw `media` attribute, if any.
    pub media: Option<String>,
}

/// Collect external stylesheet references, in document order. The
/// embedding layer fetches them through the container's `import_css`.
#[must_use]
pub fn collect_stylesheet_links(tree: &DomTree) -> Vec<StylesheetLink> {
    let mut links = Vec::new();
    for id in tree.iter_all() {
        let Some(NodeKind::Element(data)) = tree.get(id).map(|n| &n.kind) else {
            continue;
        };
        if data.tag != TagId::LINK {
            continue;
        }
        let is_stylesheet = data
            .attrs
            .get("rel")
            .is_some_and(|rel| rel.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case("stylesheet")));
        if !is_stylesheet {
            continue;
        }
        let Some(href) = data.attrs.get("href") else {
            continue;
        };
        links.push(StylesheetLink {
            node: id,
            href: href.to_string(),
            media: data.attrs.get("media").map(str::to_string),
        });
    }
    links
}
