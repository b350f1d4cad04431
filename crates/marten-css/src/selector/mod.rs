//! CSS selector compilation and matching.
//!
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//!
//! Selectors compile to a linear sequence of compound-selector groups
//! joined by combinators. The matcher walks *right-to-left*: the
//! rightmost compound is checked against the candidate element, then the
//! combinator chain is followed leftwards to an ancestor or sibling,
//! backtracking where the combinator allows more than one anchor.
//!
//! Tag names in selectors are interned against the built-in tag table at
//! compile time; matching a known tag is an integer compare. Dynamic
//! pseudo-classes (`:hover`, `:active`, `:focus`) read the document's
//! [`ElementStates`], which hit testing maintains.

use std::collections::HashSet;

use marten_dom::{known_tag_id, DomTree, ElementData, NodeId, TagId};

mod parse;

pub use parse::parse_selector_list;

/// [§ 17 Calculating a selector's specificity](https://www.w3.org/TR/selectors-4/#specificity)
///
/// "A selector's specificity is calculated for a given element as
/// follows: count the number of ID selectors (A), count the number of
/// class selectors, attributes selectors, and pseudo-classes (B), count
/// the number of type selectors and pseudo-elements (C)."
///
/// The triple is packed into a single `u32` (10 bits per component) so
/// the cascade compares specificities with one integer compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(u32);

impl Specificity {
    const SHIFT: u32 = 10;
    const MASK: u32 = (1 << Self::SHIFT) - 1;

    /// Pack an `(a, b, c)` triple. Components saturate at 1023, which
    /// keeps lexicographic order for any real-world selector.
    #[must_use]
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        let clamp = |v: u32| v.min(Self::MASK);
        Self((clamp(a) << (2 * Self::SHIFT)) | (clamp(b) << Self::SHIFT) | clamp(c))
    }

    /// The id-selector count.
    #[must_use]
    pub const fn a(self) -> u32 {
        (self.0 >> (2 * Self::SHIFT)) & Self::MASK
    }

    /// The class/attribute/pseudo-class count.
    #[must_use]
    pub const fn b(self) -> u32 {
        (self.0 >> Self::SHIFT) & Self::MASK
    }

    /// The type/pseudo-element count.
    #[must_use]
    pub const fn c(self) -> u32 {
        self.0 & Self::MASK
    }

    /// Component-wise addition (used for `:not(...)` inner selectors).
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self::new(
            self.a() + other.a(),
            self.b() + other.b(),
            self.c() + other.c(),
        )
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B` — B anywhere under A.
    Descendant,
    /// `A > B` — B a child of A.
    Child,
    /// `A + B` — B immediately after A.
    Adjacent,
    /// `A ~ B` — B after A among the same siblings.
    GeneralSibling,
}

/// The tag part of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMatch {
    /// `*` or no tag given.
    Any,
    /// A built-in tag; matched by id.
    Known(TagId),
    /// An author-defined tag; matched by lowercase name.
    Custom(String),
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals,
    /// `[attr~=v]` — whitespace-separated word list contains `v`.
    Includes,
    /// `[attr|=v]` — exactly `v` or `v-` prefixed.
    DashMatch,
    /// `[attr^=v]`
    Prefix,
    /// `[attr$=v]`
    Suffix,
    /// `[attr*=v]`
    Substring,
}

/// One attribute predicate. Names compare case-insensitively (they are
/// stored lowercased); values compare case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Lowercased attribute name.
    pub name: String,
    /// The comparison operator.
    pub op: AttrOp,
    /// The expected value (empty for [`AttrOp::Exists`]).
    pub value: String,
}

/// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    /// `:root`
    Root,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:empty`
    Empty,
    /// `:nth-child(an+b)`
    NthChild {
        /// The step.
        a: i32,
        /// The offset.
        b: i32,
    },
    /// `:link` — an `<a>` with an href; the engine tracks no history, so
    /// all links are unvisited.
    Link,
    /// `:hover`
    Hover,
    /// `:active`
    Active,
    /// `:focus`
    Focus,
    /// `:disabled`
    Disabled,
    /// `:enabled`
    Enabled,
    /// `:checked`
    Checked,
    /// `:lang(xx)`
    Lang(String),
    /// `:not(<compound>)`
    Not(Box<CompoundSelector>),
    /// A recognized-but-unsupported pseudo-class. Parses (so the rest of
    /// the selector list survives) but never matches.
    NeverMatch,
}

/// [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    /// `::before`
    Before,
    /// `::after`
    After,
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator: a set of simultaneous conditions on a
/// single element."
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    /// The tag condition.
    pub tag: Option<TagMatch>,
    /// `#id` conditions.
    pub ids: Vec<String>,
    /// `.class` conditions.
    pub classes: Vec<String>,
    /// `[attr...]` conditions.
    pub attrs: Vec<AttributeSelector>,
    /// Pseudo-class conditions.
    pub pseudo_classes: Vec<PseudoClass>,
}

/// A complete compiled selector: compound groups joined by combinators,
/// an optional pseudo-element, and the packed specificity.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Compound groups in source order. `parts[i].0` relates group `i`
    /// to group `i-1`; the first group's combinator is ignored.
    pub parts: Vec<(Combinator, CompoundSelector)>,
    /// `::before` / `::after`, if the selector targets one.
    pub pseudo_element: Option<PseudoElement>,
    /// Packed specificity, computed at compile time.
    pub specificity: Specificity,
}

/// Dynamic element state consulted by `:hover`, `:active`, `:focus`.
/// Owned by the document; hit testing mutates it between style passes.
#[derive(Debug, Clone, Default)]
pub struct ElementStates {
    /// Elements currently under the pointer (hit element + ancestors).
    pub hovered: HashSet<NodeId>,
    /// Elements in the active (pressed) chain.
    pub active: HashSet<NodeId>,
    /// The focused element, if any.
    pub focused: Option<NodeId>,
}

impl ElementStates {
    /// Clear all dynamic state (pointer left the document).
    pub fn clear(&mut self) {
        self.hovered.clear();
        self.active.clear();
        self.focused = None;
    }
}

/// Everything selector matching needs besides the selector itself.
pub struct MatchContext<'a> {
    /// The document tree.
    pub tree: &'a DomTree,
    /// Dynamic pseudo-class state.
    pub states: &'a ElementStates,
    /// The document language, for `:lang()` (container-reported).
    pub language: &'a str,
}

impl Selector {
    /// Match this selector against `element`, walking right-to-left.
    #[must_use]
    pub fn matches(&self, ctx: &MatchContext<'_>, element: NodeId) -> bool {
        let Some((_, rightmost)) = self.parts.last() else {
            return false;
        };
        if !matches_compound(ctx, rightmost, element) {
            return false;
        }
        if self.parts.len() == 1 {
            return true;
        }
        matches_left(ctx, &self.parts, self.parts.len() - 1, element)
    }
}

/// Match `parts[..index]` against elements left of `anchor`, following
/// `parts[index].0` (the combinator between `index-1` and `index`).
fn matches_left(
    ctx: &MatchContext<'_>,
    parts: &[(Combinator, CompoundSelector)],
    index: usize,
    anchor: NodeId,
) -> bool {
    let combinator = parts[index].0;
    let target = &parts[index - 1].1;

    let mut try_candidate = |candidate: NodeId| -> bool {
        if !matches_compound(ctx, target, candidate) {
            return false;
        }
        if index == 1 {
            return true;
        }
        matches_left(ctx, parts, index - 1, candidate)
    };

    match combinator {
        // "A descendant combinator represents an element B that is an
        // arbitrary descendant of some ancestor element A" — try every
        // ancestor, nearest first.
        Combinator::Descendant => ctx
            .tree
            .ancestors(anchor)
            .filter(|&a| ctx.tree.as_element(a).is_some())
            .any(&mut try_candidate),
        Combinator::Child => ctx
            .tree
            .parent(anchor)
            .filter(|&p| ctx.tree.as_element(p).is_some())
            .is_some_and(&mut try_candidate),
        // "B immediately preceded by A" — the nearest preceding element
        // sibling only.
        Combinator::Adjacent => ctx
            .tree
            .preceding_siblings(anchor)
            .find(|&s| ctx.tree.as_element(s).is_some())
            .is_some_and(&mut try_candidate),
        Combinator::GeneralSibling => ctx
            .tree
            .preceding_siblings(anchor)
            .filter(|&s| ctx.tree.as_element(s).is_some())
            .any(&mut try_candidate),
    }
}

/// Match one compound selector against one element.
fn matches_compound(ctx: &MatchContext<'_>, compound: &CompoundSelector, element: NodeId) -> bool {
    let Some(data) = ctx.tree.as_element(element) else {
        return false;
    };

    match &compound.tag {
        None | Some(TagMatch::Any) => {}
        Some(TagMatch::Known(tag)) => {
            if data.tag != *tag {
                return false;
            }
        }
        Some(TagMatch::Custom(name)) => {
            if data.tag_name != *name {
                return false;
            }
        }
    }

    for id in &compound.ids {
        if data.id() != Some(id.as_str()) {
            return false;
        }
    }
    for class in &compound.classes {
        if !data.has_class(class) {
            return false;
        }
    }
    for attr in &compound.attrs {
        if !matches_attribute(data, attr) {
            return false;
        }
    }
    for pseudo in &compound.pseudo_classes {
        if !matches_pseudo_class(ctx, pseudo, element, data) {
            return false;
        }
    }
    true
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
fn matches_attribute(data: &ElementData, attr: &AttributeSelector) -> bool {
    let Some(actual) = data.attrs.get(&attr.name) else {
        return false;
    };
    let expected = attr.value.as_str();
    match attr.op {
        AttrOp::Exists => true,
        AttrOp::Equals => actual == expected,
        // "a whitespace-separated list of words, one of which is exactly
        // the value"
        AttrOp::Includes => actual.split_ascii_whitespace().any(|word| word == expected),
        // "exactly the value or beginning with the value immediately
        // followed by a hyphen"
        AttrOp::DashMatch => {
            actual == expected
                || (actual.len() > expected.len()
                    && actual.starts_with(expected)
                    && actual.as_bytes()[expected.len()] == b'-')
        }
        AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

fn matches_pseudo_class(
    ctx: &MatchContext<'_>,
    pseudo: &PseudoClass,
    element: NodeId,
    data: &ElementData,
) -> bool {
    match pseudo {
        PseudoClass::Root => Some(element) == ctx.tree.document_element(),
        PseudoClass::FirstChild => ctx.tree.element_index(element) == Some(1),
        PseudoClass::LastChild => ctx.tree.parent(element).is_some_and(|p| {
            ctx.tree.element_index(element) == Some(ctx.tree.element_child_count(p))
        }),
        PseudoClass::OnlyChild => {
            ctx.tree
                .parent(element)
                .is_some_and(|p| ctx.tree.element_child_count(p) == 1)
        }
        // ":empty represents an element that has no children at all."
        PseudoClass::Empty => ctx.tree.children(element).is_empty(),
        PseudoClass::NthChild { a, b } => ctx
            .tree
            .element_index(element)
            .is_some_and(|index| nth_matches(*a, *b, index as i32)),
        PseudoClass::Link => data.tag == TagId::A && data.attrs.contains("href"),
        PseudoClass::Hover => ctx.states.hovered.contains(&element),
        PseudoClass::Active => ctx.states.active.contains(&element),
        PseudoClass::Focus => ctx.states.focused == Some(element),
        PseudoClass::Disabled => data.attrs.contains("disabled"),
        PseudoClass::Enabled => {
            matches!(
                data.tag,
                TagId::INPUT | TagId::BUTTON | TagId::SELECT | TagId::TEXTAREA | TagId::OPTION
            ) && !data.attrs.contains("disabled")
        }
        PseudoClass::Checked => data.attrs.contains("checked"),
        // ":lang(C) is matched when the content language is C or a
        // sub-language of C" — lang attributes override the
        // container-reported document language.
        PseudoClass::Lang(expected) => {
            let language = element_language(ctx, element);
            let language = language.as_deref().unwrap_or(ctx.language);
            language.eq_ignore_ascii_case(expected)
                || (language.len() > expected.len()
                    && language[..expected.len()].eq_ignore_ascii_case(expected)
                    && language.as_bytes()[expected.len()] == b'-')
        }
        // ":not matches by running the inner selector against the
        // current element and inverting."
        PseudoClass::Not(inner) => !matches_compound(ctx, inner, element),
        PseudoClass::NeverMatch => false,
    }
}

/// Nearest `lang` attribute on the element or an ancestor.
fn element_language(ctx: &MatchContext<'_>, element: NodeId) -> Option<String> {
    std::iter::once(element)
        .chain(ctx.tree.ancestors(element))
        .find_map(|id| {
            ctx.tree
                .as_element(id)
                .and_then(|e| e.attrs.get("lang"))
                .map(str::to_string)
        })
}

/// [§ 4.12.3 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
///
/// "Matches iff there exists a non-negative integer k such that
/// a·k + b equals the element's 1-based index among its element
/// siblings." `a = 0` degenerates to exact equality with `b`.
fn nth_matches(a: i32, b: i32, index: i32) -> bool {
    if a == 0 {
        return index == b;
    }
    let diff = index - b;
    diff % a == 0 && diff / a >= 0
}

/// Intern a selector tag name at compile time.
#[must_use]
pub fn compile_tag(name: &str) -> TagMatch {
    let lower = name.to_ascii_lowercase();
    known_tag_id(&lower).map_or(TagMatch::Custom(lower), TagMatch::Known)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specificity_packs_lexicographically() {
        let id = Specificity::new(1, 0, 0);
        let two_classes = Specificity::new(0, 2, 0);
        let type_only = Specificity::new(0, 0, 1);
        assert!(id > two_classes);
        assert!(two_classes > type_only);
        assert_eq!(two_classes.b(), 2);
        assert_eq!(Specificity::new(0, 2, 0), two_classes);
    }

    #[test]
    fn nth_child_formula() {
        // 2n+1: odd indices.
        assert!(nth_matches(2, 1, 1));
        assert!(!nth_matches(2, 1, 2));
        assert!(nth_matches(2, 1, 5));
        // 0n+3: exactly the third.
        assert!(nth_matches(0, 3, 3));
        assert!(!nth_matches(0, 3, 6));
        // -n+3: first three.
        assert!(nth_matches(-1, 3, 1));
        assert!(nth_matches(-1, 3, 3));
        assert!(!nth_matches(-1, 3, 4));
        // 3n: every third, k must stay non-negative.
        assert!(nth_matches(3, 0, 3));
        assert!(!nth_matches(3, 0, 2));
        assert!(!nth_matches(2, 5, 1));
    }
}
