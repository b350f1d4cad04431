//! The cascade: from rule lists to per-element computed styles.
//!
//! [CSS Cascading and Inheritance Level 4 § 6](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! "The cascade takes an unordered list of declared values for a given
//! property on a given element, sorts them by their declaration's
//! precedence, and outputs a single cascaded value."
//!
//! Precedence here is the tuple `(origin+importance weight, selector
//! specificity, document order)`, compared lexicographically.
//! Declarations apply in ascending order so the winner lands last; the
//! whole tuple for any two competing declarations therefore satisfies
//! the cascade-order invariant directly.

use std::collections::HashMap;

use marten_dom::{DomTree, NodeId};

use crate::media::MediaFeatures;
use crate::parser::{parse_declaration_block, Declaration, Rule, Stylesheet};
use crate::selector::{
    ElementStates, MatchContext, PseudoElement, Selector, Specificity,
};
use crate::style::{CascadeEnv, ComputedStyle};

/// [§ 6.2 Cascading Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
///
/// "CSS defines three core origins: Author, User, and User-Agent."
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    /// The engine's built-in master sheet.
    UserAgent,
    /// The host user's sheet.
    User,
    /// Document stylesheets, in document order.
    Author,
}

/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// "Important declarations from origins earlier in this list win over
/// normal declarations from origins later in this list" — importance
/// reverses the origin order. The `style` attribute sits above author
/// rules in both bands.
const fn weight(origin: Origin, from_style_attr: bool, important: bool) -> u8 {
    match (origin, from_style_attr, important) {
        (Origin::UserAgent, _, false) => 0,
        (Origin::User, _, false) => 1,
        (Origin::Author, false, false) => 2,
        (Origin::Author, true, false) => 3,
        (Origin::Author, false, true) => 4,
        (Origin::Author, true, true) => 5,
        (Origin::User, _, true) => 6,
        (Origin::UserAgent, _, true) => 7,
    }
}

/// A style rule flattened out of its sheet, with media conditions
/// already evaluated and a document-order index.
struct FlatRule<'a> {
    origin: Origin,
    selector: &'a Selector,
    declarations: &'a [Declaration],
    order: u32,
}

/// The cascade output: computed styles per element, plus synthesized
/// `::before`/`::after` styles (present only when `content` applies).
#[derive(Debug, Default)]
pub struct StyleMaps {
    /// Computed style per element node.
    pub styles: HashMap<NodeId, ComputedStyle>,
    /// Computed styles for generated pseudo-elements.
    pub pseudo: HashMap<(NodeId, PseudoElement), ComputedStyle>,
}

impl StyleMaps {
    /// The computed style of an element, if it is a styled element node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.styles.get(&id)
    }
}

/// Everything the cascade needs beyond the tree itself.
pub struct CascadeInput<'a> {
    /// Sheets in ascending precedence order within each origin.
    pub sheets: &'a [(Origin, &'a Stylesheet)],
    /// Dynamic pseudo-class state (hover/active/focus).
    pub states: &'a ElementStates,
    /// Container-reported media features for `@media` evaluation.
    pub features: &'a MediaFeatures,
    /// Document language for `:lang()`.
    pub language: &'a str,
    /// Environment callbacks (default font, pt conversion, colors).
    pub env: &'a dyn CascadeEnv,
}

/// Compute styles for every element in the tree.
#[must_use]
pub fn compute_styles(tree: &DomTree, input: &CascadeInput<'_>) -> StyleMaps {
    let mut flat = Vec::new();
    let mut order = 0;
    for (origin, sheet) in input.sheets {
        flatten_rules(*origin, &sheet.rules, input.features, &mut order, &mut flat);
    }

    let ctx = MatchContext {
        tree,
        states: input.states,
        language: input.language,
    };

    let mut maps = StyleMaps::default();
    let root_style = None;
    compute_subtree(
        tree,
        tree.root(),
        &flat,
        &ctx,
        input,
        root_style,
        input.env.default_font_size(),
        &mut maps,
    );
    maps
}

/// Walk sheets into the flat rule list, honoring `@media` conditions.
/// `@import` rules are spliced by the document layer before the cascade
/// runs, so only their guard is checked here if any survived.
fn flatten_rules<'a>(
    origin: Origin,
    rules: &'a [Rule],
    features: &MediaFeatures,
    order: &mut u32,
    out: &mut Vec<FlatRule<'a>>,
) {
    for rule in rules {
        match rule {
            Rule::Style(style_rule) => {
                for selector in &style_rule.selectors {
                    out.push(FlatRule {
                        origin,
                        selector,
                        declarations: &style_rule.declarations,
                        order: *order,
                    });
                }
                *order += 1;
            }
            Rule::Media(media_rule) => {
                if media_rule.query.evaluate(features) {
                    flatten_rules(origin, &media_rule.rules, features, order, out);
                }
            }
            // Imports are resolved (fetched and replaced) upstream;
            // font-face feeds the font resolver; page is paged-media
            // only.
            Rule::Import(_) | Rule::FontFace(_) | Rule::Page(_) => {}
        }
    }
}

/// One candidate declaration with its full cascade sort key.
struct Candidate<'a> {
    weight: u8,
    specificity: Specificity,
    order: u32,
    declaration: &'a Declaration,
}

#[allow(clippy::too_many_arguments)]
fn compute_subtree(
    tree: &DomTree,
    node: NodeId,
    flat: &[FlatRule<'_>],
    ctx: &MatchContext<'_>,
    input: &CascadeInput<'_>,
    parent_style: Option<&ComputedStyle>,
    root_font_size: f32,
    maps: &mut StyleMaps,
) {
    let Some(element) = tree.as_element(node) else {
        // Document and non-element nodes pass inherited context through.
        for &child in tree.children(node) {
            compute_subtree(tree, child, flat, ctx, input, parent_style, root_font_size, maps);
        }
        return;
    };

    // STEP 1: collect matching declarations with their sort keys.
    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for rule in flat {
        if rule.selector.pseudo_element.is_some() {
            continue;
        }
        if rule.selector.matches(ctx, node) {
            for declaration in rule.declarations {
                candidates.push(Candidate {
                    weight: weight(rule.origin, false, declaration.important),
                    specificity: rule.selector.specificity,
                    order: rule.order,
                    declaration,
                });
            }
        }
    }

    // STEP 2: the element's style attribute joins the author band above
    // every author sheet rule.
    let style_attr_declarations = element
        .attrs
        .get("style")
        .map(parse_declaration_block)
        .unwrap_or_default();
    for declaration in &style_attr_declarations {
        candidates.push(Candidate {
            weight: weight(Origin::Author, true, declaration.important),
            specificity: Specificity::default(),
            order: u32::MAX,
            declaration,
        });
    }

    // STEP 3: sort ascending; the stable sort keeps declaration order
    // inside a block, so "last declaration wins" falls out of applying
    // in sequence.
    candidates.sort_by_key(|c| (c.weight, c.specificity, c.order));

    // STEP 4: inheritance, then application, then resolution.
    let mut style = parent_style.map_or_else(
        || ComputedStyle::initial(input.env),
        |parent| ComputedStyle::inherit_from(parent, input.env),
    );
    for candidate in &candidates {
        style.apply_declaration(candidate.declaration, input.env);
    }
    style.finish(parent_style, root_font_size, input.env);

    // The root element's computed font size anchors `rem` for the whole
    // subtree.
    let root_font_size = if parent_style.is_none() {
        style.font_size
    } else {
        root_font_size
    };

    // STEP 5: generated content for ::before / ::after.
    for pseudo in [PseudoElement::Before, PseudoElement::After] {
        if let Some(pseudo_style) =
            compute_pseudo(node, pseudo, flat, ctx, input, &style, root_font_size)
        {
            let _ = maps.pseudo.insert((node, pseudo), pseudo_style);
        }
    }

    let _ = maps.styles.insert(node, style);

    let parent_style = maps.styles.get(&node).cloned();
    for &child in tree.children(node) {
        compute_subtree(
            tree,
            child,
            flat,
            ctx,
            input,
            parent_style.as_ref(),
            root_font_size,
            maps,
        );
    }
}

/// [§ Generated content](https://www.w3.org/TR/CSS2/generate.html#before-after-content)
///
/// "Authors specify the style and location of generated content with
/// the :before and :after pseudo-elements." The pseudo-element inherits
/// from its origin element; it only generates a box when `content`
/// computed to something.
fn compute_pseudo(
    node: NodeId,
    pseudo: PseudoElement,
    flat: &[FlatRule<'_>],
    ctx: &MatchContext<'_>,
    input: &CascadeInput<'_>,
    element_style: &ComputedStyle,
    root_font_size: f32,
) -> Option<ComputedStyle> {
    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for rule in flat {
        if rule.selector.pseudo_element != Some(pseudo) {
            continue;
        }
        if rule.selector.matches(ctx, node) {
            for declaration in rule.declarations {
                candidates.push(Candidate {
                    weight: weight(rule.origin, false, declaration.important),
                    specificity: rule.selector.specificity,
                    order: rule.order,
                    declaration,
                });
            }
        }
    }
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(|c| (c.weight, c.specificity, c.order));

    let mut style = ComputedStyle::inherit_from(element_style, input.env);
    for candidate in &candidates {
        style.apply_declaration(candidate.declaration, input.env);
    }
    style.finish(Some(element_style), root_font_size, input.env);

    style.content.is_some().then_some(style)
}
