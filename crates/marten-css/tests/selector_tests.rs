//! Selector compilation and matching against real parsed documents.

use marten_css::selector::{ElementStates, MatchContext};
use marten_css::{parse_component_values, parse_selector_list, PseudoElement, Selector};
use marten_dom::{DomTree, NodeId, TagId};
use marten_html::parse_document;

fn compile(text: &str) -> Selector {
    let mut list = parse_selector_list(&parse_component_values(text));
    assert_eq!(list.len(), 1, "expected one selector for {text:?}");
    list.remove(0)
}

fn find(tree: &DomTree, tag: TagId) -> NodeId {
    tree.iter_all()
        .find(|&id| tree.tag(id) == Some(tag))
        .expect("tag present")
}

fn matches_on(tree: &DomTree, selector: &str, node: NodeId) -> bool {
    let states = ElementStates::default();
    let ctx = MatchContext {
        tree,
        states: &states,
        language: "en",
    };
    compile(selector).matches(&ctx, node)
}

#[test]
fn type_class_and_id() {
    let tree = parse_document(b"<div id=\"main\" class=\"a b\"><p>x</p></div>");
    let div = find(&tree, TagId::DIV);
    let p = find(&tree, TagId::P);

    assert!(matches_on(&tree, "div", div));
    assert!(!matches_on(&tree, "div", p));
    assert!(matches_on(&tree, "*", p));
    assert!(matches_on(&tree, ".a", div));
    assert!(matches_on(&tree, ".a.b", div));
    assert!(!matches_on(&tree, ".a.c", div));
    assert!(matches_on(&tree, "#main", div));
    assert!(matches_on(&tree, "div#main.a", div));
}

#[test]
fn specificity_triples() {
    assert_eq!(compile(".a.b").specificity, marten_css::Specificity::new(0, 2, 0));
    assert_eq!(compile("#x").specificity, marten_css::Specificity::new(1, 0, 0));
    assert_eq!(compile("p").specificity, marten_css::Specificity::new(0, 0, 1));
    assert_eq!(
        compile("div p.note:first-child").specificity,
        marten_css::Specificity::new(0, 2, 2)
    );
    assert_eq!(
        compile("p::before").specificity,
        marten_css::Specificity::new(0, 0, 2)
    );
    // :not() contributes its argument's specificity.
    assert_eq!(
        compile("p:not(.x)").specificity,
        marten_css::Specificity::new(0, 1, 1)
    );
}

#[test]
fn combinators() {
    let tree = parse_document(
        b"<div><p id=one>1</p><span>s</span><p id=two>2</p></div><p id=out>3</p>",
    );
    let one = find(&tree, TagId::P);
    let two = tree
        .iter_all()
        .filter(|&id| tree.tag(id) == Some(TagId::P))
        .nth(1)
        .unwrap();
    let out = tree
        .iter_all()
        .filter(|&id| tree.tag(id) == Some(TagId::P))
        .nth(2)
        .unwrap();

    // Descendant.
    assert!(matches_on(&tree, "div p", one));
    assert!(matches_on(&tree, "body p", out));
    assert!(!matches_on(&tree, "div p", out));
    // Child.
    assert!(matches_on(&tree, "div > p", one));
    assert!(!matches_on(&tree, "body > p", one));
    // Adjacent sibling: span + p is the second p.
    assert!(matches_on(&tree, "span + p", two));
    assert!(!matches_on(&tree, "span + p", one));
    // General sibling.
    assert!(matches_on(&tree, "p ~ p", two));
    assert!(!matches_on(&tree, "p ~ p", one));
}

#[test]
fn attribute_operators() {
    let tree = parse_document(
        b"<a href=\"https://example.com/page.html\" class=\"btn active\" lang=\"en-US\" data-x=\"abc\">x</a>",
    );
    let a = find(&tree, TagId::A);

    assert!(matches_on(&tree, "[href]", a));
    assert!(!matches_on(&tree, "[missing]", a));
    assert!(matches_on(&tree, "[data-x=abc]", a));
    assert!(!matches_on(&tree, "[data-x=ABC]", a));
    assert!(matches_on(&tree, "[class~=active]", a));
    assert!(!matches_on(&tree, "[class~=act]", a));
    assert!(matches_on(&tree, "[lang|=en]", a));
    assert!(!matches_on(&tree, "[lang|=e]", a));
    assert!(matches_on(&tree, "[href^=https]", a));
    assert!(matches_on(&tree, "[href$=\".html\"]", a));
    assert!(matches_on(&tree, "[href*=example]", a));
    assert!(!matches_on(&tree, "[href*=nowhere]", a));
}

#[test]
fn nth_child_two_n_plus_one() {
    let tree = parse_document(b"<ul><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ul>");
    let items: Vec<NodeId> = tree
        .iter_all()
        .filter(|&id| tree.tag(id) == Some(TagId::LI))
        .collect();
    assert_eq!(items.len(), 5);

    let expected = [true, false, true, false, true];
    for (item, expect) in items.iter().zip(expected) {
        assert_eq!(matches_on(&tree, ":nth-child(2n+1)", *item), expect);
    }
    // Exact index form.
    for (index, item) in items.iter().enumerate() {
        assert_eq!(matches_on(&tree, ":nth-child(3)", *item), index == 2);
    }
    // -n+2: only the first two.
    let expected = [true, true, false, false, false];
    for (item, expect) in items.iter().zip(expected) {
        assert_eq!(matches_on(&tree, ":nth-child(-n+2)", *item), expect);
    }
}

#[test]
fn structural_pseudo_classes() {
    let tree = parse_document(b"<div><p>first</p><p>mid</p><p>last</p><span></span></div>");
    let ps: Vec<NodeId> = tree
        .iter_all()
        .filter(|&id| tree.tag(id) == Some(TagId::P))
        .collect();
    let span = find(&tree, TagId::SPAN);

    assert!(matches_on(&tree, "p:first-child", ps[0]));
    assert!(!matches_on(&tree, "p:first-child", ps[1]));
    assert!(matches_on(&tree, "span:last-child", span));
    assert!(!matches_on(&tree, "p:last-child", ps[2]));
    assert!(matches_on(&tree, "span:empty", span));
    assert!(!matches_on(&tree, "p:empty", ps[0]));
    assert!(matches_on(&tree, ":root", tree.document_element().unwrap()));
}

#[test]
fn not_inverts_compound() {
    let tree = parse_document(b"<div><p class=a>1</p><p class=b>2</p></div>");
    let ps: Vec<NodeId> = tree
        .iter_all()
        .filter(|&id| tree.tag(id) == Some(TagId::P))
        .collect();

    assert!(!matches_on(&tree, "p:not(.a)", ps[0]));
    assert!(matches_on(&tree, "p:not(.a)", ps[1]));
    assert!(matches_on(&tree, ":not(span)", ps[0]));
}

#[test]
fn dynamic_state_pseudo_classes() {
    let tree = parse_document(b"<div><a href=x>link</a></div>");
    let a = find(&tree, TagId::A);

    let mut states = ElementStates::default();
    {
        let ctx = MatchContext {
            tree: &tree,
            states: &states,
            language: "en",
        };
        assert!(!compile("a:hover").matches(&ctx, a));
        assert!(compile("a:link").matches(&ctx, a));
    }

    let _ = states.hovered.insert(a);
    let _ = states.active.insert(a);
    let ctx = MatchContext {
        tree: &tree,
        states: &states,
        language: "en",
    };
    assert!(compile("a:hover").matches(&ctx, a));
    assert!(compile("a:active").matches(&ctx, a));
    assert!(!compile("a:focus").matches(&ctx, a));
}

#[test]
fn lang_matching() {
    let tree = parse_document(b"<div lang=\"fr-CA\"><p>bonjour</p></div>");
    let p = find(&tree, TagId::P);
    assert!(matches_on(&tree, "p:lang(fr)", p));
    assert!(!matches_on(&tree, "p:lang(de)", p));
}

#[test]
fn pseudo_elements_compile() {
    let before = compile("p::before");
    assert_eq!(before.pseudo_element, Some(PseudoElement::Before));
    // Legacy single-colon form.
    let after = compile("p:after");
    assert_eq!(after.pseudo_element, Some(PseudoElement::After));
}

#[test]
fn selector_list_drops_only_bad_entries() {
    let list = parse_selector_list(&parse_component_values("p, ?bad?, div"));
    assert_eq!(list.len(), 2);
}

#[test]
fn custom_tag_names_match_by_name() {
    let tree = parse_document(b"<x-widget>w</x-widget>");
    let widget = tree
        .iter_all()
        .find(|&id| tree.as_element(id).is_some_and(|e| e.tag_name == "x-widget"))
        .unwrap();
    assert!(matches_on(&tree, "x-widget", widget));
    assert!(!matches_on(&tree, "x-other", widget));
}
