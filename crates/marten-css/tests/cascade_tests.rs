//! Cascade ordering: origins, importance, specificity, document order,
//! inheritance, media conditions, and generated content.

use marten_css::cascade::{compute_styles, CascadeInput, Origin};
use marten_css::selector::ElementStates;
use marten_css::style::DefaultEnv;
use marten_css::{
    extract_style_content, MediaFeatures, PseudoElement, Stylesheet, StyleMaps, WebColor,
};
use marten_dom::{DomTree, NodeId, TagId};
use marten_html::parse_document;

fn find(tree: &DomTree, tag: TagId) -> NodeId {
    tree.iter_all()
        .find(|&id| tree.tag(id) == Some(tag))
        .expect("tag present")
}

fn cascade(tree: &DomTree, sheets: &[(Origin, &Stylesheet)]) -> StyleMaps {
    cascade_with_features(tree, sheets, &MediaFeatures::default())
}

fn cascade_with_features(
    tree: &DomTree,
    sheets: &[(Origin, &Stylesheet)],
    features: &MediaFeatures,
) -> StyleMaps {
    let states = ElementStates::default();
    let env = DefaultEnv;
    compute_styles(
        tree,
        &CascadeInput {
            sheets,
            states: &states,
            features,
            language: "en",
            env: &env,
        },
    )
}

fn author_cascade(html: &str, css: &str) -> (DomTree, StyleMaps) {
    let tree = parse_document(html.as_bytes());
    let sheet = Stylesheet::parse(css);
    let maps = cascade(&tree, &[(Origin::Author, &sheet)]);
    (tree, maps)
}

#[test]
fn class_pair_applies_color() {
    let (tree, maps) = author_cascade(
        "<p class=\"a b\">x</p>",
        ".a.b { color: red }",
    );
    let p = find(&tree, TagId::P);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(255, 0, 0));
}

#[test]
fn higher_specificity_wins() {
    let (tree, maps) = author_cascade(
        "<p id=\"x\" class=\"note\">x</p>",
        "p { color: blue } .note { color: green } #x { color: red }",
    );
    let p = find(&tree, TagId::P);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(255, 0, 0));
}

#[test]
fn later_rule_wins_at_equal_specificity() {
    let (tree, maps) = author_cascade(
        "<p>x</p>",
        "p { color: blue } p { color: green }",
    );
    let p = find(&tree, TagId::P);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(0, 128, 0));
}

#[test]
fn important_beats_specificity() {
    let (tree, maps) = author_cascade(
        "<p id=\"x\">x</p>",
        "p { color: green !important } #x { color: red }",
    );
    let p = find(&tree, TagId::P);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(0, 128, 0));
}

#[test]
fn author_overrides_user_agent_and_user() {
    let tree = parse_document(b"<p>x</p>");
    let ua = Stylesheet::parse("p { color: black; margin-top: 16px }");
    let user = Stylesheet::parse("p { color: blue }");
    let author = Stylesheet::parse("p { color: red }");
    let maps = cascade(
        &tree,
        &[
            (Origin::UserAgent, &ua),
            (Origin::User, &user),
            (Origin::Author, &author),
        ],
    );
    let p = find(&tree, TagId::P);
    let style = maps.get(p).unwrap();
    assert_eq!(style.color, WebColor::rgb(255, 0, 0));
    // The UA margin survives untouched.
    assert!((style.margin.top.val() - 16.0).abs() < f32::EPSILON);
}

#[test]
fn important_reverses_origin_precedence() {
    let tree = parse_document(b"<p>x</p>");
    let user = Stylesheet::parse("p { color: blue !important }");
    let author = Stylesheet::parse("p { color: red !important }");
    let maps = cascade(&tree, &[(Origin::User, &user), (Origin::Author, &author)]);
    let p = find(&tree, TagId::P);
    // "Important declarations from the user origin win over important
    // declarations from the author origin."
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(0, 0, 255));
}

#[test]
fn style_attribute_beats_sheets() {
    let (tree, maps) = author_cascade(
        "<p id=\"x\" style=\"color: green\">x</p>",
        "#x { color: red }",
    );
    let p = find(&tree, TagId::P);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(0, 128, 0));
}

#[test]
fn important_sheet_rule_beats_style_attribute() {
    let (tree, maps) = author_cascade(
        "<p style=\"color: green\">x</p>",
        "p { color: red !important }",
    );
    let p = find(&tree, TagId::P);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(255, 0, 0));
}

#[test]
fn inherited_and_non_inherited_properties() {
    let (tree, maps) = author_cascade(
        "<div><p>x</p></div>",
        "div { color: red; background-color: blue; line-height: 1.6 }",
    );
    let p = find(&tree, TagId::P);
    let style = maps.get(p).unwrap();
    assert_eq!(style.color, WebColor::rgb(255, 0, 0));
    assert!(style.background_color.is_transparent());
    assert_eq!(
        style.line_height,
        marten_css::style::LineHeight::Number(1.6)
    );
}

#[test]
fn font_size_chain() {
    let (tree, maps) = author_cascade(
        "<div><h1><span>x</span></h1></div>",
        "div { font-size: 10px } h1 { font-size: 200% }",
    );
    let h1 = find(&tree, TagId::H1);
    let span = find(&tree, TagId::SPAN);
    assert!((maps.get(h1).unwrap().font_size - 20.0).abs() < f32::EPSILON);
    // The span inherits h1's computed size, not the percentage.
    assert!((maps.get(span).unwrap().font_size - 20.0).abs() < f32::EPSILON);
}

#[test]
fn media_query_gates_rules() {
    let tree = parse_document(b"<p>x</p>");
    let sheet = Stylesheet::parse(
        "@media (max-width: 600px) { p { color: red } } p { margin-top: 5px }",
    );
    let p = find(&tree, TagId::P);

    let narrow = MediaFeatures {
        width: 400,
        ..MediaFeatures::default()
    };
    let maps = cascade_with_features(&tree, &[(Origin::Author, &sheet)], &narrow);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(255, 0, 0));

    let wide = MediaFeatures {
        width: 1000,
        ..MediaFeatures::default()
    };
    let maps = cascade_with_features(&tree, &[(Origin::Author, &sheet)], &wide);
    assert_eq!(maps.get(p).unwrap().color, WebColor::BLACK);
    // Rules outside the media block are unaffected.
    assert!((maps.get(p).unwrap().margin.top.val() - 5.0).abs() < f32::EPSILON);
}

#[test]
fn generated_content_styles() {
    let (tree, maps) = author_cascade(
        "<p class=note>x</p>",
        ".note::before { content: \"* \"; color: red } .note::after { color: blue }",
    );
    let p = find(&tree, TagId::P);
    let before = maps.pseudo.get(&(p, PseudoElement::Before)).expect("::before");
    assert_eq!(before.content.as_deref(), Some("* "));
    assert_eq!(before.color, WebColor::rgb(255, 0, 0));
    // ::after without content generates nothing.
    assert!(!maps.pseudo.contains_key(&(p, PseudoElement::After)));
}

#[test]
fn style_extraction_from_document() {
    let tree = parse_document(
        b"<html><head><style>p { color: red }</style></head><body><p>x</p></body></html>",
    );
    let css = extract_style_content(&tree);
    assert!(css.contains("color: red"));
    let sheet = Stylesheet::parse(&css);
    let maps = cascade(&tree, &[(Origin::Author, &sheet)]);
    let p = find(&tree, TagId::P);
    assert_eq!(maps.get(p).unwrap().color, WebColor::rgb(255, 0, 0));
}

#[test]
fn invalid_declaration_does_not_poison_block() {
    let (tree, maps) = author_cascade(
        "<p>x</p>",
        "p { color: bogus-color; margin-top: 7px }",
    );
    let p = find(&tree, TagId::P);
    let style = maps.get(p).unwrap();
    assert_eq!(style.color, WebColor::BLACK);
    assert!((style.margin.top.val() - 7.0).abs() < f32::EPSILON);
}
