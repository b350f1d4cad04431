//! Tree-construction tests: implicit structure, auto-closing, fostering,
//! raw text, and recovery from truncated input.

use marten_dom::{DomTree, NodeId, NodeKind, TagId};
use marten_html::{parse_document, serialize};

fn parse(input: &str) -> DomTree {
    parse_document(input.as_bytes())
}

/// First descendant with the given tag, in document order.
fn find(tree: &DomTree, tag: TagId) -> Option<NodeId> {
    tree.iter_all().find(|&id| tree.tag(id) == Some(tag))
}

fn child_tags(tree: &DomTree, id: NodeId) -> Vec<TagId> {
    tree.children(id)
        .iter()
        .filter_map(|&c| tree.tag(c))
        .collect()
}

fn text_content(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    for node in std::iter::once(id).chain(tree.descendants(id)) {
        if let Some(text) = tree.as_text(node) {
            out.push_str(text);
        }
    }
    out
}

#[test]
fn implicit_document_structure() {
    let tree = parse("hello");
    let html = tree.document_element().expect("html");
    assert_eq!(tree.tag(html), Some(TagId::HTML));
    assert_eq!(child_tags(&tree, html), [TagId::HEAD, TagId::BODY]);
    let body = tree.body().expect("body");
    assert_eq!(text_content(&tree, body), "hello");
}

#[test]
fn empty_input_still_builds_structure() {
    let tree = parse("");
    assert!(tree.document_element().is_some());
    assert!(tree.head().is_some());
    assert!(tree.body().is_some());
}

#[test]
fn explicit_structure_not_duplicated() {
    let tree = parse("<html><head><title>t</title></head><body>x</body></html>");
    let html = tree.document_element().expect("html");
    assert_eq!(child_tags(&tree, html), [TagId::HEAD, TagId::BODY]);
    let head = tree.head().expect("head");
    assert_eq!(child_tags(&tree, head), [TagId::TITLE]);
}

#[test]
fn head_metadata_without_head_tag() {
    let tree = parse("<title>x</title><p>body text</p>");
    let head = tree.head().expect("head");
    assert_eq!(child_tags(&tree, head), [TagId::TITLE]);
    let body = tree.body().expect("body");
    assert_eq!(child_tags(&tree, body), [TagId::P]);
}

#[test]
fn paragraph_closed_by_block_tag() {
    let tree = parse("<p>one<div>two</div>");
    let body = tree.body().expect("body");
    assert_eq!(child_tags(&tree, body), [TagId::P, TagId::DIV]);
    let p = find(&tree, TagId::P).unwrap();
    assert_eq!(text_content(&tree, p), "one");
}

#[test]
fn paragraph_not_closed_by_inline_tag() {
    let tree = parse("<p>one<span>two</span></p>");
    let p = find(&tree, TagId::P).unwrap();
    assert_eq!(text_content(&tree, p), "onetwo");
}

#[test]
fn list_items_close_each_other() {
    let tree = parse("<ul><li>a<li>b<li>c</ul>");
    let ul = find(&tree, TagId::UL).unwrap();
    assert_eq!(child_tags(&tree, ul), [TagId::LI, TagId::LI, TagId::LI]);
}

#[test]
fn definition_terms_close_each_other() {
    let tree = parse("<dl><dt>t<dd>d<dt>t2</dl>");
    let dl = find(&tree, TagId::DL).unwrap();
    assert_eq!(child_tags(&tree, dl), [TagId::DT, TagId::DD, TagId::DT]);
}

#[test]
fn table_cells_and_rows_close_each_other() {
    let tree = parse("<table><tr><td>1<td>2<tr><th>3</table>");
    let table = find(&tree, TagId::TABLE).unwrap();
    assert_eq!(child_tags(&tree, table), [TagId::TR, TagId::TR]);
    let rows: Vec<NodeId> = tree
        .children(table)
        .iter()
        .copied()
        .filter(|&c| tree.tag(c) == Some(TagId::TR))
        .collect();
    assert_eq!(child_tags(&tree, rows[0]), [TagId::TD, TagId::TD]);
    assert_eq!(child_tags(&tree, rows[1]), [TagId::TH]);
}

#[test]
fn non_table_content_is_fostered() {
    let tree = parse("<table><div>oops</div><tr><td>ok</table>");
    let body = tree.body().expect("body");
    // The div lands immediately before the table.
    assert_eq!(child_tags(&tree, body), [TagId::DIV, TagId::TABLE]);
    let div = find(&tree, TagId::DIV).unwrap();
    assert_eq!(text_content(&tree, div), "oops");
}

#[test]
fn text_in_table_is_fostered() {
    let tree = parse("<table>stray<tr><td>x</table>");
    let body = tree.body().expect("body");
    let first = tree.children(body)[0];
    assert_eq!(tree.as_text(first), Some("stray"));
    assert_eq!(tree.tag(tree.children(body)[1]), Some(TagId::TABLE));
}

#[test]
fn script_and_style_bodies_are_single_text_nodes() {
    let tree = parse("<style>p < a { }</style><script>if (a<b) {}</script><p>x");
    let style = find(&tree, TagId::STYLE).unwrap();
    assert_eq!(tree.children(style).len(), 1);
    assert_eq!(text_content(&tree, style), "p < a { }");
    let script = find(&tree, TagId::SCRIPT).unwrap();
    assert_eq!(tree.children(script).len(), 1);
    assert_eq!(text_content(&tree, script), "if (a<b) {}");
}

#[test]
fn unknown_tags_are_generic_elements() {
    let tree = parse("<x-widget data-a=\"1\"><span>inside</span></x-widget>");
    let body = tree.body().expect("body");
    let widget = tree.children(body)[0];
    let data = tree.as_element(widget).expect("element");
    assert!(!data.tag.is_known());
    assert_eq!(data.tag_name, "x-widget");
    assert_eq!(data.attrs.get("data-a"), Some("1"));
    assert_eq!(child_tags(&tree, widget), [TagId::SPAN]);
}

#[test]
fn truncated_input_closes_stack_in_order() {
    let tree = parse("<div><p><em>dangling");
    let div = find(&tree, TagId::DIV).unwrap();
    let p = find(&tree, TagId::P).unwrap();
    let em = find(&tree, TagId::EM).unwrap();
    assert!(tree.is_descendant_of(p, div));
    assert!(tree.is_descendant_of(em, p));
    assert_eq!(text_content(&tree, em), "dangling");
}

#[test]
fn unmatched_end_tags_are_ignored() {
    let tree = parse("<div>a</span></div><p>b</p>");
    let body = tree.body().expect("body");
    assert_eq!(child_tags(&tree, body), [TagId::DIV, TagId::P]);
}

#[test]
fn comments_are_kept() {
    let tree = parse("<div><!-- note --></div>");
    let div = find(&tree, TagId::DIV).unwrap();
    let child = tree.children(div)[0];
    assert!(matches!(
        &tree.get(child).unwrap().kind,
        NodeKind::Comment(data) if data == " note "
    ));
}

#[test]
fn whitespace_between_blocks_is_space_node() {
    let tree = parse("<div>a</div>\n<div>b</div>");
    let body = tree.body().expect("body");
    let kinds: Vec<bool> = tree
        .children(body)
        .iter()
        .map(|&c| matches!(tree.get(c).unwrap().kind, NodeKind::Space(_)))
        .collect();
    assert_eq!(kinds, [false, true, false]);
}

#[test]
fn serialization_is_parse_stable() {
    let inputs = [
        "<html>Body</html>",
        "<p>one<div>two</div>",
        "<ul><li>a<li>b</ul>",
        "<table><div>f</div><tr><td>x</table>",
        "<style>p { color: red }</style><p class=\"a b\" id=x>hi &amp; bye</p>",
        "<x-widget attr=\"a&quot;b\">t</x-widget>",
    ];
    for input in inputs {
        let first = serialize(&parse(input));
        let second = serialize(&parse(&first));
        assert_eq!(first, second, "serialization not stable for {input:?}");
    }
}
