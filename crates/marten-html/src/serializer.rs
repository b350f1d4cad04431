//! DOM to HTML text serialization.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! The serializer is the inverse of the parser for trees the parser
//! itself produced: parsing the serialized output yields the same tree
//! again. Raw-text element bodies are written verbatim; other text has
//! `&`, `<`, `>` escaped; attribute values additionally escape `"`.

use marten_dom::{DomTree, NodeId, NodeKind};

/// Serialize a whole tree to HTML text.
#[must_use]
pub fn serialize(tree: &DomTree) -> String {
    let mut out = String::new();
    for &child in tree.children(tree.root()) {
        serialize_node(tree, child, &mut out);
    }
    out
}

fn serialize_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.kind {
        NodeKind::Document => {}
        NodeKind::Element(data) => {
            out.push('<');
            out.push_str(&data.tag_name);
            for attr in &data.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                if !attr.value.is_empty() {
                    out.push_str("=\"");
                    escape_attribute(&attr.value, out);
                    out.push('"');
                }
            }
            out.push('>');
            if data.tag.is_void() {
                return;
            }
            if data.tag.is_raw_text() {
                for &child in tree.children(id) {
                    if let Some(text) = tree.as_text(child) {
                        out.push_str(text);
                    }
                }
            } else {
                for &child in tree.children(id) {
                    serialize_node(tree, child, out);
                }
            }
            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push('>');
        }
        NodeKind::Text(text) | NodeKind::Space(text) => escape_text(text, out),
        NodeKind::Comment(data) => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
        NodeKind::Cdata(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
}
