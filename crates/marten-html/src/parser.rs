//! HTML tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! A permissive builder rather than the full WHATWG insertion-mode
//! machine: a stack of open elements plus a fixed set of recovery
//! rules tuned for real-world markup.
//!
//! - An implicit `<html>`, `<head>`, `<body>` are created if the input
//!   lacks them.
//! - `<p>` is auto-closed by any of the block tags in
//!   [`TagId::closes_paragraph`]; `<li>` by the next `<li>`; `<dt>`/`<dd>`
//!   by each other; `<td>`/`<th>` by the next cell; `<tr>` by the next
//!   `<tr>`; row groups by the next row group; `<option>` by the next
//!   `<option>`.
//! - Non-table content found inside a `<table>` subtree is *fostered*:
//!   moved immediately before the table in the table's parent, subtree
//!   intact.
//! - Raw-text bodies arrive as a single token and become one text node.
//! - Unknown tags are retained as generic elements.
//!
//! The builder never fails. Truncated input simply leaves the stack to be
//! closed in reverse order at end-of-file.

use marten_common::{text::is_html_space, warn_once};
use marten_dom::{AttrList, DomTree, NodeId, NodeKind, TagId};

use super::token::Token;

/// A recoverable problem found while building the tree.
///
/// "The handling of parse errors is well-defined" — issues are reported,
/// never fatal.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    /// Description of the problem.
    pub message: String,
    /// Index into the token stream where it was encountered.
    pub token_index: usize,
}

/// Tags whose natural home is `<head>` when no body is open yet.
fn belongs_in_head(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::TITLE
            | TagId::STYLE
            | TagId::SCRIPT
            | TagId::LINK
            | TagId::META
            | TagId::BASE
            | TagId::NOSCRIPT
            | TagId::TEMPLATE
    )
}

/// Open-element stack entries that terminate scoped searches.
const SCOPE_BOUNDARIES: &[TagId] = &[
    TagId::HTML,
    TagId::BODY,
    TagId::TABLE,
    TagId::TD,
    TagId::TH,
    TagId::CAPTION,
];

/// The tree builder: token stream in, [`DomTree`] out.
pub struct HtmlParser {
    tokens: Vec<Token>,
    token_index: usize,
    tree: DomTree,
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    open_elements: Vec<NodeId>,
    html_element: Option<NodeId>,
    head_element: Option<NodeId>,
    body_element: Option<NodeId>,
    /// Consecutive character tokens accumulate here and flush as one
    /// text node on the next structural token.
    text_buffer: String,
    issues: Vec<ParseIssue>,
}

impl HtmlParser {
    /// Create a parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            token_index: 0,
            tree: DomTree::new(),
            open_elements: Vec::new(),
            html_element: None,
            head_element: None,
            body_element: None,
            text_buffer: String::new(),
            issues: Vec::new(),
        }
    }

    /// Run the parser and return the DOM tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return both the tree and any parse issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        while self.token_index < self.tokens.len() {
            let token = self.tokens[self.token_index].clone();
            self.process_token(token);
            self.token_index += 1;
        }
        self.finish();
        (self.tree, self.issues)
    }

    fn parse_warning(&mut self, message: &str) {
        warn_once("HTML parser", message);
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }

    // ===== Insertion points =====

    /// The current node: top of the open stack, else the document.
    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn current_tag(&self) -> Option<TagId> {
        self.tree.tag(self.current_node())
    }

    /// Ensure the `<html>` element exists and anchors the stack.
    fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html_element {
            return html;
        }
        let html = self.tree.alloc_element("html", AttrList::new());
        self.tree.append_child(NodeId::ROOT, html);
        self.open_elements.insert(0, html);
        self.html_element = Some(html);
        html
    }

    /// Ensure `<head>` exists (without opening it).
    fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head_element {
            return head;
        }
        let html = self.ensure_html();
        let head = self.tree.alloc_element("head", AttrList::new());
        self.tree.append_child(html, head);
        self.head_element = Some(head);
        head
    }

    /// Ensure `<body>` exists and is the open insertion point. Closes
    /// anything above `<html>` on the stack (an open head, typically).
    fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body_element {
            return body;
        }
        let html = self.ensure_html();
        let _ = self.ensure_head();
        while self.open_elements.len() > 1 {
            let _ = self.open_elements.pop();
        }
        let body = self.tree.alloc_element("body", AttrList::new());
        self.tree.append_child(html, body);
        self.open_elements.push(body);
        self.body_element = Some(body);
        body
    }

    // ===== Scoped auto-closing =====

    /// Pop through the nearest open element matching any of `targets`,
    /// stopping the search at scope boundaries or any tag in `until`.
    fn close_in_scope(&mut self, targets: &[TagId], until: &[TagId]) {
        let mut found = None;
        for (depth, &id) in self.open_elements.iter().enumerate().rev() {
            let Some(tag) = self.tree.tag(id) else { break };
            if targets.contains(&tag) {
                found = Some(depth);
                break;
            }
            if until.contains(&tag) || SCOPE_BOUNDARIES.contains(&tag) {
                break;
            }
        }
        if let Some(depth) = found {
            self.open_elements.truncate(depth);
        }
    }

    /// Implicit end tags generated by an incoming start tag.
    fn auto_close_for(&mut self, tag: TagId) {
        if tag.closes_paragraph() {
            self.close_in_scope(&[TagId::P], &[]);
        }
        match tag {
            TagId::LI => self.close_in_scope(&[TagId::LI], &[TagId::UL, TagId::OL]),
            TagId::DT | TagId::DD => {
                self.close_in_scope(&[TagId::DT, TagId::DD], &[TagId::DL]);
            }
            TagId::TD | TagId::TH => {
                self.close_in_scope(&[TagId::TD, TagId::TH], &[TagId::TR]);
            }
            // An open cell shadows the row, so close inside out.
            TagId::TR => {
                self.close_in_scope(&[TagId::TD, TagId::TH], &[TagId::TR]);
                self.close_in_scope(&[TagId::TR], &[]);
            }
            TagId::THEAD | TagId::TBODY | TagId::TFOOT => {
                self.close_in_scope(&[TagId::TD, TagId::TH], &[TagId::TR]);
                self.close_in_scope(&[TagId::TR], &[]);
                self.close_in_scope(&[TagId::THEAD, TagId::TBODY, TagId::TFOOT], &[]);
            }
            TagId::CAPTION | TagId::COLGROUP => {
                self.close_in_scope(&[TagId::CAPTION, TagId::COLGROUP], &[]);
            }
            TagId::OPTION => self.close_in_scope(&[TagId::OPTION], &[TagId::SELECT]),
            _ => {}
        }
    }

    // ===== Table fostering =====

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// If the current node is a table container and the incoming content
    /// is not table-internal, return the `(parent, table)` pair to insert
    /// before instead.
    fn foster_target(&self, incoming_is_table_content: bool) -> Option<(NodeId, NodeId)> {
        if incoming_is_table_content {
            return None;
        }
        let current = self.current_tag()?;
        if !matches!(
            current,
            TagId::TABLE | TagId::THEAD | TagId::TBODY | TagId::TFOOT | TagId::TR | TagId::COLGROUP
        ) {
            return None;
        }
        // The nearest open table element.
        let table = self
            .open_elements
            .iter()
            .rev()
            .copied()
            .find(|&id| self.tree.tag(id) == Some(TagId::TABLE))?;
        let parent = self.tree.parent(table)?;
        Some((parent, table))
    }

    // ===== Token dispatch =====

    fn process_token(&mut self, token: Token) {
        match token {
            Token::Character { data } => self.text_buffer.push(data),
            Token::RawText { data } => {
                self.flush_text();
                let node = self.tree.alloc(NodeKind::Text(data));
                let parent = self.current_node();
                self.tree.append_child(parent, node);
            }
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                self.flush_text();
                let attrs: AttrList = attributes
                    .into_iter()
                    .map(|a| (a.name, a.value))
                    .collect();
                self.insert_start_tag(&name, attrs, self_closing);
            }
            Token::EndTag { name } => {
                self.flush_text();
                self.handle_end_tag(&name);
            }
            Token::Comment { data } => {
                self.flush_text();
                let node = self.tree.alloc(NodeKind::Comment(data));
                let parent = self.current_node();
                self.tree.append_child(parent, node);
            }
            Token::Cdata { data } => {
                self.flush_text();
                let node = self.tree.alloc(NodeKind::Cdata(data));
                let parent = self.current_node();
                self.tree.append_child(parent, node);
            }
            // The engine has no quirks mode; the declaration is consumed
            // and dropped.
            Token::Doctype { .. } => self.flush_text(),
            Token::EndOfFile => self.flush_text(),
        }
    }

    fn insert_start_tag(&mut self, name: &str, attrs: AttrList, self_closing: bool) {
        let tag = self.tree.intern_tag(name);

        // Document-structure tags get dedicated handling.
        match tag {
            TagId::HTML => {
                if self.html_element.is_some() {
                    self.parse_warning("duplicate <html> tag ignored");
                } else {
                    let html = self.tree.alloc_element(name, attrs);
                    self.tree.append_child(NodeId::ROOT, html);
                    self.open_elements.insert(0, html);
                    self.html_element = Some(html);
                }
                return;
            }
            TagId::HEAD => {
                if self.head_element.is_some() {
                    self.parse_warning("duplicate <head> tag ignored");
                } else {
                    let html = self.ensure_html();
                    let head = self.tree.alloc_element(name, attrs);
                    self.tree.append_child(html, head);
                    self.head_element = Some(head);
                    self.open_elements.push(head);
                }
                return;
            }
            TagId::BODY => {
                if self.body_element.is_some() {
                    self.parse_warning("duplicate <body> tag ignored");
                } else {
                    let html = self.ensure_html();
                    let _ = self.ensure_head();
                    while self.open_elements.len() > 1 {
                        let _ = self.open_elements.pop();
                    }
                    let body = self.tree.alloc_element(name, attrs);
                    self.tree.append_child(html, body);
                    self.open_elements.push(body);
                    self.body_element = Some(body);
                }
                return;
            }
            _ => {}
        }

        // Pick the insertion context: head for metadata before any body
        // content, body for everything else.
        if self.body_element.is_none() && belongs_in_head(tag) {
            let head = self.ensure_head();
            let element = self.tree.alloc_element(name, attrs);
            self.tree.append_child(head, element);
            if !(self_closing || tag.is_void()) {
                self.open_elements.push(element);
            }
            return;
        }
        let _ = self.ensure_body();

        self.auto_close_for(tag);

        let element = self.tree.alloc_element(name, attrs);
        if let Some((parent, table)) = self.foster_target(tag.is_table_internal()) {
            self.parse_warning("non-table content fostered out of <table>");
            self.tree.insert_before(parent, element, table);
        } else {
            let parent = self.current_node();
            self.tree.append_child(parent, element);
        }

        if !(self_closing || tag.is_void()) {
            self.open_elements.push(element);
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        let tag = self.tree.intern_tag(name);

        // "</br>" acts like "<br>" for legacy content.
        if tag == TagId::BR {
            self.insert_start_tag(name, AttrList::new(), false);
            return;
        }
        if tag.is_void() {
            self.parse_warning("end tag for void element ignored");
            return;
        }

        // Find the matching open element, scanning from the top.
        let Some(depth) = self
            .open_elements
            .iter()
            .rposition(|&id| self.tree.tag(id) == Some(tag))
        else {
            self.parse_warning("unmatched end tag ignored");
            return;
        };

        // Never pop the html element while content may still arrive.
        if tag == TagId::HTML {
            return;
        }
        self.open_elements.truncate(depth);
    }

    /// Flush accumulated character data into a text or whitespace node.
    fn flush_text(&mut self) {
        if self.text_buffer.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.text_buffer);
        let whitespace_only = data.chars().all(is_html_space);

        // Whitespace between structural tags, before any content, is not
        // part of the document's rendered text.
        if whitespace_only {
            let parent = self.current_node();
            let at_document_level = parent == NodeId::ROOT
                || Some(parent) == self.html_element
                || (self.body_element.is_none() && Some(parent) == self.head_element);
            if at_document_level {
                return;
            }
            let node = self.tree.alloc(NodeKind::Space(data));
            self.tree.append_child(parent, node);
            return;
        }

        let _ = self.ensure_body();
        let node = self.tree.alloc(NodeKind::Text(data));
        if let Some((parent, table)) = self.foster_target(false) {
            self.parse_warning("text fostered out of <table>");
            self.tree.insert_before(parent, node, table);
        } else {
            let parent = self.current_node();
            self.tree.append_child(parent, node);
        }
    }

    /// End of input: the remaining stack is closed in reverse order and
    /// the implicit structure is completed.
    fn finish(&mut self) {
        self.open_elements.clear();
        let _ = self.ensure_body();
        self.open_elements.clear();
    }
}
