//! Arena-based DOM tree for the Marten engine.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships: children own nothing, parents own nothing — the
//! document's arena owns every node, and links are plain 32-bit indices.
//! This gives O(1) access and traversal in any direction with no
//! reference cycles, and dropping the tree frees every node in one sweep.
//!
//! The tree is built by the HTML parser and is read-only afterwards for
//! the life of the document; the engine layers styles and boxes on top of
//! it by [`NodeId`] without touching the structure.

mod attrs;
mod tags;

pub use attrs::{Attr, AttrList};
pub use tags::{known_tag_id, TagId};

/// A type-safe index into the DOM arena.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// Node references are 32-bit indices, never pointers; a `NodeId` is only
/// meaningful together with the [`DomTree`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);

    /// Arena slot for this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type."
///
/// `Space` is a text node containing only HTML whitespace; the tree
/// builder classifies text on insertion so layout can skip pure
/// whitespace between blocks without re-scanning.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The document root; always at [`NodeId::ROOT`], never repeated.
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// A text node containing only whitespace.
    Space(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// A `<![CDATA[...]]>` section, retained verbatim.
    Cdata(String),
}

/// Element-specific data: interned tag id, the lowercased name it was
/// interned from, and the ordered attribute list.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Interned tag id; compare this, not the name.
    pub tag: TagId,
    /// The element's lowercased tag name.
    pub tag_name: String,
    /// Ordered attributes with lowercased names.
    pub attrs: AttrList,
}

impl ElementData {
    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Iterate the whitespace-separated tokens of the class attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    /// True if `name` appears in the element's class list.
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.classes().any(|c| c == name)
    }
}

/// A node in the arena: its kind plus index links in every direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub kind: NodeKind,
    /// Parent link; `None` only for the document root and detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// Next sibling in the parent's child list.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling in the parent's child list.
    pub prev_sibling: Option<NodeId>,
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// All nodes live in one contiguous vector; the Document node is always
/// at index 0. The tree also owns the custom-tag intern table: tag names
/// outside the built-in set are assigned per-document ids at parse time.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    /// Names of author-defined tags, indexed by `id - TagId::KNOWN_COUNT`.
    custom_tags: Vec<String>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node at the root.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            kind: NodeKind::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        };
        Self {
            nodes: vec![document],
            custom_tags: Vec::new(),
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (always false: the Document exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Intern a tag name, lowercasing it. Known HTML tags get their fixed
    /// id; anything else is added to this document's custom table.
    pub fn intern_tag(&mut self, name: &str) -> TagId {
        let lower = name.to_ascii_lowercase();
        if let Some(id) = known_tag_id(&lower) {
            return id;
        }
        if let Some(pos) = self.custom_tags.iter().position(|t| *t == lower) {
            return TagId(TagId::KNOWN_COUNT + pos as u32);
        }
        self.custom_tags.push(lower);
        TagId(TagId::KNOWN_COUNT + (self.custom_tags.len() - 1) as u32)
    }

    /// Resolve a tag id back to its name.
    #[must_use]
    pub fn tag_name(&self, tag: TagId) -> &str {
        tag.known_name().unwrap_or_else(|| {
            self.custom_tags
                .get((tag.0 - TagId::KNOWN_COUNT) as usize)
                .map_or("", String::as_str)
        })
    }

    /// Allocate a new node in the arena and return its ID.
    ///
    /// The node is not yet attached to the tree (no parent, no siblings);
    /// follow up with [`Self::append_child`] or [`Self::insert_before`].
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Allocate an element node, interning its tag name.
    pub fn alloc_element(&mut self, name: &str, attrs: AttrList) -> NodeId {
        let tag = self.intern_tag(name);
        let tag_name = name.to_ascii_lowercase();
        self.alloc(NodeKind::Element(ElementData {
            tag,
            tag_name,
            attrs,
        }))
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before
    /// null." Updates parent/child/sibling links.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none());
        let prev_last = self.nodes[parent.index()].children.last().copied();
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[child.index()].prev_sibling = prev_last;
        self.nodes[child.index()].next_sibling = None;
        if let Some(prev) = prev_last {
            self.nodes[prev.index()].next_sibling = Some(child);
        }
    }

    /// [§ 4.2.1 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Insert `child` into `parent`'s child list immediately before
    /// `before`. Falls back to append when `before` is not a child of
    /// `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none());
        let Some(pos) = self.nodes[parent.index()]
            .children
            .iter()
            .position(|&c| c == before)
        else {
            self.append_child(parent, child);
            return;
        };
        self.nodes[parent.index()].children.insert(pos, child);
        self.nodes[child.index()].parent = Some(parent);

        let prev = self.nodes[before.index()].prev_sibling;
        self.nodes[child.index()].prev_sibling = prev;
        self.nodes[child.index()].next_sibling = Some(before);
        self.nodes[before.index()].prev_sibling = Some(child);
        if let Some(prev) = prev {
            self.nodes[prev.index()].next_sibling = Some(child);
        }
    }

    /// Unlink a node from its parent, keeping its subtree intact.
    ///
    /// The node stays in the arena (the arena is document-lifetime and
    /// freed in one sweep); it can be re-attached elsewhere. Used by the
    /// parser's table fostering.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.index()].parent else {
            return;
        };
        let prev = self.nodes[id.index()].prev_sibling;
        let next = self.nodes[id.index()].next_sibling;
        self.nodes[parent.index()].children.retain(|&c| c != id);
        if let Some(prev) = prev {
            self.nodes[prev.index()].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.index()].prev_sibling = prev;
        }
        self.nodes[id.index()].parent = None;
        self.nodes[id.index()].prev_sibling = None;
        self.nodes[id.index()].next_sibling = None;
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Returns an iterator over all ancestors of a node, parent first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Returns an iterator over preceding siblings, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Returns an iterator over all descendants of a node in document
    /// order (depth-first, pre-order), excluding the starting node.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Iterate over every attached node in document order, root included.
    pub fn iter_all(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(self.root()).chain(self.descendants(self.root()))
    }

    /// True if `descendant` sits somewhere under `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|a| a == ancestor)
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get the text payload of a `Text` or `Space` node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Text(s) | NodeKind::Space(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The element's interned tag id, if `id` is an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<TagId> {
        self.as_element(id).map(|e| e.tag)
    }

    /// 1-based position of an element among its element-typed siblings.
    ///
    /// This is the index `:nth-child(an+b)` is evaluated against; text and
    /// comment siblings do not count.
    #[must_use]
    pub fn element_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let mut index = 0;
        for &sibling in self.children(parent) {
            if self.as_element(sibling).is_some() {
                index += 1;
                if sibling == id {
                    return Some(index);
                }
            }
        }
        None
    }

    /// Number of element-typed children of `id`.
    #[must_use]
    pub fn element_child_count(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .filter(|&&c| self.as_element(c).is_some())
            .count()
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is
    /// that document, if it exists; otherwise null." For HTML documents
    /// this is the `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's
    /// children that is either a body element or a frameset element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| self.tag(id) == Some(TagId::BODY))
            .copied()
    }

    /// First `<head>` child of the document element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| self.tag(id) == Some(TagId::HEAD))
            .copied()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that walks up the tree from a node to the root.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator that walks backwards through the siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Iterator that walks a subtree in document order (depth-first,
/// pre-order).
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    /// Nodes still to visit; children are pushed in reverse so the
    /// leftmost child pops first.
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut DomTree, name: &str) -> NodeId {
        tree.alloc_element(name, AttrList::new())
    }

    #[test]
    fn append_links_siblings() {
        let mut tree = DomTree::new();
        let a = element(&mut tree, "div");
        let b = element(&mut tree, "p");
        tree.append_child(NodeId::ROOT, a);
        tree.append_child(NodeId::ROOT, b);

        assert_eq!(tree.children(NodeId::ROOT), [a, b]);
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.parent(b), Some(NodeId::ROOT));
    }

    #[test]
    fn insert_before_rewires_all_links() {
        let mut tree = DomTree::new();
        let a = element(&mut tree, "li");
        let c = element(&mut tree, "li");
        let b = element(&mut tree, "li");
        tree.append_child(NodeId::ROOT, a);
        tree.append_child(NodeId::ROOT, c);
        tree.insert_before(NodeId::ROOT, b, c);

        assert_eq!(tree.children(NodeId::ROOT), [a, b, c]);
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.next_sibling(b), Some(c));
        assert_eq!(tree.prev_sibling(c), Some(b));
    }

    #[test]
    fn detach_keeps_subtree() {
        let mut tree = DomTree::new();
        let table = element(&mut tree, "table");
        let div = element(&mut tree, "div");
        let text = tree.alloc(NodeKind::Text("x".to_string()));
        tree.append_child(NodeId::ROOT, table);
        tree.append_child(table, div);
        tree.append_child(div, text);

        tree.detach(div);
        assert!(tree.children(table).is_empty());
        assert_eq!(tree.parent(div), None);
        // Subtree intact.
        assert_eq!(tree.children(div), [text]);

        tree.insert_before(NodeId::ROOT, div, table);
        assert_eq!(tree.children(NodeId::ROOT), [div, table]);
    }

    #[test]
    fn custom_tags_interned_per_document() {
        let mut tree = DomTree::new();
        let first = tree.intern_tag("x-widget");
        let again = tree.intern_tag("X-WIDGET");
        assert_eq!(first, again);
        assert!(!first.is_known());
        assert_eq!(tree.tag_name(first), "x-widget");
        assert_eq!(tree.intern_tag("DIV"), TagId::DIV);
    }

    #[test]
    fn element_index_skips_non_elements() {
        let mut tree = DomTree::new();
        let parent = element(&mut tree, "ul");
        tree.append_child(NodeId::ROOT, parent);
        let t = tree.alloc(NodeKind::Text("pad".to_string()));
        tree.append_child(parent, t);
        let li1 = element(&mut tree, "li");
        let li2 = element(&mut tree, "li");
        tree.append_child(parent, li1);
        tree.append_child(parent, li2);

        assert_eq!(tree.element_index(li1), Some(1));
        assert_eq!(tree.element_index(li2), Some(2));
        assert_eq!(tree.element_child_count(parent), 2);
    }

    #[test]
    fn descendants_in_document_order() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, "html");
        let head = element(&mut tree, "head");
        let body = element(&mut tree, "body");
        let p = element(&mut tree, "p");
        tree.append_child(NodeId::ROOT, html);
        tree.append_child(html, head);
        tree.append_child(html, body);
        tree.append_child(body, p);

        let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
        assert_eq!(order, [html, head, body, p]);
        assert!(tree.is_descendant_of(p, html));
        assert!(!tree.is_descendant_of(head, body));
    }

    #[test]
    fn document_element_and_body() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, "html");
        let head = element(&mut tree, "head");
        let body = element(&mut tree, "body");
        tree.append_child(NodeId::ROOT, html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        assert_eq!(tree.document_element(), Some(html));
        assert_eq!(tree.head(), Some(head));
        assert_eq!(tree.body(), Some(body));
    }
}
