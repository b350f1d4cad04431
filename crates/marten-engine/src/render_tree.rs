//! Render tree construction.
//!
//! [CSS2 § 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Parallel to the DOM, the render tree holds *boxes* in an arena with
//! 32-bit indices. Each box references its DOM element by [`NodeId`]
//! (weakly — the document owns both arenas), carries its computed style
//! and resolved font, and after layout holds its geometry, line boxes,
//! float lists, and positioned descendants.
//!
//! Construction rules:
//! - `display:none` → no box, subtree skipped.
//! - `display:block` / `list-item` → one block box.
//! - `display:inline` → an inline wrapper whose text children become
//!   inline-text boxes.
//! - `display:inline-block` → an atomic inline hosting a block context.
//! - table displays → specialized boxes; missing intermediate wrappers
//!   are synthesized to satisfy `table > row-group > row > cell`.
//! - `display:flex` → a flex container; runs of text coalesce into
//!   anonymous block items.
//! - `::before`/`::after` with `content` → synthetic first/last children.
//!
//! The structural tree (parent/children) is complete before layout
//! begins; layout writes only the output fields.

use std::collections::HashMap;

use marten_css::selector::PseudoElement;
use marten_css::style::{LineHeight, TextDecorationLine, TextTransform, WhiteSpace};
use marten_css::{ComputedStyle, Display, Length, StyleMaps, WebColor};
use marten_dom::{DomTree, NodeId, NodeKind, TagId};

use crate::container::{DocumentContainer, FontDescription, FontHandle, FontMetrics};
use crate::geometry::{EdgeInsets, Rect, Size};

/// Index of a box in the render arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub u32);

impl BoxId {
    /// Arena slot for this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a box is, structurally.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// A block container (also the principal box of `list-item`).
    Block,
    /// A non-atomic inline wrapper; contents join the parent's IFC.
    Inline,
    /// An atomic inline hosting its own block formatting context.
    InlineBlock,
    /// `display: table` (and `inline-table`).
    Table,
    /// `display: table-row-group` (and header/footer groups).
    TableRowGroup,
    /// `display: table-row`.
    TableRow,
    /// `display: table-cell`.
    TableCell,
    /// `display: table-caption`.
    TableCaption,
    /// `display: flex` container.
    Flex,
    /// A synthesized block wrapper around inline runs.
    AnonymousBlock,
    /// A run of document text, whitespace-processed at build time.
    Text(String),
    /// A `<br>` — forces a line break in the IFC.
    LineBreak,
    /// A `<wbr>` — a soft break opportunity.
    SoftBreak,
}

impl BoxKind {
    /// True for kinds laid out as block-level boxes in a BFC.
    #[must_use]
    pub const fn is_block_level(&self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::Table
                | Self::Flex
                | Self::AnonymousBlock
                | Self::TableCaption
        )
    }

    /// True for kinds that participate in an inline formatting context.
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        matches!(
            self,
            Self::Inline | Self::InlineBlock | Self::Text(_) | Self::LineBreak | Self::SoftBreak
        )
    }
}

/// Content rendered by the container rather than by child boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacedContent {
    /// An image; the container decodes and paints it.
    Image {
        /// The `src` attribute.
        src: String,
    },
}

/// One fragment placed on a line.
#[derive(Debug, Clone)]
pub struct LineFragment {
    /// Fragment geometry (absolute coordinates; the rect's bottom minus
    /// the font descent is the text baseline).
    pub rect: Rect,
    /// What the fragment is.
    pub content: FragmentContent,
    /// The box the fragment came from.
    pub source: BoxId,
}

/// Payload of a line fragment.
#[derive(Debug, Clone)]
pub enum FragmentContent {
    /// A text run painted with `draw_text`.
    Text {
        /// The run text.
        text: String,
        /// Font handle for painting.
        font: FontHandle,
        /// Metrics used for baseline placement.
        metrics: FontMetrics,
        /// Text color.
        color: WebColor,
        /// Decoration lines to draw over the run.
        decoration: TextDecorationLine,
    },
    /// An atomic inline box (inline-block, replaced element); its box
    /// geometry was assigned during line layout.
    AtomicBox,
}

/// [CSS2 § 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "The rectangular area that contains the boxes that form a line is
/// called a line box."
#[derive(Debug, Clone, Default)]
pub struct LineBox {
    /// Top of the line, absolute.
    pub top: i32,
    /// Line box height.
    pub height: i32,
    /// Baseline offset from the line top.
    pub baseline: i32,
    /// Left edge of the line (after float shortening).
    pub left: i32,
    /// Usable width of the line.
    pub width: i32,
    /// Fragments in paint order.
    pub fragments: Vec<LineFragment>,
}

/// A box in the render arena.
#[derive(Debug, Clone)]
pub struct RenderBox {
    /// Structural kind.
    pub kind: BoxKind,
    /// The generating DOM element (`None` for anonymous boxes and text
    /// runs keep their text node id).
    pub node: Option<NodeId>,
    /// Set when this box renders a `::before`/`::after`.
    pub pseudo: Option<PseudoElement>,
    /// The computed style (anonymous boxes inherit their parent's).
    pub style: ComputedStyle,
    /// Structural parent.
    pub parent: Option<BoxId>,
    /// Children in document order (paint order is derived in the walk).
    pub children: Vec<BoxId>,
    /// The box percentages and `auto` offsets resolve against; `None`
    /// only for the root.
    pub containing_block: Option<BoxId>,
    /// Replaced content, if the container paints this box.
    pub replaced: Option<ReplacedContent>,
    /// Intrinsic size of replaced content (zero when unavailable).
    pub intrinsic: Size,
    /// Resolved font handle.
    pub font: FontHandle,
    /// Metrics of the resolved font.
    pub font_metrics: FontMetrics,

    // ===== Layout output (written once per render pass) =====
    /// Content-box rectangle, absolute coordinates.
    pub pos: Rect,
    /// Used margins.
    pub margins: EdgeInsets,
    /// Used border widths.
    pub borders: EdgeInsets,
    /// Used padding.
    pub padding: EdgeInsets,
    /// Line boxes, when this box establishes an inline formatting
    /// context.
    pub lines: Vec<LineBox>,
    /// Left floats attached to this block (BFC roots only).
    pub floats_left: Vec<BoxId>,
    /// Right floats attached to this block.
    pub floats_right: Vec<BoxId>,
    /// Absolutely positioned descendants whose containing block this is.
    pub absolutes: Vec<BoxId>,
    /// Baseline of the last line, for inline-block alignment.
    pub last_baseline: i32,
    /// `(colspan, rowspan)` for table cells; `(1, 1)` otherwise.
    pub table_spans: (u16, u16),
}

impl RenderBox {
    /// Border-box rectangle.
    #[must_use]
    pub fn border_box(&self) -> Rect {
        Rect {
            x: self.pos.x - self.padding.left - self.borders.left,
            y: self.pos.y - self.padding.top - self.borders.top,
            width: self.pos.width + self.padding.horizontal() + self.borders.horizontal(),
            height: self.pos.height + self.padding.vertical() + self.borders.vertical(),
        }
    }

    /// Margin-box rectangle.
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        let border = self.border_box();
        Rect {
            x: border.x - self.margins.left,
            y: border.y - self.margins.top,
            width: border.width + self.margins.horizontal(),
            height: border.height + self.margins.vertical(),
        }
    }
}

/// The render tree: an arena of boxes plus the node→box index.
#[derive(Debug, Default)]
pub struct RenderTree {
    boxes: Vec<RenderBox>,
    /// The root box (the document element's), if any content rendered.
    pub root: Option<BoxId>,
    /// Boxes generated per DOM node.
    by_node: HashMap<NodeId, Vec<BoxId>>,
}

impl RenderTree {
    /// Get a box.
    #[must_use]
    pub fn get(&self, id: BoxId) -> &RenderBox {
        &self.boxes[id.index()]
    }

    /// Get a box mutably.
    pub fn get_mut(&mut self, id: BoxId) -> &mut RenderBox {
        &mut self.boxes[id.index()]
    }

    /// Number of boxes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// True when no boxes were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Boxes generated by a DOM node.
    #[must_use]
    pub fn boxes_for(&self, node: NodeId) -> &[BoxId] {
        self.by_node.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Iterate all box ids.
    pub fn ids(&self) -> impl Iterator<Item = BoxId> {
        (0..self.boxes.len() as u32).map(BoxId)
    }

    fn alloc(&mut self, render_box: RenderBox) -> BoxId {
        let id = BoxId(self.boxes.len() as u32);
        if let Some(node) = render_box.node {
            self.by_node.entry(node).or_default().push(id);
        }
        self.boxes.push(render_box);
        id
    }
}

/// Builds the render tree from a styled DOM.
pub struct RenderTreeBuilder<'a> {
    tree: &'a DomTree,
    styles: &'a StyleMaps,
    container: &'a mut dyn DocumentContainer,
    out: RenderTree,
    /// Font cache keyed by the description; fonts are borrowed from the
    /// container and released when the document rebuilds or drops.
    fonts: HashMap<String, (FontHandle, FontMetrics)>,
}

impl<'a> RenderTreeBuilder<'a> {
    /// Create a builder over a styled document.
    pub fn new(
        tree: &'a DomTree,
        styles: &'a StyleMaps,
        container: &'a mut dyn DocumentContainer,
    ) -> Self {
        Self {
            tree,
            styles,
            container,
            out: RenderTree::default(),
            fonts: HashMap::new(),
        }
    }

    /// Build the tree. Returns the arena and the font handles it minted
    /// (the document releases them on teardown).
    #[must_use]
    pub fn build(mut self) -> (RenderTree, Vec<FontHandle>) {
        if let Some(root) = self.tree.document_element() {
            let root_box = self.build_element(root, None);
            self.out.root = root_box;
        }
        let fonts = self.fonts.values().map(|&(handle, _)| handle).collect();
        (self.out, fonts)
    }

    /// Resolve (and cache) the font for a style.
    fn resolve_font(&mut self, style: &ComputedStyle) -> (FontHandle, FontMetrics) {
        let description = FontDescription {
            family: style.font_family.clone(),
            size: style.font_size.round() as i32,
            weight: style.font_weight,
            style: style.font_style,
            decoration: style.text_decoration,
        };
        let key = format!(
            "{}|{}|{}|{:?}|{}{}{}",
            description.family,
            description.size,
            description.weight,
            description.style,
            u8::from(description.decoration.underline),
            u8::from(description.decoration.overline),
            u8::from(description.decoration.line_through),
        );
        if let Some(&cached) = self.fonts.get(&key) {
            return cached;
        }
        let created = self.container.create_font(&description);
        let _ = self.fonts.insert(key, created);
        created
    }

    fn alloc_box(
        &mut self,
        kind: BoxKind,
        node: Option<NodeId>,
        pseudo: Option<PseudoElement>,
        style: ComputedStyle,
        parent: Option<BoxId>,
    ) -> BoxId {
        let (font, font_metrics) = self.resolve_font(&style);
        let id = self.out.alloc(RenderBox {
            kind,
            node,
            pseudo,
            style,
            parent,
            children: Vec::new(),
            containing_block: None,
            replaced: None,
            intrinsic: Size::default(),
            font,
            font_metrics,
            pos: Rect::default(),
            margins: EdgeInsets::default(),
            borders: EdgeInsets::default(),
            padding: EdgeInsets::default(),
            lines: Vec::new(),
            floats_left: Vec::new(),
            floats_right: Vec::new(),
            absolutes: Vec::new(),
            last_baseline: 0,
            table_spans: (1, 1),
        });
        if let Some(parent) = parent {
            self.out.get_mut(parent).children.push(id);
        }
        id
    }

    /// Build the box (or boxes) for one element. Returns the principal
    /// box, or `None` for `display:none` subtrees.
    fn build_element(&mut self, node: NodeId, parent: Option<BoxId>) -> Option<BoxId> {
        let style = self.styles.get(node)?.clone();
        if style.display == Display::None {
            return None;
        }

        let tag = self.tree.tag(node);
        let kind = match (tag, style.display) {
            (Some(TagId::BR), _) => BoxKind::LineBreak,
            (Some(TagId::WBR), _) => BoxKind::SoftBreak,
            // Replaced elements are atomic inlines: they participate in
            // the line as a single opaque box.
            (Some(TagId::IMG), Display::Inline) => BoxKind::InlineBlock,
            (_, Display::Block | Display::ListItem) => BoxKind::Block,
            (_, Display::Inline) => BoxKind::Inline,
            (_, Display::InlineBlock) => BoxKind::InlineBlock,
            (_, Display::Table | Display::InlineTable) => BoxKind::Table,
            (
                _,
                Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup,
            ) => BoxKind::TableRowGroup,
            (_, Display::TableRow) => BoxKind::TableRow,
            (_, Display::TableCell) => BoxKind::TableCell,
            (_, Display::TableCaption) => BoxKind::TableCaption,
            (_, Display::Flex | Display::InlineFlex) => BoxKind::Flex,
            (_, Display::None | Display::InlineText) => return None,
        };

        let id = self.alloc_box(kind.clone(), Some(node), None, style, parent);
        self.attach_replaced_content(node, id);
        if matches!(kind, BoxKind::TableCell) {
            self.attach_cell_spans(node, id);
        }

        // ::before is the first child.
        self.build_pseudo(node, PseudoElement::Before, id);

        for &child in self.tree.children(node) {
            match &self.tree.get(child).map(|n| &n.kind) {
                Some(NodeKind::Element(_)) => {
                    let _ = self.build_element(child, Some(id));
                }
                Some(NodeKind::Text(text) | NodeKind::Space(text)) => {
                    self.build_text(child, text, id);
                }
                _ => {}
            }
        }

        self.build_pseudo(node, PseudoElement::After, id);

        // Structure fixups once the children exist.
        match kind {
            BoxKind::Block | BoxKind::InlineBlock | BoxKind::TableCell | BoxKind::TableCaption => {
                self.wrap_anonymous_blocks(id);
            }
            BoxKind::Flex => self.wrap_flex_items(id),
            BoxKind::Table => self.normalize_table(id),
            _ => {}
        }

        Some(id)
    }

    /// `colspan`/`rowspan` attributes consumed by table layout.
    fn attach_cell_spans(&mut self, node: NodeId, id: BoxId) {
        let Some(element) = self.tree.as_element(node) else {
            return;
        };
        let parse = |name: &str| -> u16 {
            element
                .attrs
                .get(name)
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(1)
                .max(1)
        };
        self.out.get_mut(id).table_spans = (parse("colspan"), parse("rowspan"));
    }

    /// Replaced elements: images take their size from the container and
    /// their `width`/`height` attributes as presentational hints.
    fn attach_replaced_content(&mut self, node: NodeId, id: BoxId) {
        if self.tree.tag(node) != Some(TagId::IMG) {
            return;
        }
        let Some(element) = self.tree.as_element(node) else {
            return;
        };
        let src = element.attrs.get("src").unwrap_or("").to_string();
        self.container.load_image(&src, "", false);
        let intrinsic = self.container.get_image_size(&src, "");

        let width_attr = element
            .attrs
            .get("width")
            .map(|w| Length::from_string(w, "", -1));
        let height_attr = element
            .attrs
            .get("height")
            .map(|h| Length::from_string(h, "", -1));

        let render_box = self.out.get_mut(id);
        render_box.replaced = Some(ReplacedContent::Image { src });
        render_box.intrinsic = intrinsic;
        // Attribute sizes fill in only where CSS left auto.
        if render_box.style.width.is_predefined() {
            if let Some(width) = width_attr {
                if !width.is_predefined() {
                    render_box.style.width = width;
                }
            }
        }
        if render_box.style.height.is_predefined() {
            if let Some(height) = height_attr {
                if !height.is_predefined() {
                    render_box.style.height = height;
                }
            }
        }
    }

    /// Generated content boxes for `::before` / `::after`.
    fn build_pseudo(&mut self, node: NodeId, pseudo: PseudoElement, parent: BoxId) {
        let Some(style) = self.styles.pseudo.get(&(node, pseudo)) else {
            return;
        };
        if style.display == Display::None {
            return;
        }
        let Some(content) = style.content.clone() else {
            return;
        };
        let kind = if style.display.is_block_level() {
            BoxKind::Block
        } else {
            BoxKind::Inline
        };
        let id = self.alloc_box(kind, Some(node), Some(pseudo), style.clone(), Some(parent));
        let text_style = style.clone();
        let _ = self.alloc_box(BoxKind::Text(content), None, None, text_style, Some(id));
    }

    /// Whitespace-process a text node into zero or one text boxes.
    fn build_text(&mut self, node: NodeId, text: &str, parent: BoxId) {
        let parent_style = self.out.get(parent).style.clone();
        let processed = process_text(text, parent_style.white_space, parent_style.text_transform);
        if processed.is_empty() {
            return;
        }
        // Pure whitespace contributes nothing unless it can separate
        // inline siblings.
        if processed.trim().is_empty() && !self.has_inline_content(parent) {
            return;
        }
        let _ = self.alloc_box(
            BoxKind::Text(processed),
            Some(node),
            None,
            parent_style,
            Some(parent),
        );
    }

    /// True if the box already holds inline-level content (text joins a
    /// run rather than standing between blocks).
    fn has_inline_content(&self, id: BoxId) -> bool {
        self.out
            .get(id)
            .children
            .iter()
            .any(|&c| self.out.get(c).kind.is_inline_level())
    }

    /// [CSS2 § 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "If a block container box has a block-level box inside it, then
    /// we force it to have only block-level boxes inside it" — runs of
    /// inline-level children are wrapped in anonymous block boxes.
    fn wrap_anonymous_blocks(&mut self, id: BoxId) {
        let children = self.out.get(id).children.clone();
        let has_block = children
            .iter()
            .any(|&c| self.out.get(c).kind.is_block_level() || matches!(self.out.get(c).kind, BoxKind::TableRow | BoxKind::TableRowGroup | BoxKind::TableCell));
        let has_inline = children.iter().any(|&c| self.out.get(c).kind.is_inline_level());
        if !(has_block && has_inline) {
            return;
        }

        let style = anonymous_style(&self.out.get(id).style);
        let mut rebuilt: Vec<BoxId> = Vec::new();
        let mut run: Vec<BoxId> = Vec::new();
        for child in children {
            if self.out.get(child).kind.is_inline_level() {
                run.push(child);
            } else {
                self.flush_inline_run(&mut run, &mut rebuilt, id, &style);
                rebuilt.push(child);
            }
        }
        self.flush_inline_run(&mut run, &mut rebuilt, id, &style);
        self.out.get_mut(id).children = rebuilt;
    }

    fn flush_inline_run(
        &mut self,
        run: &mut Vec<BoxId>,
        rebuilt: &mut Vec<BoxId>,
        parent: BoxId,
        style: &ComputedStyle,
    ) {
        if run.is_empty() {
            return;
        }
        // Whitespace-only runs between blocks generate nothing.
        let only_space = run.iter().all(|&c| match &self.out.get(c).kind {
            BoxKind::Text(text) => text.trim().is_empty(),
            _ => false,
        });
        if only_space {
            run.clear();
            return;
        }
        let wrapper = self.alloc_box(
            BoxKind::AnonymousBlock,
            None,
            None,
            style.clone(),
            None,
        );
        self.out.get_mut(wrapper).parent = Some(parent);
        for &child in run.iter() {
            self.out.get_mut(child).parent = Some(wrapper);
        }
        self.out.get_mut(wrapper).children = std::mem::take(run);
        rebuilt.push(wrapper);
    }

    /// [CSS Flexbox § 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
    ///
    /// "Each in-flow child of a flex container becomes a flex item, and
    /// each contiguous sequence of child text runs is wrapped in an
    /// anonymous block container flex item."
    fn wrap_flex_items(&mut self, id: BoxId) {
        let children = self.out.get(id).children.clone();
        let style = anonymous_style(&self.out.get(id).style);
        let mut rebuilt = Vec::new();
        let mut run = Vec::new();
        for child in children {
            if matches!(self.out.get(child).kind, BoxKind::Text(_)) {
                run.push(child);
            } else {
                self.flush_inline_run(&mut run, &mut rebuilt, id, &style);
                rebuilt.push(child);
            }
        }
        self.flush_inline_run(&mut run, &mut rebuilt, id, &style);
        self.out.get_mut(id).children = rebuilt;
    }

    /// [CSS2 § 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
    ///
    /// Synthesize the missing wrappers so the table subtree always reads
    /// `table > (caption | row-group) > row > cell`.
    fn normalize_table(&mut self, table: BoxId) {
        // STEP 1: cells or other strays directly in the table get a row.
        self.wrap_runs(
            table,
            |kind| !matches!(kind, BoxKind::TableRow | BoxKind::TableRowGroup | BoxKind::TableCaption),
            BoxKind::TableRow,
        );
        // STEP 2: rows directly in the table get a row group.
        self.wrap_runs(
            table,
            |kind| matches!(kind, BoxKind::TableRow),
            BoxKind::TableRowGroup,
        );
        // STEP 3: anything in a row that is not a cell becomes a cell.
        let groups = self.out.get(table).children.clone();
        for group in groups {
            if !matches!(self.out.get(group).kind, BoxKind::TableRowGroup) {
                continue;
            }
            let rows = self.out.get(group).children.clone();
            for row in rows {
                if matches!(self.out.get(row).kind, BoxKind::TableRow) {
                    self.wrap_runs(row, |kind| !matches!(kind, BoxKind::TableCell), BoxKind::TableCell);
                }
            }
        }
    }

    /// Wrap maximal runs of children matching `needs_wrap` in a new box
    /// of `wrapper_kind`.
    fn wrap_runs(
        &mut self,
        parent: BoxId,
        needs_wrap: impl Fn(&BoxKind) -> bool,
        wrapper_kind: BoxKind,
    ) {
        let children = self.out.get(parent).children.clone();
        if !children.iter().any(|&c| needs_wrap(&self.out.get(c).kind)) {
            return;
        }
        let style = anonymous_style(&self.out.get(parent).style);
        let mut rebuilt = Vec::new();
        let mut run: Vec<BoxId> = Vec::new();
        for child in children {
            if needs_wrap(&self.out.get(child).kind) {
                // Whitespace-only text between rows/cells is dropped.
                if let BoxKind::Text(text) = &self.out.get(child).kind {
                    if text.trim().is_empty() {
                        continue;
                    }
                }
                run.push(child);
            } else {
                self.commit_wrap_run(&mut run, &mut rebuilt, parent, &style, &wrapper_kind);
                rebuilt.push(child);
            }
        }
        self.commit_wrap_run(&mut run, &mut rebuilt, parent, &style, &wrapper_kind);
        self.out.get_mut(parent).children = rebuilt;
    }

    fn commit_wrap_run(
        &mut self,
        run: &mut Vec<BoxId>,
        rebuilt: &mut Vec<BoxId>,
        parent: BoxId,
        style: &ComputedStyle,
        wrapper_kind: &BoxKind,
    ) {
        if run.is_empty() {
            return;
        }
        let wrapper = self.alloc_box(wrapper_kind.clone(), None, None, style.clone(), None);
        self.out.get_mut(wrapper).parent = Some(parent);
        for &child in run.iter() {
            self.out.get_mut(child).parent = Some(wrapper);
        }
        self.out.get_mut(wrapper).children = std::mem::take(run);
        rebuilt.push(wrapper);
    }
}

/// The style of an anonymous box: inherited properties only, box
/// properties at their initial values.
fn anonymous_style(parent: &ComputedStyle) -> ComputedStyle {
    ComputedStyle::inherit_from(parent, &marten_css::DefaultEnv)
}

/// Whitespace processing per `white-space`, plus `text-transform`.
///
/// [CSS2 § 16.6.1 The 'white-space' processing model](https://www.w3.org/TR/CSS2/text.html#white-space-model)
fn process_text(text: &str, white_space: WhiteSpace, transform: TextTransform) -> String {
    let collapsed = if white_space.collapses() {
        let keep_newlines = white_space == WhiteSpace::PreLine;
        let mut out = String::with_capacity(text.len());
        let mut in_space = false;
        for c in text.chars() {
            let is_space = c == ' ' || c == '\t' || c == '\r' || (c == '\n' && !keep_newlines);
            if is_space {
                if !in_space {
                    out.push(' ');
                }
                in_space = true;
            } else {
                out.push(c);
                in_space = false;
            }
        }
        out
    } else {
        text.to_string()
    };

    match transform {
        TextTransform::None => collapsed,
        TextTransform::Uppercase => collapsed.to_uppercase(),
        TextTransform::Lowercase => collapsed.to_lowercase(),
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(collapsed.len());
            let mut at_word_start = true;
            for c in collapsed.chars() {
                if c.is_alphanumeric() {
                    if at_word_start {
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                    at_word_start = false;
                } else {
                    out.push(c);
                    at_word_start = true;
                }
            }
            out
        }
    }
}

/// The font's own line height for `line-height: normal`, or the style's
/// resolved value.
#[must_use]
pub fn line_height_px(style: &ComputedStyle, metrics: &FontMetrics) -> i32 {
    match &style.line_height {
        LineHeight::Normal => metrics.height.max(metrics.ascent + metrics.descent),
        LineHeight::Number(n) => crate::geometry::round_half_even(style.font_size * n),
        LineHeight::Length(length) => {
            crate::geometry::round_half_even(match length.units() {
                marten_css::LengthUnit::Em => length.val() * style.font_size,
                marten_css::LengthUnit::Percent => length.calc_percent(style.font_size),
                _ => length.val(),
            })
        }
    }
}
