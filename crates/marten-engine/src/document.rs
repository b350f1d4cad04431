//! The document: parse → cascade → render tree → layout → paint.
//!
//! The host drives the pipeline with a render/draw loop:
//!
//! ```text
//! let document = Document::create_from_string(html, &mut container, &context);
//! document.render(&mut container, width, RenderMode::All);
//! document.draw(&mut container, hdc, 0, 0, &clip)?;
//! ```
//!
//! The document owns its DOM, stylesheets, styles, and render tree
//! exclusively; fonts and images are borrowed from the container. All
//! operations are single-threaded and run to completion; the only
//! suspension points are the synchronous container callbacks.

use marten_css::cascade::{compute_styles, CascadeInput, Origin};
use marten_css::selector::ElementStates;
use marten_css::style::CascadeEnv;
use marten_css::{
    collect_stylesheet_links, extract_style_content, MediaFeatures, MediaQueryList, Stylesheet,
    StyleMaps,
};
use marten_css::parser::{MediaRule, Rule};
use marten_dom::{DomTree, NodeId, TagId};
use marten_html::parse_document;

use crate::container::{DocumentContainer, FontHandle, DrawHandle};
use crate::geometry::{Rect, Size};
use crate::hit::{box_at_point, element_of, enclosing_anchor, hover_chain};
use crate::layout::{layout_document, RenderMode};
use crate::paint::paint_document;
use crate::render_tree::{RenderTree, RenderTreeBuilder};
use crate::EngineError;

/// The built-in master stylesheet, parsed once per [`Context`].
const MASTER_CSS: &str = include_str!("master.css");

/// Maximum `@import` nesting before further imports are ignored.
const MAX_IMPORT_DEPTH: u32 = 8;

/// Dependent layout geometry (document extents feeding back into
/// layout) converges within this many passes, by construction.
const LAYOUT_RETRIES: u32 = 2;

/// Shared, read-only context: the master (user-agent) stylesheet plus
/// an optional user sheet. One context may serve many documents.
#[derive(Debug, Clone)]
pub struct Context {
    master: Stylesheet,
    user: Option<Stylesheet>,
}

impl Context {
    /// A context with the built-in master stylesheet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            master: Stylesheet::parse(MASTER_CSS),
            user: None,
        }
    }

    /// Attach a user stylesheet (between user-agent and author origins).
    #[must_use]
    pub fn with_user_stylesheet(mut self, css: &str) -> Self {
        self.user = Some(Stylesheet::parse(css));
        self
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed, styleable, renderable document.
pub struct Document {
    dom: DomTree,
    context: Context,
    author_sheets: Vec<Stylesheet>,
    styles: StyleMaps,
    states: ElementStates,
    render_tree: Option<RenderTree>,
    fonts: Vec<FontHandle>,
    size: Size,
    media: MediaFeatures,
    language: String,
    base_url: String,
    /// Styles must be recomputed before the next render (dynamic state
    /// or media/language changed).
    needs_restyle: bool,
    rendered: bool,
}

impl Document {
    /// Parse an HTML byte stream and prepare styles.
    ///
    /// The parser never fails; malformed input produces a best-effort
    /// tree. Stylesheets referenced by `<link rel="stylesheet">` and
    /// `@import` are fetched synchronously through the container.
    #[must_use]
    pub fn create_from_string(
        html: &str,
        container: &mut dyn DocumentContainer,
        context: &Context,
    ) -> Self {
        let dom = parse_document(html.as_bytes());

        // Document metadata callbacks.
        if let Some(title) = document_title(&dom) {
            container.set_caption(&title);
        }
        let base_url = base_href(&dom).unwrap_or_default();
        if !base_url.is_empty() {
            container.set_base_url(&base_url);
        }
        // Host hook: offer every element to the container once.
        for id in dom.iter_all() {
            if let Some(element) = dom.as_element(id) {
                let _ = container.create_element(&element.tag_name, &element.attrs);
            }
        }

        let author_sheets = collect_author_sheets(&dom, container, &base_url);
        let media = container.get_media_features();
        let language = container.get_language().0;

        let mut document = Self {
            dom,
            context: context.clone(),
            author_sheets,
            styles: StyleMaps::default(),
            states: ElementStates::default(),
            render_tree: None,
            fonts: Vec::new(),
            size: Size::default(),
            media,
            language,
            base_url,
            needs_restyle: false,
            rendered: false,
        };
        document.restyle(container);
        document
    }

    /// Recompute the cascade for the current states/media/language.
    fn restyle(&mut self, container: &mut dyn DocumentContainer) {
        let env = ContainerEnv(&*container);
        let mut sheets: Vec<(Origin, &Stylesheet)> =
            vec![(Origin::UserAgent, &self.context.master)];
        if let Some(user) = &self.context.user {
            sheets.push((Origin::User, user));
        }
        for sheet in &self.author_sheets {
            sheets.push((Origin::Author, sheet));
        }
        self.styles = compute_styles(
            &self.dom,
            &CascadeInput {
                sheets: &sheets,
                states: &self.states,
                features: &self.media,
                language: &self.language,
                env: &env,
            },
        );
        self.needs_restyle = false;
        // Styles changed: the box tree no longer matches.
        self.render_tree = None;
    }

    /// Rebuild the render tree, releasing fonts from the previous one.
    fn rebuild(&mut self, container: &mut dyn DocumentContainer) {
        for font in self.fonts.drain(..) {
            container.delete_font(font);
        }
        let builder = RenderTreeBuilder::new(&self.dom, &self.styles, container);
        let (tree, fonts) = builder.build();
        self.render_tree = Some(tree);
        self.fonts = fonts;
    }

    /// Lay the document out at `max_width`.
    ///
    /// Returns the resulting document width. Layout cannot fail;
    /// degenerate inputs produce zero extents. Dependent geometry is
    /// settled by re-running the pass at most [`LAYOUT_RETRIES`] times.
    pub fn render(
        &mut self,
        container: &mut dyn DocumentContainer,
        max_width: i32,
        mode: RenderMode,
    ) -> i32 {
        if self.needs_restyle {
            self.restyle(container);
        }
        if self.render_tree.is_none() {
            self.rebuild(container);
        }
        let Some(render_tree) = self.render_tree.as_mut() else {
            return 0;
        };

        let mut size = Size::default();
        for _ in 0..LAYOUT_RETRIES {
            size = layout_document(render_tree, container, max_width.max(0), mode);
            if size == self.size {
                break;
            }
            self.size = size;
        }
        self.size = size;
        self.rendered = true;
        self.size.width
    }

    /// Paint the document into `hdc` at offset `(dx, dy)`, limited to
    /// `clip` in document coordinates.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotRendered`] when no successful `render` preceded
    /// this call (asserted in debug builds).
    pub fn draw(
        &self,
        container: &mut dyn DocumentContainer,
        hdc: DrawHandle,
        dx: i32,
        dy: i32,
        clip: &Rect,
    ) -> Result<(), EngineError> {
        debug_assert!(self.rendered, "draw called before render");
        if !self.rendered {
            return Err(EngineError::NotRendered);
        }
        if let Some(render_tree) = &self.render_tree {
            paint_document(render_tree, container, hdc, dx, dy, clip);
        }
        Ok(())
    }

    /// Document content width from the last render.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.size.width
    }

    /// Document content height from the last render.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.size.height
    }

    /// The parsed DOM (read-only for the life of the document).
    #[must_use]
    pub fn dom(&self) -> &DomTree {
        &self.dom
    }

    /// Computed styles from the last cascade.
    #[must_use]
    pub fn styles(&self) -> &StyleMaps {
        &self.styles
    }

    /// The laid-out render tree, once `render` has run.
    #[must_use]
    pub fn render_tree(&self) -> Option<&RenderTree> {
        self.render_tree.as_ref()
    }

    /// Pointer moved to `(x, y)` in document coordinates.
    ///
    /// Updates `:hover` state on the hit element and its ancestor chain
    /// and returns the rectangles whose styling changed, so the host
    /// can redraw only those.
    pub fn on_mouse_over(
        &mut self,
        container: &mut dyn DocumentContainer,
        x: i32,
        y: i32,
        _client_x: i32,
        _client_y: i32,
    ) -> Vec<Rect> {
        let hit = self.hit_element(x, y);
        let new_chain: Vec<NodeId> = hit
            .map(|element| hover_chain(&self.dom, element))
            .unwrap_or_default();

        // The hovered element picks the cursor.
        if let Some(element) = hit {
            let cursor = self
                .styles
                .get(element)
                .and_then(|style| style.cursor.clone())
                .unwrap_or_else(|| "auto".to_string());
            container.set_cursor(&cursor);
        }

        let new_set: std::collections::HashSet<NodeId> = new_chain.iter().copied().collect();
        if new_set == self.states.hovered {
            return Vec::new();
        }

        let mut dirty: Vec<NodeId> = self
            .states
            .hovered
            .symmetric_difference(&new_set)
            .copied()
            .collect();
        dirty.sort_unstable();
        self.states.hovered = new_set;
        // Style re-resolution picks up the :hover rules on the next
        // render.
        self.needs_restyle = true;
        self.dirty_rects(&dirty)
    }

    /// Left button pressed at `(x, y)`: sets `:active` on the hit
    /// chain.
    pub fn on_lbutton_down(
        &mut self,
        _container: &mut dyn DocumentContainer,
        x: i32,
        y: i32,
        _client_x: i32,
        _client_y: i32,
    ) -> Vec<Rect> {
        let chain: Vec<NodeId> = self
            .hit_element(x, y)
            .map(|element| hover_chain(&self.dom, element))
            .unwrap_or_default();
        let new_set: std::collections::HashSet<NodeId> = chain.into_iter().collect();
        if new_set == self.states.active {
            return Vec::new();
        }
        let mut dirty: Vec<NodeId> = self
            .states
            .active
            .symmetric_difference(&new_set)
            .copied()
            .collect();
        dirty.sort_unstable();
        self.states.active = new_set;
        self.needs_restyle = true;
        self.dirty_rects(&dirty)
    }

    /// Left button released: completes a click (anchor dispatch) and
    /// clears `:active`.
    pub fn on_lbutton_up(
        &mut self,
        container: &mut dyn DocumentContainer,
        x: i32,
        y: i32,
        _client_x: i32,
        _client_y: i32,
    ) -> Vec<Rect> {
        let hit = self.hit_element(x, y);
        if let Some(element) = hit {
            let was_active = self.states.active.contains(&element);
            if was_active {
                if let Some((anchor, href)) = enclosing_anchor(&self.dom, element) {
                    container.on_anchor_click(&href, anchor);
                }
            }
        }
        let mut dirty: Vec<NodeId> = self.states.active.iter().copied().collect();
        dirty.sort_unstable();
        if dirty.is_empty() {
            return Vec::new();
        }
        self.states.active.clear();
        self.needs_restyle = true;
        self.dirty_rects(&dirty)
    }

    /// Pointer left the document: clears hover/active state.
    pub fn on_mouse_leave(&mut self, _container: &mut dyn DocumentContainer) -> Vec<Rect> {
        let mut dirty: Vec<NodeId> = self
            .states
            .hovered
            .union(&self.states.active)
            .copied()
            .collect();
        dirty.sort_unstable();
        if dirty.is_empty() {
            return Vec::new();
        }
        self.states.hovered.clear();
        self.states.active.clear();
        self.needs_restyle = true;
        self.dirty_rects(&dirty)
    }

    /// The container's media features changed (viewport resize, print).
    /// Styles are re-resolved against the fresh snapshot on the next
    /// render.
    pub fn media_changed(&mut self, container: &mut dyn DocumentContainer) {
        self.media = container.get_media_features();
        self.needs_restyle = true;
    }

    /// The container's reported language changed; `:lang()` matches are
    /// re-resolved on the next render.
    pub fn lang_changed(&mut self, container: &mut dyn DocumentContainer) {
        self.language = container.get_language().0;
        self.needs_restyle = true;
    }

    /// Release container-owned resources (fonts). The document remains
    /// usable; the next render re-creates what it needs.
    pub fn teardown(&mut self, container: &mut dyn DocumentContainer) {
        for font in self.fonts.drain(..) {
            container.delete_font(font);
        }
        self.render_tree = None;
        self.rendered = false;
    }

    fn hit_element(&self, x: i32, y: i32) -> Option<NodeId> {
        let render_tree = self.render_tree.as_ref()?;
        let hit = box_at_point(render_tree, x, y)?;
        element_of(render_tree, &self.dom, hit)
    }

    /// Border boxes of every box the changed elements generated.
    fn dirty_rects(&self, elements: &[NodeId]) -> Vec<Rect> {
        let Some(render_tree) = &self.render_tree else {
            return Vec::new();
        };
        let mut rects = Vec::new();
        for &element in elements {
            for &box_id in render_tree.boxes_for(element) {
                let rect = render_tree.get(box_id).border_box();
                if rect.width > 0 && rect.height > 0 {
                    rects.push(rect);
                }
            }
        }
        rects
    }
}

/// [`CascadeEnv`] over a container: default font, point conversion,
/// system colors, viewport.
struct ContainerEnv<'a>(&'a dyn DocumentContainer);

impl CascadeEnv for ContainerEnv<'_> {
    fn default_font_size(&self) -> f32 {
        self.0.get_default_font_size() as f32
    }

    fn default_font_family(&self) -> String {
        self.0.get_default_font_name()
    }

    fn pt_to_px(&self, pt: f32) -> f32 {
        // The container converts integers; scale to keep fractions.
        pt * self.0.pt_to_px(72) as f32 / 72.0
    }

    fn resolve_color(&self, name: &str) -> Option<String> {
        self.0.resolve_color(name)
    }

    fn viewport_size(&self) -> (f32, f32) {
        let client = self.0.get_client_rect();
        (client.width as f32, client.height as f32)
    }
}

/// The document's `<title>` text, if any.
fn document_title(dom: &DomTree) -> Option<String> {
    let title = dom
        .iter_all()
        .find(|&id| dom.tag(id) == Some(TagId::TITLE))?;
    let mut text = String::new();
    for &child in dom.children(title) {
        if let Some(t) = dom.as_text(child) {
            text.push_str(t);
        }
    }
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// The first `<base href>` value, if any.
fn base_href(dom: &DomTree) -> Option<String> {
    dom.iter_all().find_map(|id| {
        let element = dom.as_element(id)?;
        if element.tag == TagId::BASE {
            element.attrs.get("href").map(str::to_string)
        } else {
            None
        }
    })
}

/// Gather the document's author stylesheets: `<style>` contents, then
/// `<link rel="stylesheet">` fetched through the container, with
/// `@import` rules resolved recursively in both.
fn collect_author_sheets(
    dom: &DomTree,
    container: &mut dyn DocumentContainer,
    base_url: &str,
) -> Vec<Stylesheet> {
    let mut sheets = Vec::new();

    let inline = extract_style_content(dom);
    if !inline.trim().is_empty() {
        let mut sheet = Stylesheet::parse(&inline);
        resolve_imports(&mut sheet.rules, container, base_url, 0);
        sheets.push(sheet);
    }

    for link in collect_stylesheet_links(dom) {
        let (text, link_base) = container.import_css(&link.href, base_url);
        if text.is_empty() {
            // A missing stylesheet is a non-fatal miss.
            continue;
        }
        let mut sheet = Stylesheet::parse(&text);
        resolve_imports(&mut sheet.rules, container, &link_base, 0);
        if let Some(media) = &link.media {
            // The link's media attribute gates the whole sheet.
            let query = MediaQueryList::parse_text(media);
            sheet = Stylesheet {
                rules: vec![Rule::Media(MediaRule {
                    query,
                    rules: sheet.rules,
                })],
            };
        }
        sheets.push(sheet);
    }

    sheets
}

/// Replace `@import` rules with the fetched sheet's rules, media-gated
/// when the import carried a query. Failed fetches (empty text) vanish;
/// nesting is bounded by [`MAX_IMPORT_DEPTH`].
fn resolve_imports(
    rules: &mut Vec<Rule>,
    container: &mut dyn DocumentContainer,
    base_url: &str,
    depth: u32,
) {
    if depth >= MAX_IMPORT_DEPTH {
        return;
    }
    let mut resolved: Vec<Rule> = Vec::with_capacity(rules.len());
    for rule in rules.drain(..) {
        match rule {
            Rule::Import(import) => {
                let (text, import_base) = container.import_css(&import.url, base_url);
                if text.is_empty() {
                    continue;
                }
                let mut sheet = Stylesheet::parse(&text);
                resolve_imports(&mut sheet.rules, container, &import_base, depth + 1);
                match import.query {
                    Some(query) => resolved.push(Rule::Media(MediaRule {
                        query,
                        rules: sheet.rules,
                    })),
                    None => resolved.extend(sheet.rules),
                }
            }
            Rule::Media(mut media) => {
                resolve_imports(&mut media.rules, container, base_url, depth + 1);
                resolved.push(Rule::Media(media));
            }
            other => resolved.push(other),
        }
    }
    *rules = resolved;
}
