//! The document container: the capability set a host must supply.
//!
//! The engine performs no I/O, owns no fonts, and rasterizes nothing.
//! Everything platform-shaped — glyph measurement and painting, image
//! decode, fill/stroke primitives, the clip stack, viewport and media
//! queries — goes through this trait. Backends are plain structs
//! implementing it; the engine holds a `&mut dyn DocumentContainer` only
//! for the duration of a call.
//!
//! Re-entrancy: the container must not call back into the document from
//! inside one of these methods; the engine guarantees `set_clip`/
//! `del_clip` pairing is strictly LIFO over a whole `draw`.

use marten_css::style::{FontStyle, TextDecorationLine};
use marten_css::{MediaFeatures, WebColor};
use marten_dom::{AttrList, NodeId};

use crate::geometry::{BorderRadii, Rect, Size};

/// An opaque font handle minted by the container.
pub type FontHandle = usize;

/// An opaque device/drawing context handle passed through `draw`.
pub type DrawHandle = usize;

/// Metrics the container reports for a created font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the em box.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the em box.
    pub descent: i32,
    /// Line height the font suggests (ascent + descent + line gap).
    pub height: i32,
    /// Height of a lowercase 'x'.
    pub x_height: i32,
    /// Advance width of the '0' glyph, for `ch` units.
    pub ch_width: i32,
    /// True if the font wants trailing spaces measured and drawn.
    pub draw_spaces: bool,
    /// Baseline shift for `vertical-align: sub`.
    pub sub_shift: i32,
    /// Baseline shift for `vertical-align: super`.
    pub super_shift: i32,
}

/// What the engine asks for when resolving a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescription {
    /// Comma-separated family list, most preferred first.
    pub family: String,
    /// Size in px.
    pub size: i32,
    /// Weight 100–900.
    pub weight: u16,
    /// Italic flag.
    pub style: FontStyle,
    /// Decoration bits the backend may bake into the face.
    pub decoration: TextDecorationLine,
}

/// One background paint layer handed to the container.
///
/// The newer vector-of-layers protocol: the paint walk calls one
/// primitive per layer, bottom to top, each carrying its own geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundLayer {
    /// The border box of the painted element.
    pub border_box: Rect,
    /// The box the layer is clipped to (`background-clip`).
    pub clip_box: Rect,
    /// The box positions are relative to (`background-origin`).
    pub origin_box: Rect,
    /// Corner radii of the clip.
    pub radii: BorderRadii,
    /// Tiling mode.
    pub repeat: LayerRepeat,
    /// True when painting the root element's canvas background.
    pub is_root: bool,
}

/// Tiling for a background layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerRepeat {
    /// Tile in both axes.
    #[default]
    Repeat,
    /// Tile horizontally.
    RepeatX,
    /// Tile vertically.
    RepeatY,
    /// Paint once.
    NoRepeat,
}

/// A gradient color stop at a 0..=1 offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Offset along the gradient line, 0..=1.
    pub offset: f32,
    /// The color at this stop.
    pub color: WebColor,
}

/// A linear gradient layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    /// Gradient line angle in degrees (0 = to top, per CSS).
    pub angle: f32,
    /// Ordered color stops.
    pub stops: Vec<ColorStop>,
}

/// A radial gradient layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    /// Center, relative to the origin box.
    pub center: (i32, i32),
    /// Horizontal and vertical radius.
    pub radius: (i32, i32),
    /// Ordered color stops.
    pub stops: Vec<ColorStop>,
}

/// A conic gradient layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConicGradient {
    /// Center, relative to the origin box.
    pub center: (i32, i32),
    /// Starting angle in degrees.
    pub angle: f32,
    /// Ordered color stops.
    pub stops: Vec<ColorStop>,
}

/// Border sides and radii for `draw_borders`.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderPaint {
    /// Top side.
    pub top: BorderSide,
    /// Right side.
    pub right: BorderSide,
    /// Bottom side.
    pub bottom: BorderSide,
    /// Left side.
    pub left: BorderSide,
    /// Corner radii.
    pub radii: BorderRadii,
}

/// One painted border side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderSide {
    /// Used width in px (0 when the style is invisible).
    pub width: i32,
    /// Line style keyword.
    pub style: marten_css::style::BorderStyle,
    /// Resolved color (currentColor already substituted).
    pub color: WebColor,
}

/// A list marker for `draw_list_marker`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListMarker {
    /// The glyph kind (disc, circle, square); textual markers are drawn
    /// through `draw_text` instead.
    pub marker_type: marten_css::style::ListStyleType,
    /// Marker color.
    pub color: WebColor,
    /// Where to paint it.
    pub pos: Rect,
    /// Marker image URL, if `list-style-image` applies.
    pub image: Option<String>,
    /// Base URL for resolving the image.
    pub base_url: String,
}

/// The abstract sink for measurement, painting, resources, and
/// environment queries. Every backend supplies the full set; the
/// defaulted methods are genuine no-ops for headless embedders.
#[allow(unused_variables)]
pub trait DocumentContainer {
    /// Resolve a font and report its metrics.
    fn create_font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics);

    /// Release a font handle.
    fn delete_font(&mut self, font: FontHandle);

    /// Advance width of a run, including side bearings.
    fn text_width(&mut self, text: &str, font: FontHandle) -> i32;

    /// Paint a run; the baseline sits at `pos.bottom() - descent`.
    fn draw_text(
        &mut self,
        hdc: DrawHandle,
        text: &str,
        font: FontHandle,
        color: WebColor,
        pos: &Rect,
    );

    /// Environment-dependent point-to-pixel conversion.
    fn pt_to_px(&self, pt: i32) -> i32 {
        pt * 96 / 72
    }

    /// Initial `font-size` in px.
    fn get_default_font_size(&self) -> i32 {
        16
    }

    /// Initial `font-family`.
    fn get_default_font_name(&self) -> String {
        "serif".to_string()
    }

    /// Hand off an image URL for (async) loading.
    fn load_image(&mut self, src: &str, base_url: &str, redraw_on_ready: bool) {}

    /// Synchronous image size query; zero size means "not available".
    fn get_image_size(&mut self, src: &str, base_url: &str) -> Size {
        Size::default()
    }

    /// Paint a decoded image into a background layer.
    fn draw_image(&mut self, hdc: DrawHandle, layer: &BackgroundLayer, url: &str, base_url: &str) {
    }

    /// Fill a background layer with a solid color.
    fn draw_solid_fill(&mut self, hdc: DrawHandle, layer: &BackgroundLayer, color: WebColor) {}

    /// Paint a linear-gradient layer.
    fn draw_linear_gradient(
        &mut self,
        hdc: DrawHandle,
        layer: &BackgroundLayer,
        gradient: &LinearGradient,
    ) {
    }

    /// Paint a radial-gradient layer.
    fn draw_radial_gradient(
        &mut self,
        hdc: DrawHandle,
        layer: &BackgroundLayer,
        gradient: &RadialGradient,
    ) {
    }

    /// Paint a conic-gradient layer.
    fn draw_conic_gradient(
        &mut self,
        hdc: DrawHandle,
        layer: &BackgroundLayer,
        gradient: &ConicGradient,
    ) {
    }

    /// Paint four border sides with radii.
    fn draw_borders(&mut self, hdc: DrawHandle, borders: &BorderPaint, pos: &Rect, is_root: bool) {
    }

    /// Paint a disc/circle/square/image list marker.
    fn draw_list_marker(&mut self, hdc: DrawHandle, marker: &ListMarker) {}

    /// Push a clip rectangle. The engine pairs every call with exactly
    /// one [`Self::del_clip`], strictly LIFO.
    fn set_clip(&mut self, pos: &Rect, radii: &BorderRadii) {}

    /// Pop the most recent clip.
    fn del_clip(&mut self) {}

    /// The viewport rectangle, for `%`, `vw`, `vh` and fixed
    /// positioning.
    fn get_client_rect(&self) -> Rect;

    /// The visible viewport. Distinct from the client rect only for
    /// hosts with off-screen drawing surfaces.
    fn get_viewport(&self) -> Rect {
        self.get_client_rect()
    }

    /// Fill the media feature snapshot for `@media` evaluation.
    fn get_media_features(&self) -> MediaFeatures {
        let client = self.get_client_rect();
        MediaFeatures {
            width: client.width,
            height: client.height,
            device_width: client.width,
            device_height: client.height,
            ..MediaFeatures::default()
        }
    }

    /// Report `(language, culture)` for `:lang()` matching.
    fn get_language(&self) -> (String, String) {
        ("en".to_string(), String::new())
    }

    /// Resolve a system color name to `#rrggbb`.
    fn resolve_color(&self, name: &str) -> Option<String> {
        None
    }

    /// Synchronously fetch a stylesheet. Returns the CSS text and the
    /// base URL subsequent relative URLs resolve against; empty text is
    /// a non-fatal miss.
    fn import_css(&mut self, url: &str, base_url: &str) -> (String, String) {
        (String::new(), base_url.to_string())
    }

    /// An anchor was activated by a completed click.
    fn on_anchor_click(&mut self, url: &str, element: NodeId) {}

    /// The hovered element wants this cursor.
    fn set_cursor(&mut self, cursor: &str) {}

    /// The document title changed.
    fn set_caption(&mut self, caption: &str) {}

    /// A `<base href>` was seen.
    fn set_base_url(&mut self, url: &str) {}

    /// Host hook for custom elements. Returning `false` leaves the tag
    /// as a generic element; the engine does not interpret host element
    /// internals.
    fn create_element(&mut self, tag_name: &str, attrs: &AttrList) -> bool {
        false
    }
}
