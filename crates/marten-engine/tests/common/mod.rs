//! A deterministic test container with fixed font metrics.
//!
//! Glyphs are `size / 2` px wide, ascent is 80% of the size, and every
//! draw call is recorded, so layout results are exact and paint order
//! is assertable.

use std::collections::HashMap;

use marten_css::WebColor;
use marten_engine::container::{
    BackgroundLayer, BorderPaint, DocumentContainer, DrawHandle, FontDescription, FontHandle,
    FontMetrics, ListMarker,
};
use marten_engine::geometry::{BorderRadii, Rect, Size};

/// Everything the engine asked the container to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Text {
        text: String,
        color: WebColor,
        pos: Rect,
    },
    SolidFill {
        color: WebColor,
        pos: Rect,
    },
    Image {
        url: String,
        pos: Rect,
    },
    Borders {
        pos: Rect,
    },
    ListMarker {
        pos: Rect,
    },
    SetClip {
        pos: Rect,
    },
    DelClip,
    AnchorClick {
        url: String,
    },
    SetCursor {
        cursor: String,
    },
    SetCaption {
        caption: String,
    },
}

/// The recording container.
pub struct TestContainer {
    pub viewport: Rect,
    pub events: Vec<Event>,
    pub images: HashMap<String, Size>,
    pub imports: HashMap<String, String>,
    next_font: FontHandle,
    pub live_fonts: Vec<(FontHandle, i32)>,
    pub deleted_fonts: Vec<FontHandle>,
    clip_depth: i32,
    pub max_clip_depth: i32,
}

impl TestContainer {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            viewport: Rect::new(0, 0, width, height),
            events: Vec::new(),
            images: HashMap::new(),
            imports: HashMap::new(),
            next_font: 1,
            live_fonts: Vec::new(),
            deleted_fonts: Vec::new(),
            clip_depth: 0,
            max_clip_depth: 0,
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clip_balance(&self) -> i32 {
        self.clip_depth
    }

    fn font_size(&self, font: FontHandle) -> i32 {
        self.live_fonts
            .iter()
            .find(|&&(handle, _)| handle == font)
            .map_or(16, |&(_, size)| size)
    }

    fn measure(&self, text: &str, font: FontHandle) -> i32 {
        let size = self.font_size(font);
        text.chars().count() as i32 * (size / 2)
    }
}

impl DocumentContainer for TestContainer {
    fn create_font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics) {
        let handle = self.next_font;
        self.next_font += 1;
        self.live_fonts.push((handle, description.size));
        let size = description.size;
        let descent = size / 5;
        let ascent = size - descent;
        let metrics = FontMetrics {
            ascent,
            descent,
            height: size + size / 4,
            x_height: size / 2,
            ch_width: size / 2,
            draw_spaces: false,
            sub_shift: size / 5,
            super_shift: size / 3,
        };
        (handle, metrics)
    }

    fn delete_font(&mut self, font: FontHandle) {
        self.live_fonts.retain(|&(handle, _)| handle != font);
        self.deleted_fonts.push(font);
    }

    fn text_width(&mut self, text: &str, font: FontHandle) -> i32 {
        self.measure(text, font)
    }

    fn draw_text(
        &mut self,
        _hdc: DrawHandle,
        text: &str,
        _font: FontHandle,
        color: WebColor,
        pos: &Rect,
    ) {
        self.events.push(Event::Text {
            text: text.to_string(),
            color,
            pos: *pos,
        });
    }

    fn load_image(&mut self, _src: &str, _base_url: &str, _redraw_on_ready: bool) {}

    fn get_image_size(&mut self, src: &str, _base_url: &str) -> Size {
        self.images.get(src).copied().unwrap_or_default()
    }

    fn draw_image(&mut self, _hdc: DrawHandle, layer: &BackgroundLayer, url: &str, _base: &str) {
        self.events.push(Event::Image {
            url: url.to_string(),
            pos: layer.border_box,
        });
    }

    fn draw_solid_fill(&mut self, _hdc: DrawHandle, layer: &BackgroundLayer, color: WebColor) {
        self.events.push(Event::SolidFill {
            color,
            pos: layer.border_box,
        });
    }

    fn draw_borders(&mut self, _hdc: DrawHandle, _borders: &BorderPaint, pos: &Rect, _root: bool) {
        self.events.push(Event::Borders { pos: *pos });
    }

    fn draw_list_marker(&mut self, _hdc: DrawHandle, marker: &ListMarker) {
        self.events.push(Event::ListMarker { pos: marker.pos });
    }

    fn set_clip(&mut self, pos: &Rect, _radii: &BorderRadii) {
        self.clip_depth += 1;
        self.max_clip_depth = self.max_clip_depth.max(self.clip_depth);
        self.events.push(Event::SetClip { pos: *pos });
    }

    fn del_clip(&mut self) {
        self.clip_depth -= 1;
        assert!(self.clip_depth >= 0, "del_clip without matching set_clip");
        self.events.push(Event::DelClip);
    }

    fn get_client_rect(&self) -> Rect {
        self.viewport
    }

    fn import_css(&mut self, url: &str, base_url: &str) -> (String, String) {
        (
            self.imports.get(url).cloned().unwrap_or_default(),
            base_url.to_string(),
        )
    }

    fn on_anchor_click(&mut self, url: &str, _element: marten_dom::NodeId) {
        self.events.push(Event::AnchorClick {
            url: url.to_string(),
        });
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.events.push(Event::SetCursor {
            cursor: cursor.to_string(),
        });
    }

    fn set_caption(&mut self, caption: &str) {
        self.events.push(Event::SetCaption {
            caption: caption.to_string(),
        });
    }
}
