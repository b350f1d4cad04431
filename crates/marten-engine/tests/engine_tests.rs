//! End-to-end engine tests: create → render → draw against the
//! deterministic test container.
//!
//! Font metrics in the container are exact (glyphs are `size/2` px
//! wide), so layout coordinates are asserted precisely.

mod common;

use common::{Event, TestContainer};
use marten_css::WebColor;
use marten_dom::{NodeId, TagId};
use marten_engine::{Context, Document, Rect, RenderMode};

fn render_document(html: &str, width: i32) -> (Document, TestContainer) {
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);
    let _ = document.render(&mut container, width, RenderMode::All);
    (document, container)
}

fn find_element(document: &Document, tag: TagId) -> NodeId {
    document
        .dom()
        .iter_all()
        .find(|&id| document.dom().tag(id) == Some(tag))
        .expect("element present")
}

fn box_rect(document: &Document, tag: TagId) -> Rect {
    let node = find_element(document, tag);
    let rt = document.render_tree().expect("rendered");
    let boxes = rt.boxes_for(node);
    assert!(!boxes.is_empty(), "no boxes for {tag:?}");
    rt.get(boxes[0]).pos
}

#[test]
fn body_text_renders_at_width_100() {
    let (mut document, mut container) = render_document("<html>Body</html>", 100);

    assert!(document.width() <= 100);
    assert!(document.height() > 0);
    // 4 glyphs at 8px in the default 16px font.
    assert_eq!(document.width(), 32);

    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .expect("draw after render");
    let texts = container.texts();
    assert_eq!(texts, ["Body"]);

    // Baseline placement: line top 0, baseline 15, ascent 13.
    let text_event = container
        .events
        .iter()
        .find_map(|e| match e {
            Event::Text { pos, .. } => Some(*pos),
            _ => None,
        })
        .unwrap();
    assert_eq!(text_event, Rect::new(0, 2, 32, 16));
}

#[test]
fn all_render_modes_run() {
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document = Document::create_from_string("<html>Body</html>", &mut container, &context);
    let _ = document.render(&mut container, 100, RenderMode::FixedOnly);
    let _ = document.render(&mut container, 100, RenderMode::NoFixed);
    let _ = document.render(&mut container, 100, RenderMode::All);
}

#[test]
fn empty_document_renders() {
    let (document, _) = render_document("", 100);
    assert_eq!(document.width(), 0);
}

#[test]
fn sized_div_with_margins() {
    let (document, _) = render_document(
        "<div style=\"width:50px;height:40px;margin:10px\"></div>",
        200,
    );
    assert_eq!(box_rect(&document, TagId::DIV), Rect::new(10, 10, 50, 40));
    // Content extents include the margins, not the auto-filled body.
    assert_eq!(document.width(), 70);
    assert_eq!(document.height(), 60);
}

#[test]
fn adjacent_margins_collapse() {
    let (document, _) = render_document(
        "<p style=\"margin:20px 0\">A</p><p style=\"margin:20px 0\">B</p>",
        200,
    );
    let rt = document.render_tree().unwrap();
    let dom = document.dom();
    let ps: Vec<NodeId> = dom
        .iter_all()
        .filter(|&id| dom.tag(id) == Some(TagId::P))
        .collect();
    let first = rt.get(rt.boxes_for(ps[0])[0]);
    let second = rt.get(rt.boxes_for(ps[1])[0]);

    let first_bottom = first.border_box().bottom();
    let second_top = second.border_box().y;
    // The gap is the collapsed 20px, not 40.
    assert_eq!(second_top - first_bottom, 20);
    assert_eq!(first.border_box().y, 20);
}

#[test]
fn auto_margins_center_a_sized_block() {
    let (document, _) = render_document(
        "<div style=\"width:100px;height:10px;margin:0 auto\"></div>",
        300,
    );
    assert_eq!(box_rect(&document, TagId::DIV), Rect::new(100, 0, 100, 10));
}

#[test]
fn missing_image_uses_attribute_size() {
    let (document, mut container) = render_document(
        "<img src=\"missing\" width=100 height=50>",
        300,
    );
    let img = box_rect(&document, TagId::IMG);
    assert_eq!((img.width, img.height), (100, 50));

    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    assert!(container.events.iter().any(|e| matches!(
        e,
        Event::Image { url, .. } if url == "missing"
    )));
}

#[test]
fn intrinsic_image_size_from_container() {
    let mut container = TestContainer::new(800, 600);
    let _ = container
        .images
        .insert("logo.png".to_string(), marten_engine::Size {
            width: 40,
            height: 30,
        });
    let context = Context::new();
    let mut document =
        Document::create_from_string("<img src=\"logo.png\">", &mut container, &context);
    let _ = document.render(&mut container, 300, RenderMode::All);
    let img = box_rect(&document, TagId::IMG);
    assert_eq!((img.width, img.height), (40, 30));
}

#[test]
fn text_wraps_at_container_width() {
    // Ten 4-glyph words at 32px each; 100px fits three per line
    // (32+8+32 = 72, +8+32 would be 112).
    let html = "<p style=\"margin:0\">aaaa bbbb cccc dddd</p>";
    let (document, mut container) = render_document(html, 100);
    let rt = document.render_tree().unwrap();
    let p = find_element(&document, TagId::P);
    let p_box = rt.get(rt.boxes_for(p)[0]);
    assert_eq!(p_box.lines.len(), 2, "expected a wrap");

    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    // Line 2 starts back at x = 0.
    let second_line = &p_box.lines[1];
    assert_eq!(second_line.fragments[0].rect.x, 0);
    assert!(second_line.top >= p_box.lines[0].top + p_box.lines[0].height);
}

#[test]
fn float_shortens_lines_and_clear_passes_it() {
    let html = "<div style=\"float:left;width:30px;height:30px\"></div>xxxx\
                <p style=\"clear:left;margin:0\">yy</p>";
    let (document, _) = render_document(html, 200);
    let rt = document.render_tree().unwrap();

    // The float sits at the left edge.
    let float_rect = box_rect(&document, TagId::DIV);
    assert_eq!(float_rect, Rect::new(0, 0, 30, 30));

    // Text beside the float starts after its margin box.
    let body = find_element(&document, TagId::BODY);
    let body_box = rt.get(rt.boxes_for(body)[0]);
    let text_x = body_box
        .children
        .iter()
        .map(|&c| rt.get(c))
        .flat_map(|b| &b.lines)
        .flat_map(|line| &line.fragments)
        .map(|f| f.rect.x)
        .next();
    if let Some(x) = text_x {
        assert!(x >= 30, "line must avoid the float, got x={x}");
    }

    // The cleared paragraph starts below the float's bottom edge.
    let p = box_rect(&document, TagId::P);
    assert!(p.y >= 30, "clear:left must drop below the float, got {}", p.y);
}

#[test]
fn flex_items_grow_equally() {
    let html = "<div style=\"display:flex;width:300px\">\
                <div style=\"flex:1;height:10px\"></div>\
                <div style=\"flex:1;height:10px\"></div></div>";
    let (document, _) = render_document(html, 400);
    let rt = document.render_tree().unwrap();
    let dom = document.dom();
    let divs: Vec<NodeId> = dom
        .iter_all()
        .filter(|&id| dom.tag(id) == Some(TagId::DIV))
        .collect();
    // divs[0] is the container.
    let first = rt.get(rt.boxes_for(divs[1])[0]).pos;
    let second = rt.get(rt.boxes_for(divs[2])[0]).pos;
    assert_eq!(first.width, 150);
    assert_eq!(second.width, 150);
    assert_eq!(first.x, 0);
    assert_eq!(second.x, 150);
}

#[test]
fn table_columns_size_to_content() {
    let html = "<table style=\"border-spacing:0\"><tr>\
                <td style=\"padding:1px\">aa</td>\
                <td style=\"padding:1px\">bbbb</td></tr></table>";
    let (document, _) = render_document(html, 400);
    let rt = document.render_tree().unwrap();
    let dom = document.dom();
    let cells: Vec<NodeId> = dom
        .iter_all()
        .filter(|&id| dom.tag(id) == Some(TagId::TD))
        .collect();
    let first = rt.get(rt.boxes_for(cells[0])[0]).border_box();
    let second = rt.get(rt.boxes_for(cells[1])[0]).border_box();

    // "aa" = 16px + 2px padding; "bbbb" = 32px + 2px padding.
    assert_eq!(first.width, 18);
    assert_eq!(second.width, 34);
    assert_eq!(second.x, first.x + first.width);
    assert_eq!(first.y, second.y);
    assert_eq!(first.height, second.height);

    // The auto-width table shrinks to its columns.
    let table = box_rect(&document, TagId::TABLE);
    assert_eq!(table.width, 52);
}

#[test]
fn absolute_box_offsets_within_positioned_ancestor() {
    let html = "<div style=\"position:relative;width:200px;height:100px\">\
                <div style=\"position:absolute;left:20px;top:10px;width:50px;height:30px\">\
                </div></div>";
    let (document, _) = render_document(html, 400);
    let rt = document.render_tree().unwrap();
    let dom = document.dom();
    let divs: Vec<NodeId> = dom
        .iter_all()
        .filter(|&id| dom.tag(id) == Some(TagId::DIV))
        .collect();
    let abs = rt.get(rt.boxes_for(divs[1])[0]);
    assert_eq!(abs.border_box(), Rect::new(20, 10, 50, 30));
}

#[test]
fn overflow_hidden_balances_clips() {
    let html = "<div style=\"overflow:hidden;width:50px;height:20px\">xxxx xxxx xxxx</div>";
    let (document, mut container) = render_document(html, 200);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    let sets = container
        .events
        .iter()
        .filter(|e| matches!(e, Event::SetClip { .. }))
        .count();
    let dels = container
        .events
        .iter()
        .filter(|e| matches!(e, Event::DelClip))
        .count();
    assert!(sets > 0, "overflow:hidden must push a clip");
    assert_eq!(sets, dels, "clips must balance");
    assert_eq!(container.clip_balance(), 0);
    assert!(container.max_clip_depth >= 1);
}

#[test]
fn backgrounds_paint_before_text() {
    let html = "<p style=\"background-color:#00f;margin:0\">x</p>";
    let (document, mut container) = render_document(html, 200);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    let fill_index = container
        .events
        .iter()
        .position(|e| matches!(e, Event::SolidFill { color, .. } if *color == WebColor::rgb(0, 0, 255)))
        .expect("background painted");
    let text_index = container
        .events
        .iter()
        .position(|e| matches!(e, Event::Text { .. }))
        .expect("text painted");
    assert!(fill_index < text_index);
}

#[test]
fn list_markers_paint() {
    let html = "<ul><li>one</li><li>two</li></ul>";
    let (document, mut container) = render_document(html, 300);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    let markers = container
        .events
        .iter()
        .filter(|e| matches!(e, Event::ListMarker { .. }))
        .count();
    assert_eq!(markers, 2);
}

#[test]
fn ordered_list_numbers_as_text() {
    let html = "<ol><li>one</li><li>two</li></ol>";
    let (document, mut container) = render_document(html, 300);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    let texts = container.texts();
    assert!(texts.contains(&"1."));
    assert!(texts.contains(&"2."));
}

#[test]
fn title_sets_caption() {
    let (_, container) = render_document("<title>Hello</title><p>x</p>", 200);
    assert!(container
        .events
        .iter()
        .any(|e| matches!(e, Event::SetCaption { caption } if caption == "Hello")));
}

#[test]
fn hover_reports_dirty_rects_and_restyles() {
    let html = "<style>p:hover { color: red }</style><p style=\"margin:0\">word</p>";
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);
    let _ = document.render(&mut container, 200, RenderMode::All);

    let p_rect = {
        let rt = document.render_tree().unwrap();
        let p = find_element(&document, TagId::P);
        rt.get(rt.boxes_for(p)[0]).border_box()
    };

    // Point inside the paragraph's text.
    let dirty = document.on_mouse_over(&mut container, p_rect.x + 2, p_rect.y + 2, 0, 0);
    assert!(
        dirty.iter().any(|r| *r == p_rect),
        "dirty rects must include the hovered paragraph's border box"
    );

    // Re-render picks up the :hover declaration.
    let _ = document.render(&mut container, 200, RenderMode::All);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    let red_text = container.events.iter().any(|e| {
        matches!(e, Event::Text { color, .. } if *color == WebColor::rgb(255, 0, 0))
    });
    assert!(red_text, "hovered paragraph must repaint red");

    // Moving elsewhere clears the state and dirties the same box.
    let dirty = document.on_mouse_over(&mut container, 700, 500, 0, 0);
    assert!(dirty.iter().any(|r| *r == p_rect));
}

#[test]
fn anchor_click_dispatches_to_container() {
    let html = "<a href=\"https://example.com\">link</a>";
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);
    let _ = document.render(&mut container, 300, RenderMode::All);

    let a_rect = {
        let rt = document.render_tree().unwrap();
        let a = find_element(&document, TagId::A);
        rt.get(rt.boxes_for(a)[0]).pos
    };
    let (x, y) = (a_rect.x + 1, a_rect.y + 1);
    let _ = document.on_lbutton_down(&mut container, x, y, x, y);
    let _ = document.on_lbutton_up(&mut container, x, y, x, y);

    assert!(container.events.iter().any(|e| {
        matches!(e, Event::AnchorClick { url } if url == "https://example.com")
    }));
}

#[test]
fn mouse_leave_clears_hover() {
    let html = "<style>p:hover{color:red}</style><p style=\"margin:0\">word</p>";
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);
    let _ = document.render(&mut container, 200, RenderMode::All);

    let _ = document.on_mouse_over(&mut container, 2, 2, 0, 0);
    let dirty = document.on_mouse_leave(&mut container);
    assert!(!dirty.is_empty());
    // A second leave is a no-op.
    assert!(document.on_mouse_leave(&mut container).is_empty());
}

#[test]
fn media_changed_reapplies_queries() {
    let html = "<style>@media (max-width: 500px) { p { color: red } }</style>\
                <p style=\"margin:0\">x</p>";
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);
    let _ = document.render(&mut container, 800, RenderMode::All);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    assert!(!container.events.iter().any(|e| {
        matches!(e, Event::Text { color, .. } if *color == WebColor::rgb(255, 0, 0))
    }));

    // Shrink the viewport below the breakpoint.
    container.viewport = Rect::new(0, 0, 400, 600);
    document.media_changed(&mut container);
    let _ = document.render(&mut container, 400, RenderMode::All);
    container.events.clear();
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    assert!(container.events.iter().any(|e| {
        matches!(e, Event::Text { color, .. } if *color == WebColor::rgb(255, 0, 0))
    }));
}

#[test]
fn imported_stylesheets_apply() {
    let html = "<style>@import url(extra.css);</style><p style=\"margin:0\">x</p>";
    let mut container = TestContainer::new(800, 600);
    let _ = container
        .imports
        .insert("extra.css".to_string(), "p { color: lime }".to_string());
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);
    let _ = document.render(&mut container, 200, RenderMode::All);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    assert!(container.events.iter().any(|e| {
        matches!(e, Event::Text { color, .. } if *color == WebColor::rgb(0, 255, 0))
    }));
}

#[test]
fn linked_stylesheets_apply() {
    let html = "<link rel=\"stylesheet\" href=\"site.css\"><p style=\"margin:0\">x</p>";
    let mut container = TestContainer::new(800, 600);
    let _ = container
        .imports
        .insert("site.css".to_string(), "p { color: teal }".to_string());
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);
    let _ = document.render(&mut container, 200, RenderMode::All);
    document
        .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
        .unwrap();
    assert!(container.events.iter().any(|e| {
        matches!(e, Event::Text { color, .. } if *color == WebColor::rgb(0, 0x80, 0x80))
    }));
}

#[test]
fn repeated_render_is_deterministic() {
    let html = "<div style=\"margin:7px\"><p>some text flows here</p>\
                <p style=\"width:60%\">and here</p></div>";
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document = Document::create_from_string(html, &mut container, &context);

    let _ = document.render(&mut container, 300, RenderMode::All);
    let first: Vec<Rect> = {
        let rt = document.render_tree().unwrap();
        rt.ids().map(|id| rt.get(id).border_box()).collect()
    };

    let _ = document.render(&mut container, 300, RenderMode::All);
    let second: Vec<Rect> = {
        let rt = document.render_tree().unwrap();
        rt.ids().map(|id| rt.get(id).border_box()).collect()
    };

    assert_eq!(first, second, "layout must be byte-identical across runs");
}

#[test]
fn content_dimensions_never_negative() {
    let html = "<div style=\"width:10px\"><p style=\"margin:0;width:500px\">overflow</p></div>\
                <div style=\"width:0;height:0\"></div>";
    let (document, _) = render_document(html, 50);
    let rt = document.render_tree().unwrap();
    for id in rt.ids() {
        let b = rt.get(id);
        assert!(b.pos.width >= 0, "negative width on {id:?}");
        assert!(b.pos.height >= 0, "negative height on {id:?}");
    }
}

#[test]
fn generated_content_renders() {
    let html = "<style>p::before { content: \"* \" }</style><p style=\"margin:0\">x</p>";
    let (_, mut container) = {
        let mut container = TestContainer::new(800, 600);
        let context = Context::new();
        let mut document = Document::create_from_string(html, &mut container, &context);
        let _ = document.render(&mut container, 200, RenderMode::All);
        document
            .draw(&mut container, 0, 0, 0, &Rect::new(0, 0, 800, 600))
            .unwrap();
        ((), container)
    };
    let texts = container.texts();
    assert!(texts.iter().any(|t| t.starts_with('*')), "::before content must paint, got {texts:?}");
}

#[test]
fn geometry_serializes_for_dumps() {
    let (document, _) = render_document("<div style=\"width:10px;height:5px\"></div>", 100);
    let rect = box_rect(&document, TagId::DIV);
    let json = serde_json::to_string(&rect).expect("serialize");
    assert!(json.contains("\"width\":10"));
    assert!(json.contains("\"height\":5"));
}

#[test]
fn teardown_releases_fonts() {
    let mut container = TestContainer::new(800, 600);
    let context = Context::new();
    let mut document =
        Document::create_from_string("<p>x</p>", &mut container, &context);
    let _ = document.render(&mut container, 200, RenderMode::All);
    assert!(!container.live_fonts.is_empty());
    document.teardown(&mut container);
    assert!(container.live_fonts.is_empty());
}
