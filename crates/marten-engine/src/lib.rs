//! Marten's document pipeline: render tree, layout, paint walk, hit
//! testing, and the container interface.
//!
//! # Scope
//!
//! This crate turns a styled DOM into pixels-by-proxy:
//!
//! - **[`DocumentContainer`]** — the capability set a host supplies:
//!   glyph measurement and painting, image I/O, fill/stroke primitives,
//!   the clip stack, and environment queries. The engine itself performs
//!   no I/O, owns no fonts, and rasterizes nothing.
//! - **[`Document`]** — the host-facing entry points:
//!   `create_from_string`, `render(width, mode)`, `draw`, mouse and
//!   anchor hit testing, `media_changed`/`lang_changed`.
//! - **Render tree** — arena-allocated boxes parallel to the DOM.
//! - **Layout** — block/inline/flex/table formatting contexts, floats,
//!   positioned boxes, integer-pixel commit.
//! - **Paint walk** — ordered container draw calls with strict LIFO
//!   clip pairing.
//!
//! # Concurrency
//!
//! Single-threaded cooperative: all operations on a document run on the
//! thread that created it, and the engine spawns nothing. The only
//! suspension points are synchronous container callbacks; the container
//! must not re-enter the document from inside one.

pub mod container;
pub mod document;
pub mod geometry;
pub mod hit;
pub mod layout;
pub mod paint;
pub mod render_tree;

pub use container::{
    BackgroundLayer, BorderPaint, BorderSide, ColorStop, ConicGradient, DocumentContainer,
    DrawHandle, FontDescription, FontHandle, FontMetrics, LayerRepeat, LinearGradient, ListMarker,
    RadialGradient,
};
pub use document::{Context, Document};
pub use geometry::{BorderRadii, EdgeInsets, Rect, Size};
pub use hit::box_at_point;
pub use layout::RenderMode;
pub use render_tree::{BoxId, BoxKind, LineBox, LineFragment, RenderBox, RenderTree};

use thiserror::Error;

/// Fatal engine-level failures surfaced to the host. Parsing and layout
/// never fail — these cover contract violations and container faults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// `draw` was called before a successful `render`. Asserted in
    /// debug builds; reported rather than undefined in release.
    #[error("draw called before render")]
    NotRendered,
    /// A container callback reported an unrecoverable fault; the
    /// current call was aborted and the previous layout retained.
    #[error("container failure: {0}")]
    Container(String),
}
