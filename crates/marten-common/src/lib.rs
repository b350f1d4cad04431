//! Shared utilities for the Marten rendering engine.
//!
//! This crate holds the leaf modules everything else builds on: lossy
//! UTF-8 decoding for the tokenizers, list-marker numeral conversion for
//! the paint walk, and a deduplicated warning sink used by the HTML and
//! CSS parsers to report unsupported input without failing.

pub mod numerals;
pub mod text;
pub mod warning;

pub use text::{decode_utf8_lossy, read_utf8_char, REPLACEMENT};
pub use warning::{clear_warnings, warn_once};
