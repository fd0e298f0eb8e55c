#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Core coordinate types for annotation overlays: char spans, oracle
//! coordinates, single-range edits and the position mapper translating
//! between them.

/// Oracle and display coordinates.
pub mod coord;
/// Single-range edit descriptions.
pub mod edit;
/// Language identifiers.
pub mod language;
/// Oracle coordinate <-> char offset conversion.
pub mod position;
/// Text range types and buffer revisions.
pub mod range;
/// Offset remapping across edits.
pub mod remap;
/// Rope utilities and extensions.
pub mod rope;
/// Theme identifiers.
pub mod theme;

pub use coord::{DisplayCoord, OracleCoord};
pub use edit::TextEdit;
pub use language::LanguageId;
pub use position::{char_to_coord, char_to_display, coord_to_char, utf16_span_to_char_span};
pub use range::{CharIdx, CharLen, Revision, TextSpan};
pub use remap::{Spanned, map_offset, map_offsets_across_edit, map_span};
pub use ropey::{Rope, RopeSlice};
pub use theme::ThemeId;
