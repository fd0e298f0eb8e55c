//! Conversions between oracle line/UTF-16 coordinates and buffer char offsets.
//!
//! The oracle reports positions as `(line, character)` with `character`
//! counted in UTF-16 code units, and raw offsets as UTF-16 code-unit indices
//! into the analyzed text. The buffer addresses text by char index.
//!
//! All conversions are total over valid input and return `None` for
//! positions outside the document. Columns past the end of a line clamp to
//! the line end.

use ropey::Rope;

use crate::coord::{DisplayCoord, OracleCoord};
use crate::range::{CharIdx, TextSpan};
use crate::rope::line_end_char;

/// Converts an oracle coordinate into a char offset in `text`.
pub fn coord_to_char(text: &Rope, coord: OracleCoord) -> Option<CharIdx> {
	let line = coord.line as usize;
	let line_start = text.try_line_to_char(line).ok()?;
	let line_end = line_end_char(text.slice(..), line)?;

	let start_cu = text.char_to_utf16_cu(line_start);
	let end_cu = text.char_to_utf16_cu(line_end);
	let target_cu = (start_cu + coord.character as usize).min(end_cu);
	Some(text.utf16_cu_to_char(target_cu))
}

/// Converts a char offset into an oracle coordinate.
pub fn char_to_coord(text: &Rope, char_idx: CharIdx) -> Option<OracleCoord> {
	if char_idx > text.len_chars() {
		return None;
	}
	let line = text.char_to_line(char_idx);
	let line_start = text.line_to_char(line);
	let character = text.char_to_utf16_cu(char_idx) - text.char_to_utf16_cu(line_start);
	Some(OracleCoord::new(line as u32, character as u32))
}

/// Converts a char offset into a display line/column.
pub fn char_to_display(text: &Rope, char_idx: CharIdx) -> Option<DisplayCoord> {
	if char_idx > text.len_chars() {
		return None;
	}
	let line = text.char_to_line(char_idx);
	Some(DisplayCoord::new(line, char_idx - text.line_to_char(line)))
}

/// Converts a UTF-16 `(start, len)` pair from the oracle into a char span.
///
/// The end is clamped to the document; a start past the end yields `None`.
pub fn utf16_span_to_char_span(text: &Rope, start_cu: usize, len_cu: usize) -> Option<TextSpan> {
	let total_cu = text.len_utf16_cu();
	if start_cu > total_cu {
		return None;
	}
	let end_cu = start_cu.saturating_add(len_cu).min(total_cu);
	let start = text.utf16_cu_to_char(start_cu);
	let end = text.utf16_cu_to_char(end_cu);
	Some(TextSpan::from_bounds(start, end))
}
