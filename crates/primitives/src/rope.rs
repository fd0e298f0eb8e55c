//! Rope utilities and extensions.

use ropey::{Rope, RopeSlice};

use crate::range::{CharIdx, CharLen};

/// Returns the number of chars in `line`, excluding its line terminator.
///
/// Returns `None` when the line index is past the end of the text.
pub fn line_len_without_break(text: RopeSlice, line: usize) -> Option<CharLen> {
	if line >= text.len_lines() {
		return None;
	}
	let slice = text.line(line);
	let mut len = slice.len_chars();
	if len > 0 && slice.char(len - 1) == '\n' {
		len -= 1;
		if len > 0 && slice.char(len - 1) == '\r' {
			len -= 1;
		}
	} else if len > 0 && is_break_char(slice.char(len - 1)) {
		len -= 1;
	}
	Some(len)
}

fn is_break_char(ch: char) -> bool {
	matches!(ch, '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

/// Returns the char offset one past the last visible char of `line`.
pub fn line_end_char(text: RopeSlice, line: usize) -> Option<CharIdx> {
	let len = line_len_without_break(text, line)?;
	Some(text.line_to_char(line) + len)
}

/// Hashes rope contents chunk by chunk without materializing a `String`.
pub fn hash_rope<H: std::hash::Hasher>(text: &Rope, state: &mut H) {
	for chunk in text.chunks() {
		state.write(chunk.as_bytes());
	}
	state.write_usize(text.len_bytes());
}
