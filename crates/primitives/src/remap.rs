//! Best-effort remapping of stored offsets across incremental edits.
//!
//! Between an edit and the next completed analysis, annotation spans still
//! refer to the text the oracle saw. Remapping keeps them attached to the
//! surrounding text so stale overlays stay in range:
//!
//! - spans entirely before the edit are unchanged,
//! - spans entirely after the edit shift by `new_len - deleted_len`,
//! - spans overlapping the edit are clamped to the edit boundary, and
//!   dropped when nothing of them survives.
//!
//! This is not exact. Exactness requires re-analysis.

use crate::edit::TextEdit;
use crate::range::{CharIdx, CharLen, TextSpan};

/// Something carrying a span in buffer coordinates.
pub trait Spanned: Sized {
	fn span(&self) -> TextSpan;

	/// Returns a copy of `self` positioned at `span`.
	fn with_span(&self, span: TextSpan) -> Self;
}

impl Spanned for TextSpan {
	fn span(&self) -> TextSpan {
		*self
	}

	fn with_span(&self, span: TextSpan) -> Self {
		span
	}
}

/// Maps a single span across `edit`.
///
/// Returns `None` when the span was entirely consumed by the edit.
pub fn map_span(span: TextSpan, edit: &TextEdit) -> Option<TextSpan> {
	if span.end() <= edit.start {
		return Some(span);
	}
	if span.start >= edit.old_end {
		return Some(TextSpan::new(edit.shift(span.start), span.len));
	}

	let start = if span.start < edit.start { span.start } else { edit.new_end() };
	let end = if span.end() > edit.old_end { edit.shift(span.end()) } else { edit.start };
	if end <= start {
		return None;
	}
	Some(TextSpan::from_bounds(start, end))
}

/// Maps a point anchor across `edit`.
///
/// Anchors at the edit start stay before inserted text. Anchors strictly
/// inside a deleted range are dropped.
pub fn map_offset(offset: CharIdx, edit: &TextEdit) -> Option<CharIdx> {
	if offset <= edit.start {
		Some(offset)
	} else if offset >= edit.old_end {
		Some(edit.shift(offset))
	} else {
		None
	}
}

/// Maps every item across `edit`, dropping consumed items and clamping the
/// rest to a document of `new_doc_len` chars.
///
/// Item order is preserved.
pub fn map_offsets_across_edit<T: Spanned>(items: &[T], edit: &TextEdit, new_doc_len: CharLen) -> Vec<T> {
	items
		.iter()
		.filter_map(|item| {
			let span = map_span(item.span(), edit)?.clamp_to(new_doc_len);
			(!span.is_empty() || item.span().is_empty()).then(|| item.with_span(span))
		})
		.collect()
}
