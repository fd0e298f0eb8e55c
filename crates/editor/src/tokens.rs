//! Syntax-color decorations kept in step with the buffer.
//!
//! Between an edit and the next tokenization the existing spans are
//! remapped across the edit, so colors stay attached to their text. A fresh
//! tokenization replaces them only if it was computed for the revision the
//! layer is at: remap first, then replace, never the other way round.

use std::time::{Duration, Instant};

use snapline_oracle::ColoredSpan;
use snapline_primitives::{CharLen, Revision, TextEdit, map_offsets_across_edit};
use tracing::trace;

/// Colored spans of the current buffer revision.
#[derive(Debug, Clone, Default)]
pub struct TokenLayer {
	revision: Revision,
	spans: Vec<ColoredSpan>,
}

impl TokenLayer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn spans(&self) -> &[ColoredSpan] {
		&self.spans
	}

	pub fn revision(&self) -> Revision {
		self.revision
	}

	/// Remaps every span across `edit`, moving the layer to `revision`.
	pub fn apply_edit(&mut self, edit: &TextEdit, new_doc_len: CharLen, revision: Revision) {
		self.spans = map_offsets_across_edit(&self.spans, edit, new_doc_len);
		self.revision = revision;
	}

	/// Installs `spans` computed for `computed_for`.
	///
	/// Returns false, leaving the layer untouched, if the layer has moved on.
	pub fn replace(&mut self, spans: Vec<ColoredSpan>, computed_for: Revision) -> bool {
		if computed_for != self.revision {
			trace!(%computed_for, current = %self.revision, "tokens.discard_outdated");
			return false;
		}
		self.spans = spans;
		true
	}
}

/// Debounce of re-tokenization, independent of the analysis debounce.
#[derive(Debug, Clone)]
pub struct TokenRefresh {
	debounce: Duration,
	due_at: Option<Instant>,
}

impl TokenRefresh {
	pub fn new(debounce: Duration) -> Self {
		Self { debounce, due_at: None }
	}

	pub fn note_edit(&mut self, now: Instant) {
		self.due_at = Some(now + self.debounce);
	}

	/// Requests a refresh on the next check, e.g. after a theme switch.
	pub fn request_now(&mut self, now: Instant) {
		self.due_at = Some(now);
	}

	/// Returns true, and disarms, if a refresh is due at `now`.
	pub fn take_due(&mut self, now: Instant) -> bool {
		match self.due_at {
			Some(due) if now >= due => {
				self.due_at = None;
				true
			}
			_ => false,
		}
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		self.due_at
	}
}
