//! Single-range text edits as reported by the editing surface.

use crate::range::{CharIdx, CharLen};

/// One replacement of `[start, old_end)` in the pre-edit text by `new_len` chars.
///
/// Pure insertions have `start == old_end`; pure deletions have `new_len == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextEdit {
	/// Start of the replaced range (pre-edit coordinates).
	pub start: CharIdx,
	/// Exclusive end of the replaced range (pre-edit coordinates).
	pub old_end: CharIdx,
	/// Number of chars inserted at `start`.
	pub new_len: CharLen,
}

impl TextEdit {
	/// Creates an edit, swapping inverted bounds.
	pub fn new(start: CharIdx, old_end: CharIdx, new_len: CharLen) -> Self {
		Self {
			start: start.min(old_end),
			old_end: start.max(old_end),
			new_len,
		}
	}

	pub fn insert(at: CharIdx, new_len: CharLen) -> Self {
		Self::new(at, at, new_len)
	}

	pub fn delete(start: CharIdx, old_end: CharIdx) -> Self {
		Self::new(start, old_end, 0)
	}

	/// Number of chars removed.
	#[inline]
	pub const fn deleted_len(&self) -> CharLen {
		self.old_end - self.start
	}

	/// Exclusive end of the inserted text (post-edit coordinates).
	#[inline]
	pub const fn new_end(&self) -> CharIdx {
		self.start + self.new_len
	}

	/// Signed change in document length.
	#[inline]
	pub fn delta(&self) -> isize {
		self.new_len as isize - self.deleted_len() as isize
	}

	/// Applies the length change to a post-edit-safe offset after the edit.
	///
	/// Saturates at zero so a malformed edit can never underflow.
	#[inline]
	pub fn shift(&self, offset: CharIdx) -> CharIdx {
		offset.saturating_add_signed(self.delta())
	}
}
