//! Linear text coordinates: char offsets, spans and buffer revisions.

use serde::{Deserialize, Serialize};

/// A position in the text, measured in characters (not bytes).
///
/// This is the buffer's linear coordinate space.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
pub type CharLen = usize;

/// Monotonic mutation counter of a source buffer.
///
/// Bumped by the editing surface on every mutation. Analysis results are
/// tagged with the revision they were computed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub u64);

impl Revision {
	/// The revision of a freshly mounted, never edited buffer.
	pub const INITIAL: Self = Self(0);

	/// Returns the following revision.
	#[must_use]
	pub const fn next(self) -> Self {
		Self(self.0.wrapping_add(1))
	}
}

impl std::fmt::Display for Revision {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "r{}", self.0)
	}
}

/// A half-open span `[start, start + len)` in char offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
	/// First char covered by the span.
	pub start: CharIdx,
	/// Number of chars covered.
	pub len: CharLen,
}

impl TextSpan {
	pub const fn new(start: CharIdx, len: CharLen) -> Self {
		Self { start, len }
	}

	/// Builds a span from a `[start, end)` pair, treating inverted input as empty.
	pub fn from_bounds(start: CharIdx, end: CharIdx) -> Self {
		Self {
			start,
			len: end.saturating_sub(start),
		}
	}

	/// Exclusive end offset.
	#[inline]
	pub const fn end(&self) -> CharIdx {
		self.start + self.len
	}

	#[inline]
	pub const fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns true if `offset` lies inside the span.
	///
	/// Empty spans contain nothing.
	#[inline]
	pub const fn contains(&self, offset: CharIdx) -> bool {
		offset >= self.start && offset < self.end()
	}

	/// Returns the span clamped to a document of `len_chars` characters.
	pub fn clamp_to(&self, len_chars: CharLen) -> Self {
		let start = self.start.min(len_chars);
		let end = self.end().min(len_chars);
		Self::from_bounds(start, end)
	}
}
