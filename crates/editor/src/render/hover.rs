use std::time::{Duration, Instant};

use snapline_oracle::AnnotationNode;
use snapline_primitives::{CharIdx, TextSpan};

use crate::index::AnnotationIndex;

#[derive(Debug, Clone, Copy)]
struct Resting {
	offset: CharIdx,
	/// Span of the node under the pointer when it came to rest.
	span: Option<TextSpan>,
	since: Instant,
}

/// Tracks where the pointer rests and for how long.
///
/// A hover shows only after the pointer stayed over the same span for the
/// configured delay. Moving within that span keeps the timer; moving off it
/// restarts it. A buffer change hides the hover until the pointer moves.
#[derive(Debug, Clone)]
pub struct HoverTracker {
	delay: Duration,
	resting: Option<Resting>,
}

impl HoverTracker {
	pub fn new(delay: Duration) -> Self {
		Self { delay, resting: None }
	}

	pub fn pointer_at(&mut self, offset: CharIdx, index: &AnnotationIndex, now: Instant) {
		if let Some(resting) = &mut self.resting {
			if resting.offset == offset || resting.span.is_some_and(|span| span.contains(offset)) {
				resting.offset = offset;
				return;
			}
		}
		self.resting = Some(Resting {
			offset,
			span: index.lookup_at_offset(offset).map(|node| node.span),
			since: now,
		});
	}

	pub fn pointer_left(&mut self) {
		self.resting = None;
	}

	pub fn on_buffer_change(&mut self) {
		self.resting = None;
	}

	/// The node whose hover is showing at `now`, if any.
	pub fn visible<'a>(&self, index: &'a AnnotationIndex, now: Instant) -> Option<&'a AnnotationNode> {
		let resting = self.resting?;
		if now.saturating_duration_since(resting.since) < self.delay {
			return None;
		}
		index.lookup_at_offset(resting.offset)
	}

	/// When a pending hover would appear.
	pub fn next_change(&self, now: Instant) -> Option<Instant> {
		let show_at = self.resting?.since + self.delay;
		(show_at > now).then_some(show_at)
	}
}
