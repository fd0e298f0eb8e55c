//! Overlay frames: everything drawn on top of the highlighted text.
//!
//! [`OverlayRenderer::frame`] is a pure function of the index contents, the
//! text, and the typing/pointer state at a given instant. Hosts rebuild a
//! frame whenever the pipeline reports a change or a deadline passes.

mod attenuation;
mod hover;

use std::sync::Arc;
use std::time::Instant;

use smallvec::SmallVec;
use snapline_oracle::{AnnotationKind, AnnotationNode};
use snapline_primitives::rope::line_end_char;
use snapline_primitives::{CharIdx, DisplayCoord, Rope, TextSpan, char_to_display};

pub use self::attenuation::TypingAttenuation;
pub use self::hover::HoverTracker;
use crate::config::PipelineConfig;
use crate::index::AnnotationIndex;
use crate::theme::{ERROR_ACCENT, TooltipStyle};

/// Text shown by a query overlay whose result is empty.
pub const NO_TYPE_INFO: &str = "(no type info)";

/// The part of an underline lying on one line, in char columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnderlineSegment {
	pub line: usize,
	pub start_col: usize,
	/// Exclusive.
	pub end_col: usize,
}

/// A wavy underline under an error span.
#[derive(Debug, Clone, PartialEq)]
pub struct Underline {
	pub span: TextSpan,
	pub color: &'static str,
	pub message: Arc<str>,
	pub segments: SmallVec<[UnderlineSegment; 1]>,
}

/// An always-visible inline result of a `^?` query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOverlay {
	pub anchor: CharIdx,
	pub position: DisplayCoord,
	/// Position among the queries placed on the same line, in oracle order.
	pub stack: usize,
	pub text: Arc<str>,
	pub docs: Option<Arc<str>>,
}

/// One block of tooltip content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipSection {
	/// Diagnostic code, such as `TS2322`.
	Code(Arc<str>),
	Message(Arc<str>),
	/// Type signature.
	Type(Arc<str>),
	/// Doc comment, shown under a separator.
	Docs(Arc<str>),
}

/// The hover tooltip for the span under a resting pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
	pub kind: AnnotationKind,
	pub span: TextSpan,
	pub sections: SmallVec<[TooltipSection; 2]>,
}

impl Tooltip {
	pub fn for_node(node: &AnnotationNode) -> Self {
		let mut sections = SmallVec::new();
		match node.kind {
			AnnotationKind::Error => {
				if let Some(code) = &node.error_code {
					sections.push(TooltipSection::Code(format!("TS{code}").into()));
				}
				sections.push(TooltipSection::Message(node.text.clone()));
			}
			_ => {
				sections.push(TooltipSection::Type(node.text.clone()));
				if let Some(docs) = &node.docs {
					sections.push(TooltipSection::Docs(docs.clone()));
				}
			}
		}
		Self {
			kind: node.kind,
			span: node.span,
			sections,
		}
	}
}

/// Everything to draw over the text at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
	pub underlines: Vec<Underline>,
	pub queries: Vec<QueryOverlay>,
	/// Opacity of every query overlay, in `[0, 1]`.
	pub query_opacity: f32,
	pub hover: Option<Tooltip>,
	/// Data trails the buffer and is shown best-effort.
	pub provisional: bool,
	pub tooltip_style: TooltipStyle,
}

impl OverlayFrame {
	pub fn queries_visible(&self) -> bool {
		self.query_opacity > 0.0 && !self.queries.is_empty()
	}
}

/// Builds overlay frames and owns the pointer and typing state they depend on.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
	attenuation: TypingAttenuation,
	hover: HoverTracker,
}

impl OverlayRenderer {
	pub fn new(config: &PipelineConfig) -> Self {
		Self {
			attenuation: TypingAttenuation::new(config.typing_quiet(), config.idle_opacity),
			hover: HoverTracker::new(config.hover_delay()),
		}
	}

	pub fn attenuation(&self) -> &TypingAttenuation {
		&self.attenuation
	}

	pub fn attenuation_mut(&mut self) -> &mut TypingAttenuation {
		&mut self.attenuation
	}

	pub fn hover(&self) -> &HoverTracker {
		&self.hover
	}

	pub fn hover_mut(&mut self) -> &mut HoverTracker {
		&mut self.hover
	}

	/// Builds the frame for `now`.
	pub fn frame(&self, index: &AnnotationIndex, text: &Rope, now: Instant) -> OverlayFrame {
		OverlayFrame {
			underlines: underlines(index, text),
			queries: query_overlays(index, text),
			query_opacity: self.attenuation.opacity(now),
			hover: self.hover.visible(index, now).map(Tooltip::for_node),
			provisional: index.is_stale(),
			tooltip_style: TooltipStyle::DEFAULT,
		}
	}

	/// Earliest instant at which a frame would differ without new input.
	pub fn next_change(&self, now: Instant) -> Option<Instant> {
		match (self.attenuation.next_change(now), self.hover.next_change(now)) {
			(Some(a), Some(b)) => Some(a.min(b)),
			(a, b) => a.or(b),
		}
	}
}

fn underlines(index: &AnnotationIndex, text: &Rope) -> Vec<Underline> {
	index
		.all_of_kind(AnnotationKind::Error)
		.iter()
		.filter_map(|node| {
			let segments = line_segments(text, node.span);
			(!segments.is_empty()).then(|| Underline {
				span: node.span,
				color: ERROR_ACCENT,
				message: node.text.clone(),
				segments,
			})
		})
		.collect()
}

/// Splits `span` into per-line column ranges. Line terminators are not
/// underlined; a span covering only a terminator yields nothing.
fn line_segments(text: &Rope, span: TextSpan) -> SmallVec<[UnderlineSegment; 1]> {
	let span = span.clamp_to(text.len_chars());
	let mut segments = SmallVec::new();
	if span.is_empty() {
		return segments;
	}

	let first = text.char_to_line(span.start);
	let last = text.char_to_line(span.end() - 1);
	for line in first..=last {
		let line_start = text.line_to_char(line);
		let Some(line_end) = line_end_char(text.slice(..), line) else {
			break;
		};
		let from = span.start.max(line_start);
		let to = span.end().min(line_end);
		if to > from {
			segments.push(UnderlineSegment {
				line,
				start_col: from - line_start,
				end_col: to - line_start,
			});
		}
	}
	segments
}

fn query_overlays(index: &AnnotationIndex, text: &Rope) -> Vec<QueryOverlay> {
	let mut overlays: Vec<QueryOverlay> = Vec::new();
	for query in index.query_anchors() {
		let Some(position) = char_to_display(text, query.anchor) else {
			continue;
		};
		let stack = overlays
			.iter()
			.filter(|overlay| overlay.position.line == position.line)
			.count();
		let text = if query.node.text.is_empty() {
			Arc::from(NO_TYPE_INFO)
		} else {
			query.node.text.clone()
		};
		overlays.push(QueryOverlay {
			anchor: query.anchor,
			position,
			stack,
			text,
			docs: query.node.docs.clone(),
		});
	}
	overlays
}
