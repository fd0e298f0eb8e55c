//! Queryable view of the latest analysis snapshot.
//!
//! The index holds at most one [`AnalysisSnapshot`]: the most recent pass
//! whose result was applied. Between an edit and the next applied pass the
//! snapshot is *stale*: its spans have been remapped across the edits so they
//! stay in range, but they are only as exact as [`map_span`] allows. Stale
//! data is still served; renderers can ask [`AnnotationIndex::is_stale`] to
//! present it as provisional.
//!
//! # Ordering
//!
//! Nodes of each kind are kept sorted by span start. The sort is stable, so
//! nodes sharing a start keep the order the oracle emitted them in. Several
//! `^?` queries may resolve to one position and must render in that order.

use snapline_oracle::{AnnotationKind, AnnotationNode};
use snapline_primitives::{
	CharIdx, CharLen, LanguageId, Revision, Rope, TextEdit, coord_to_char, map_offset, map_offsets_across_edit,
	map_span,
};
use tracing::trace;

/// The result of one completed analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSnapshot {
	/// Buffer revision the analyzed text had.
	pub revision: Revision,
	pub language: LanguageId,
	pub nodes: Vec<AnnotationNode>,
}

impl AnalysisSnapshot {
	pub fn new(revision: Revision, language: LanguageId, nodes: Vec<AnnotationNode>) -> Self {
		Self {
			revision,
			language,
			nodes,
		}
	}

	/// A snapshot with no nodes, used for empty text.
	pub fn empty(revision: Revision, language: LanguageId) -> Self {
		Self::new(revision, language, Vec::new())
	}
}

/// A query node and the buffer offset its overlay is anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryAnchor<'a> {
	pub node: &'a AnnotationNode,
	pub anchor: CharIdx,
}

#[derive(Debug, Clone, Default)]
struct Indexed {
	revision: Revision,
	language: Option<LanguageId>,
	hovers: Vec<AnnotationNode>,
	errors: Vec<AnnotationNode>,
	completions: Vec<AnnotationNode>,
	queries: Vec<AnnotationNode>,
	/// Overlay anchor of each entry in `queries`, same order.
	query_anchors: Vec<CharIdx>,
}

impl Indexed {
	fn build(snapshot: AnalysisSnapshot, text: &Rope) -> Self {
		let mut indexed = Self {
			revision: snapshot.revision,
			language: Some(snapshot.language),
			..Self::default()
		};

		let mut queries = Vec::new();
		for node in snapshot.nodes {
			match node.kind {
				AnnotationKind::Hover => indexed.hovers.push(node),
				AnnotationKind::Error => indexed.errors.push(node),
				AnnotationKind::Completion => indexed.completions.push(node),
				AnnotationKind::Query => {
					// The oracle's own line/column is authoritative for placement.
					let anchor = coord_to_char(text, node.coord).unwrap_or(node.span.start);
					queries.push((node, anchor));
				}
			}
		}

		sort_by_start(&mut indexed.hovers);
		sort_by_start(&mut indexed.errors);
		sort_by_start(&mut indexed.completions);
		if !queries.is_sorted_by_key(|(node, _)| node.span.start) {
			queries.sort_by_key(|(node, _)| node.span.start);
		}
		(indexed.queries, indexed.query_anchors) = queries.into_iter().unzip();
		indexed
	}

	fn of_kind(&self, kind: AnnotationKind) -> &[AnnotationNode] {
		match kind {
			AnnotationKind::Hover => &self.hovers,
			AnnotationKind::Query => &self.queries,
			AnnotationKind::Error => &self.errors,
			AnnotationKind::Completion => &self.completions,
		}
	}

	fn len(&self) -> usize {
		self.hovers.len() + self.errors.len() + self.completions.len() + self.queries.len()
	}

	fn apply_edit(&mut self, edit: &TextEdit, new_doc_len: CharLen) {
		for nodes in [&mut self.hovers, &mut self.errors, &mut self.completions] {
			*nodes = map_offsets_across_edit(nodes, edit, new_doc_len);
		}

		let mut queries = Vec::with_capacity(self.queries.len());
		let mut anchors = Vec::with_capacity(self.query_anchors.len());
		for (node, anchor) in self.queries.drain(..).zip(self.query_anchors.drain(..)) {
			let Some(span) = map_span(node.span, edit) else {
				continue;
			};
			let span = span.clamp_to(new_doc_len);
			if span.is_empty() && !node.span.is_empty() {
				continue;
			}
			let anchor = map_offset(anchor, edit).unwrap_or(edit.start).min(new_doc_len);
			queries.push(AnnotationNode { span, ..node });
			anchors.push(anchor);
		}
		self.queries = queries;
		self.query_anchors = anchors;
	}
}

fn sort_by_start(nodes: &mut [AnnotationNode]) {
	if !nodes.is_sorted_by_key(|node| node.span.start) {
		nodes.sort_by_key(|node| node.span.start);
	}
}

/// Index over the most recently applied [`AnalysisSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
	snapshot: Option<Indexed>,
	buffer_revision: Revision,
}

impl AnnotationIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces everything with `snapshot`.
	///
	/// `text` must be the text the snapshot was computed against; query
	/// anchors are resolved from oracle coordinates against it.
	pub fn update(&mut self, snapshot: AnalysisSnapshot, text: &Rope) {
		if snapshot.revision > self.buffer_revision {
			self.buffer_revision = snapshot.revision;
		}
		let indexed = Indexed::build(snapshot, text);
		trace!(revision = %indexed.revision, nodes = indexed.len(), "annotation index updated");
		self.snapshot = Some(indexed);
	}

	/// Records that the buffer moved to `buffer_revision`.
	///
	/// Data is kept; it becomes provisional until a fresher snapshot lands.
	pub fn invalidate(&mut self, buffer_revision: Revision) {
		if buffer_revision > self.buffer_revision {
			self.buffer_revision = buffer_revision;
		}
	}

	/// Drops the snapshot unconditionally.
	pub fn clear(&mut self) {
		if self.snapshot.take().is_some() {
			trace!("annotation index cleared");
		}
	}

	/// Remaps all spans and anchors across `edit`.
	pub fn apply_edit(&mut self, edit: &TextEdit, new_doc_len: CharLen) {
		if let Some(indexed) = &mut self.snapshot {
			indexed.apply_edit(edit, new_doc_len);
		}
	}

	/// Returns true while the snapshot trails the buffer.
	pub fn is_stale(&self) -> bool {
		self.snapshot.as_ref().is_some_and(|indexed| indexed.revision < self.buffer_revision)
	}

	pub fn is_empty(&self) -> bool {
		self.snapshot.as_ref().is_none_or(|indexed| indexed.len() == 0)
	}

	/// Revision of the snapshot, if any.
	pub fn revision(&self) -> Option<Revision> {
		self.snapshot.as_ref().map(|indexed| indexed.revision)
	}

	pub fn language(&self) -> Option<&LanguageId> {
		self.snapshot.as_ref().and_then(|indexed| indexed.language.as_ref())
	}

	/// Finds the node to show for a pointer at `offset`.
	///
	/// Errors take precedence over hovers. Queries and completions are never
	/// returned.
	pub fn lookup_at_offset(&self, offset: CharIdx) -> Option<&AnnotationNode> {
		let indexed = self.snapshot.as_ref()?;
		find_containing(&indexed.errors, offset).or_else(|| find_containing(&indexed.hovers, offset))
	}

	/// Nodes of `kind`, by ascending span start, oracle order among ties.
	pub fn all_of_kind(&self, kind: AnnotationKind) -> &[AnnotationNode] {
		self.snapshot.as_ref().map_or(&[], |indexed| indexed.of_kind(kind))
	}

	/// Completion nodes starting exactly at `offset`, in oracle order.
	pub fn completions_at(&self, offset: CharIdx) -> &[AnnotationNode] {
		let completions = self.all_of_kind(AnnotationKind::Completion);
		let from = completions.partition_point(|node| node.span.start < offset);
		let to = completions.partition_point(|node| node.span.start <= offset);
		&completions[from..to]
	}

	/// Query nodes with their overlay anchors, in [`Self::all_of_kind`] order.
	pub fn query_anchors(&self) -> impl Iterator<Item = QueryAnchor<'_>> {
		self.snapshot.iter().flat_map(|indexed| {
			indexed
				.queries
				.iter()
				.zip(indexed.query_anchors.iter().copied())
				.map(|(node, anchor)| QueryAnchor { node, anchor })
		})
	}
}

fn find_containing(nodes: &[AnnotationNode], offset: CharIdx) -> Option<&AnnotationNode> {
	// Sorted by start: nothing past the partition point can contain `offset`.
	let end = nodes.partition_point(|node| node.span.start <= offset);
	nodes[..end].iter().find(|node| node.span.contains(offset))
}
