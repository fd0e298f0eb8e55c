//! Wire model of the analysis oracle's output.
//!
//! The oracle reports a flat list of tagged nodes:
//!
//! ```json
//! { "nodes": [
//!     { "type": "query", "start": 14, "length": 1, "line": 1, "character": 0,
//!       "text": "const x: number" },
//!     { "type": "error", "start": 0, "length": 5, "line": 0, "character": 0,
//!       "text": "Cannot find name 'foo'.", "code": 2304 }
//! ] }
//! ```
//!
//! `start` and `length` count UTF-16 code units of the analyzed text.
//! Conversion into [`AnnotationNode`]s translates them into char offsets.

use serde::{Deserialize, Serialize};
use snapline_primitives::{OracleCoord, Rope, utf16_span_to_char_span};
use tracing::trace;

use crate::node::{AnnotationKind, AnnotationNode, ErrorCode};

/// Results of one oracle run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawResults {
	pub nodes: Vec<RawNode>,
	/// The code the oracle actually analyzed, when it reports it.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
}

/// One completion candidate of a completion node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCompletionEntry {
	pub name: String,
}

/// A node as emitted by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
	/// Node tag: `hover`, `query`, `error`, `completion`, or kinds this
	/// client ignores (`highlight`, `tag`).
	#[serde(rename = "type")]
	pub kind: String,
	pub start: usize,
	#[serde(default)]
	pub length: usize,
	#[serde(default)]
	pub line: u32,
	#[serde(default)]
	pub character: u32,
	#[serde(default)]
	pub text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub docs: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<ErrorCode>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub completions: Vec<RawCompletionEntry>,
}

impl RawNode {
	fn base(kind: &str, start: usize, length: usize, line: u32, character: u32, text: impl Into<String>) -> Self {
		Self {
			kind: kind.to_owned(),
			start,
			length,
			line,
			character,
			text: text.into(),
			docs: None,
			code: None,
			completions: Vec::new(),
		}
	}

	pub fn hover(start: usize, length: usize, line: u32, character: u32, text: impl Into<String>) -> Self {
		Self::base("hover", start, length, line, character, text)
	}

	pub fn query(start: usize, length: usize, line: u32, character: u32, text: impl Into<String>) -> Self {
		Self::base("query", start, length, line, character, text)
	}

	pub fn error(start: usize, length: usize, line: u32, character: u32, text: impl Into<String>, code: u32) -> Self {
		Self {
			code: Some(ErrorCode::Numeric(code)),
			..Self::base("error", start, length, line, character, text)
		}
	}

	pub fn completion(start: usize, line: u32, character: u32, names: &[&str]) -> Self {
		Self {
			completions: names.iter().map(|name| RawCompletionEntry { name: (*name).to_owned() }).collect(),
			..Self::base("completion", start, 0, line, character, "")
		}
	}

	#[must_use]
	pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
		self.docs = Some(docs.into());
		self
	}

	/// Converts into a buffer-coordinate node against the analyzed `text`.
	///
	/// Returns `None` for ignored node kinds and nodes starting past the end
	/// of the text.
	pub fn into_node(self, text: &Rope) -> Option<AnnotationNode> {
		let Some(kind) = AnnotationKind::from_tag(&self.kind) else {
			trace!(kind = %self.kind, "skipping unsupported node kind");
			return None;
		};
		let span = utf16_span_to_char_span(text, self.start, self.length)?;

		let payload = if kind == AnnotationKind::Completion && self.text.is_empty() {
			self.completions.iter().map(|entry| entry.name.as_str()).collect::<Vec<_>>().join("\n")
		} else {
			self.text
		};

		let mut node = AnnotationNode::new(kind, span, OracleCoord::new(self.line, self.character), payload);
		node.docs = self.docs.filter(|docs| !docs.is_empty()).map(Into::into);
		if kind == AnnotationKind::Error {
			node.error_code = self.code;
		}
		Some(node)
	}
}

impl RawResults {
	pub fn new(nodes: Vec<RawNode>) -> Self {
		Self { nodes, code: None }
	}

	/// Converts every supported node, preserving emission order.
	///
	/// Offsets are resolved against the code the oracle reports having
	/// analyzed, falling back to `text`.
	pub fn into_nodes(self, text: &Rope) -> Vec<AnnotationNode> {
		let reported = self.code.as_deref().filter(|code| !code.is_empty()).map(Rope::from);
		let analyzed = reported.as_ref().unwrap_or(text);
		self.nodes.into_iter().filter_map(|node| node.into_node(analyzed)).collect()
	}
}
