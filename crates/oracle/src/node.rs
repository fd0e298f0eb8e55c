//! Annotation nodes in buffer coordinates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use snapline_primitives::{OracleCoord, Spanned, TextSpan};

/// Kind of fact an annotation node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
	/// Type information shown while hovering an identifier.
	Hover,
	/// Inline result of a `^?` query marker.
	Query,
	/// Diagnostic for the user's code.
	Error,
	/// Completion list at a `^|` marker.
	Completion,
}

impl AnnotationKind {
	pub const ALL: [Self; 4] = [Self::Hover, Self::Query, Self::Error, Self::Completion];

	/// Parses the oracle's node `type` tag. Unknown tags yield `None`.
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag {
			"hover" => Some(Self::Hover),
			"query" => Some(Self::Query),
			"error" => Some(Self::Error),
			"completion" => Some(Self::Completion),
			_ => None,
		}
	}
}

/// Diagnostic code attached to error nodes.
///
/// The checker reports numeric codes; synthesized recovery errors carry text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
	Numeric(u32),
	Text(String),
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Numeric(code) => write!(f, "{code}"),
			Self::Text(text) => f.write_str(text),
		}
	}
}

/// One fact produced by the analysis oracle about a span of source text.
///
/// Nodes are created in a batch by one oracle call and never mutated in
/// place; remapping across edits produces new nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationNode {
	pub kind: AnnotationKind,
	/// Span in buffer char offsets at the revision the node was computed against.
	pub span: TextSpan,
	/// Oracle-native position, authoritative for query placement.
	pub coord: OracleCoord,
	/// Primary payload: type signature, error message or completion text.
	pub text: Arc<str>,
	/// Secondary payload: doc comment, if any.
	pub docs: Option<Arc<str>>,
	/// Present only for [`AnnotationKind::Error`].
	pub error_code: Option<ErrorCode>,
}

impl AnnotationNode {
	pub fn new(kind: AnnotationKind, span: TextSpan, coord: OracleCoord, text: impl Into<Arc<str>>) -> Self {
		Self {
			kind,
			span,
			coord,
			text: text.into(),
			docs: None,
			error_code: None,
		}
	}

	#[must_use]
	pub fn with_docs(mut self, docs: impl Into<Arc<str>>) -> Self {
		self.docs = Some(docs.into());
		self
	}

	#[must_use]
	pub fn with_error_code(mut self, code: ErrorCode) -> Self {
		self.error_code = Some(code);
		self
	}
}

impl Spanned for AnnotationNode {
	fn span(&self) -> TextSpan {
		self.span
	}

	fn with_span(&self, span: TextSpan) -> Self {
		Self { span, ..self.clone() }
	}
}
