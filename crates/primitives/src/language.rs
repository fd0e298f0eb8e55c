//! Language identifiers and the type-analysis support set.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a source language (`"typescript"`, `"rust"`, `"css"` ...).
///
/// Cheap to clone; compared case-sensitively after normalization to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LanguageId(Arc<str>);

impl LanguageId {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref().trim().to_ascii_lowercase()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The plain-text pseudo language, always tokenizable.
	pub fn plain_text() -> Self {
		Self::new("text")
	}

	/// Returns the file extension the type-analysis oracle expects, if the
	/// language is one it can analyze.
	pub fn analysis_extension(&self) -> Option<&'static str> {
		match self.as_str() {
			"typescript" | "ts" => Some("ts"),
			"javascript" | "js" => Some("js"),
			"tsx" => Some("tsx"),
			"jsx" => Some("jsx"),
			_ => None,
		}
	}

	/// Returns true if type annotations can be computed for this language.
	pub fn supports_analysis(&self) -> bool {
		self.analysis_extension().is_some()
	}
}

impl From<String> for LanguageId {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for LanguageId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<LanguageId> for String {
	fn from(value: LanguageId) -> Self {
		value.0.as_ref().to_owned()
	}
}

impl std::fmt::Display for LanguageId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}
