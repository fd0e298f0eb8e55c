use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a bundled color theme (`"github-light"`, `"nord"` ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ThemeId(Arc<str>);

impl ThemeId {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref().trim()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Default for ThemeId {
	fn default() -> Self {
		Self::new("github-light")
	}
}

impl From<String> for ThemeId {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for ThemeId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<ThemeId> for String {
	fn from(value: ThemeId) -> Self {
		value.0.as_ref().to_owned()
	}
}

impl std::fmt::Display for ThemeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}
