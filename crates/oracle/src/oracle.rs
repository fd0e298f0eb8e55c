//! Seams to the external oracles.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snapline_primitives::{LanguageId, ThemeId};

use crate::tokens::TokenLines;
use crate::wire::RawResults;

/// A failure thrown by the analysis oracle.
///
/// The oracle may throw even when it produced useful data: `payload` holds
/// whatever structured object accompanied the failure (for example a
/// `twoslashResults` field with the nodes resolved before the failing query).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{description}")]
pub struct OracleFailure {
	pub description: String,
	pub payload: serde_json::Value,
}

impl OracleFailure {
	pub fn new(description: impl Into<String>) -> Self {
		Self {
			description: description.into(),
			payload: serde_json::Value::Null,
		}
	}

	#[must_use]
	pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
		self.payload = payload;
		self
	}
}

/// The type-analysis oracle.
///
/// Stateful and slow to cold-start: [`AnnotationOracle::initialize`] loads the
/// full type-checking environment and is called at most once per session.
#[async_trait]
pub trait AnnotationOracle: Send + Sync {
	/// Prepares the analysis environment.
	async fn initialize(&self) -> Result<(), OracleFailure>;

	/// Analyzes `code` as a file with the given `extension` (`ts`, `tsx`, `js`, `jsx`).
	async fn analyze(&self, code: &str, extension: &str) -> Result<RawResults, OracleFailure>;
}

/// Failure of a tokenizer call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeFailure {
	#[error("unsupported language `{0}`")]
	UnsupportedLanguage(LanguageId),
	#[error("{0}")]
	Other(String),
}

/// Color data of a bundled theme, as the tokenizer exposes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawThemeColors {
	pub bg: Option<String>,
	pub fg: Option<String>,
	/// Workbench color keys such as `editor.selectionBackground`.
	pub colors: HashMap<String, String>,
}

/// The syntax tokenizer. Cheap compared to analysis, and synchronous.
pub trait TokenizerOracle: Send + Sync {
	fn tokenize(&self, code: &str, language: &LanguageId, theme: &ThemeId) -> Result<TokenLines, TokenizeFailure>;

	/// Returns the color data of `theme`, if the tokenizer knows it.
	fn theme_colors(&self, theme: &ThemeId) -> Option<RawThemeColors>;
}
