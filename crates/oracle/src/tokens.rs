//! Token cache in front of the tokenizer oracle.
//!
//! Tokenizing is cheap compared to analysis but still repeated on every
//! re-render. [`TokenStore`] remembers the most recent `(text, language,
//! theme)` request by content hash and hands back the same `Arc` while it
//! matches, so re-renders unrelated to text changes (cursor blink, focus)
//! do not re-tokenize.

use std::hash::Hasher;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use snapline_primitives::rope::hash_rope;
use snapline_primitives::{CharIdx, LanguageId, Rope, Spanned, TextSpan, ThemeId};
use tracing::{debug, trace};

use crate::oracle::{TokenizeFailure, TokenizerOracle};

/// One colored run of text on a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	pub content: String,
	/// CSS color, or `None` for the theme's default foreground.
	pub color: Option<String>,
}

impl Token {
	pub fn new(content: impl Into<String>, color: Option<&str>) -> Self {
		Self {
			content: content.into(),
			color: color.map(str::to_owned),
		}
	}

	pub fn plain(content: impl Into<String>) -> Self {
		Self::new(content, None)
	}
}

/// Tokens of each line, in line order, line terminators excluded.
pub type TokenLines = Vec<Vec<Token>>;

/// A colored char range ready for decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredSpan {
	pub span: TextSpan,
	pub color: Arc<str>,
}

impl Spanned for ColoredSpan {
	fn span(&self) -> TextSpan {
		self.span
	}

	fn with_span(&self, span: TextSpan) -> Self {
		Self {
			span,
			color: self.color.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
	content_hash: u64,
	len_chars: usize,
	language: LanguageId,
	theme: ThemeId,
}

struct CacheEntry {
	key: CacheKey,
	lines: Arc<TokenLines>,
}

/// Tokenizes through the oracle, caching the most recent result.
pub struct TokenStore {
	tokenizer: Arc<dyn TokenizerOracle>,
	last: Mutex<Option<CacheEntry>>,
}

impl std::fmt::Debug for TokenStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenStore")
			.field("cached", &self.last.lock().as_ref().map(|entry| entry.key.clone()))
			.finish()
	}
}

impl TokenStore {
	pub fn new(tokenizer: Arc<dyn TokenizerOracle>) -> Self {
		Self {
			tokenizer,
			last: Mutex::new(None),
		}
	}

	/// Returns the token lines of `text`.
	///
	/// Never fails: an unsupported language or tokenizer failure yields one
	/// uncolored token per line.
	pub fn tokenize(&self, text: &Rope, language: &LanguageId, theme: &ThemeId) -> Arc<TokenLines> {
		let key = cache_key(text, language, theme);
		if let Some(entry) = self.last.lock().as_ref() {
			if entry.key == key {
				trace!(%language, %theme, "token cache hit");
				return entry.lines.clone();
			}
		}

		let code = text.to_string();
		let lines = match self.tokenizer.tokenize(&code, language, theme) {
			Ok(lines) => lines,
			Err(TokenizeFailure::UnsupportedLanguage(_)) => {
				debug!(%language, "tokenizer does not know language; using plain text");
				plain_lines(text)
			}
			Err(TokenizeFailure::Other(reason)) => {
				debug!(%language, %reason, "tokenizer failed; using plain text");
				plain_lines(text)
			}
		};

		let lines = Arc::new(lines);
		*self.last.lock() = Some(CacheEntry {
			key,
			lines: lines.clone(),
		});
		lines
	}

	/// Drops the cached entry.
	pub fn clear(&self) {
		*self.last.lock() = None;
	}
}

fn cache_key(text: &Rope, language: &LanguageId, theme: &ThemeId) -> CacheKey {
	let mut hasher = FxHasher::default();
	hash_rope(text, &mut hasher);
	CacheKey {
		content_hash: hasher.finish(),
		len_chars: text.len_chars(),
		language: language.clone(),
		theme: theme.clone(),
	}
}

/// One uncolored token per line.
pub fn plain_lines(text: &Rope) -> TokenLines {
	text.lines()
		.map(|line| {
			let content: String = line.chars().filter(|ch| *ch != '\n' && *ch != '\r').collect();
			vec![Token::plain(content)]
		})
		.collect()
}

/// Converts token lines into colored char spans over `text`.
///
/// Uncolored tokens produce no span. Positions advance across line
/// terminators between lines.
pub fn token_spans(lines: &TokenLines, text: &Rope) -> Vec<ColoredSpan> {
	let len = text.len_chars();
	let mut spans = Vec::new();
	let mut pos: CharIdx = 0;

	for tokens in lines {
		for token in tokens {
			let from = pos;
			let to = (pos + token.content.chars().count()).min(len);
			if let Some(color) = &token.color {
				if to > from {
					spans.push(ColoredSpan {
						span: TextSpan::from_bounds(from, to),
						color: Arc::from(color.as_str()),
					});
				}
			}
			pos = to;
		}

		if pos < len && text.char(pos) == '\r' {
			pos += 1;
		}
		if pos < len && text.char(pos) == '\n' {
			pos += 1;
		}
	}

	spans
}
