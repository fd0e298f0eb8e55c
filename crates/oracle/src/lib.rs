#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Clients for the two external oracles behind the editor:
//!
//! - a tokenizer, producing per-line colored tokens for a `(text, language, theme)`,
//! - a type-analysis oracle, producing hover/query/error/completion nodes.
//!
//! Both are treated as black boxes behind object-safe traits
//! ([`TokenizerOracle`], [`AnnotationOracle`]). The [`OracleSession`] owns them
//! for one editor instance and performs the expensive analysis-environment
//! initialization at most once.
//!
//! No failure from either oracle escapes this crate as an error the UI has to
//! handle: tokenization falls back to plain text, and analysis resolves to an
//! [`AnalysisOutcome`] describing how much was recovered.

use std::sync::Arc;

use snapline_primitives::LanguageId;

pub mod client;
pub mod node;
pub mod oracle;
pub mod session;
pub mod tokens;
pub mod wire;

pub use client::{AnalysisOutcome, AnnotationOracleClient};
pub use node::{AnnotationKind, AnnotationNode, ErrorCode};
pub use oracle::{AnnotationOracle, OracleFailure, RawThemeColors, TokenizeFailure, TokenizerOracle};
pub use session::OracleSession;
pub use tokens::{ColoredSpan, Token, TokenLines, TokenStore, token_spans};
pub use wire::{RawCompletionEntry, RawNode, RawResults};

/// A convenient type alias for `Result` with `E` = [`OracleError`].
pub type Result<T, E = OracleError> = std::result::Result<T, E>;

/// Failures surfaced by the oracle clients.
///
/// Cheap to clone so a cached initialization failure can be handed to every
/// later caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OracleError {
	/// The oracle does not handle this language.
	#[error("language `{0}` is not supported")]
	UnsupportedLanguage(LanguageId),
	/// The analysis environment failed to cold-start.
	#[error("annotation oracle failed to initialize: {0}")]
	Initialization(Arc<str>),
	/// The oracle failed and nothing could be recovered from the failure.
	#[error("analysis failed: {0}")]
	Analysis(Arc<str>),
	/// The tokenizer failed for a reason other than an unsupported language.
	#[error("tokenizer failed: {0}")]
	Tokenize(Arc<str>),
	/// A failure payload carried results that could not be decoded.
	#[error("malformed oracle payload: {0}")]
	Payload(Arc<str>),
}
