//! Per-editor oracle session with one-shot lazy initialization.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::client::AnnotationOracleClient;
use crate::oracle::{AnnotationOracle, TokenizerOracle};
use crate::tokens::TokenStore;
use crate::{OracleError, Result};

/// Owns the oracle instances of one editor.
///
/// Constructed by the top-level editor and passed by reference to every
/// component needing an oracle. The analysis environment is initialized
/// lazily by the first caller of [`OracleSession::ensure_ready`]; concurrent
/// callers await that same initialization. A failed initialization is
/// remembered and not retried within the session.
pub struct OracleSession {
	annotator: Arc<dyn AnnotationOracle>,
	tokenizer: Arc<dyn TokenizerOracle>,
	ready: OnceCell<Result<()>>,
}

impl std::fmt::Debug for OracleSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OracleSession").field("ready", &self.ready.get()).finish_non_exhaustive()
	}
}

impl OracleSession {
	pub fn new(annotator: Arc<dyn AnnotationOracle>, tokenizer: Arc<dyn TokenizerOracle>) -> Self {
		Self {
			annotator,
			tokenizer,
			ready: OnceCell::new(),
		}
	}

	/// Initializes the analysis environment once, or returns the cached outcome.
	pub async fn ensure_ready(&self) -> Result<()> {
		self.ready
			.get_or_init(|| async {
				debug!("initializing annotation oracle");
				match self.annotator.initialize().await {
					Ok(()) => Ok(()),
					Err(failure) => {
						warn!(error = %failure, "annotation oracle initialization failed; annotations unavailable");
						Err(OracleError::Initialization(failure.description.into()))
					}
				}
			})
			.await
			.clone()
	}

	/// Returns the initialization outcome without triggering it.
	pub fn readiness(&self) -> Option<Result<()>> {
		self.ready.get().cloned()
	}

	/// Returns an analysis client sharing this session.
	pub fn annotation_client(self: &Arc<Self>) -> AnnotationOracleClient {
		AnnotationOracleClient::new(Arc::clone(self))
	}

	/// Returns a fresh token cache over this session's tokenizer.
	pub fn token_store(&self) -> TokenStore {
		TokenStore::new(Arc::clone(&self.tokenizer))
	}

	pub fn annotator(&self) -> &Arc<dyn AnnotationOracle> {
		&self.annotator
	}

	pub fn tokenizer(&self) -> &Arc<dyn TokenizerOracle> {
		&self.tokenizer
	}
}
