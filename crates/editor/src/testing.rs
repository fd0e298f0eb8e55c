//! Controllable oracle doubles for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use snapline_oracle::{
	AnnotationOracle, OracleFailure, OracleSession, RawResults, RawThemeColors, Token, TokenLines, TokenizeFailure,
	TokenizerOracle,
};
use snapline_primitives::{LanguageId, ThemeId};
use tokio::sync::{Notify, oneshot};

type Responder = Box<dyn Fn(&str) -> Result<RawResults, OracleFailure> + Send + Sync>;

/// Analysis oracle whose calls either answer immediately or wait for the
/// test to release them, in any order.
pub(crate) struct FakeOracle {
	calls: Mutex<Vec<String>>,
	gates: Mutex<Vec<Option<oneshot::Sender<Result<RawResults, OracleFailure>>>>>,
	responder: Option<Responder>,
	/// Holds `initialize` until notified.
	cold_start: Option<Arc<Notify>>,
	inits: AtomicUsize,
}

impl FakeOracle {
	pub(crate) fn gated() -> Arc<Self> {
		Arc::new(Self {
			calls: Mutex::new(Vec::new()),
			gates: Mutex::new(Vec::new()),
			responder: None,
			cold_start: None,
			inits: AtomicUsize::new(0),
		})
	}

	/// Gated calls behind an initialization that waits on `cold_start`.
	pub(crate) fn cold_start(cold_start: Arc<Notify>) -> Arc<Self> {
		Arc::new(Self {
			calls: Mutex::new(Vec::new()),
			gates: Mutex::new(Vec::new()),
			responder: None,
			cold_start: Some(cold_start),
			inits: AtomicUsize::new(0),
		})
	}

	pub(crate) fn responding(responder: impl Fn(&str) -> Result<RawResults, OracleFailure> + Send + Sync + 'static) -> Arc<Self> {
		Arc::new(Self {
			calls: Mutex::new(Vec::new()),
			gates: Mutex::new(Vec::new()),
			responder: Some(Box::new(responder)),
			cold_start: None,
			inits: AtomicUsize::new(0),
		})
	}

	/// Code of every call received so far.
	pub(crate) fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	/// Number of times `initialize` was entered.
	pub(crate) fn inits(&self) -> usize {
		self.inits.load(Ordering::SeqCst)
	}

	/// Resolves gated call number `call`. Returns false if that call is not
	/// waiting anymore.
	pub(crate) fn release(&self, call: usize, response: Result<RawResults, OracleFailure>) -> bool {
		let gate = self.gates.lock().get_mut(call).and_then(Option::take);
		gate.is_some_and(|tx| tx.send(response).is_ok())
	}
}

#[async_trait]
impl AnnotationOracle for FakeOracle {
	async fn initialize(&self) -> Result<(), OracleFailure> {
		self.inits.fetch_add(1, Ordering::SeqCst);
		if let Some(cold_start) = &self.cold_start {
			cold_start.notified().await;
		}
		Ok(())
	}

	async fn analyze(&self, code: &str, _extension: &str) -> Result<RawResults, OracleFailure> {
		self.calls.lock().push(code.to_owned());
		if let Some(responder) = &self.responder {
			return responder(code);
		}
		let rx = {
			let (tx, rx) = oneshot::channel();
			self.gates.lock().push(Some(tx));
			rx
		};
		rx.await.unwrap_or_else(|_| Err(OracleFailure::new("gate dropped")))
	}
}

/// Tokenizer coloring a leading `const` keyword; knows only typescript.
pub(crate) struct KeywordTokenizer;

impl TokenizerOracle for KeywordTokenizer {
	fn tokenize(&self, code: &str, language: &LanguageId, _theme: &ThemeId) -> Result<TokenLines, TokenizeFailure> {
		if language.as_str() != "typescript" {
			return Err(TokenizeFailure::UnsupportedLanguage(language.clone()));
		}
		Ok(code
			.split('\n')
			.map(|line| match line.strip_prefix("const") {
				Some(rest) => vec![Token::new("const", Some("#d73a49")), Token::plain(rest)],
				None => vec![Token::plain(line)],
			})
			.collect())
	}

	fn theme_colors(&self, theme: &ThemeId) -> Option<RawThemeColors> {
		match theme.as_str() {
			"github-dark" => {
				let mut colors = RawThemeColors {
					bg: Some("#0d1117".into()),
					fg: Some("#e6edf3".into()),
					..RawThemeColors::default()
				};
				colors.colors.insert("editor.selectionBackground".into(), "#264f78".into());
				colors.colors.insert("editor.lineHighlightBackground".into(), "#161b22".into());
				Some(colors)
			}
			"github-light" => Some(RawThemeColors {
				bg: Some("#fff".into()),
				fg: Some("#24292e".into()),
				..RawThemeColors::default()
			}),
			_ => None,
		}
	}
}

pub(crate) fn session(oracle: Arc<FakeOracle>) -> Arc<OracleSession> {
	Arc::new(OracleSession::new(oracle, Arc::new(KeywordTokenizer)))
}

/// Lets spawned tasks on the current-thread runtime run to their next
/// suspension point.
pub(crate) async fn settle() {
	for _ in 0..32 {
		tokio::task::yield_now().await;
	}
}
