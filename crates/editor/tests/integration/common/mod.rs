//! Common utilities for pipeline integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use snapline_editor::{AnnotationPipeline, PipelineConfig, TickReport};
use snapline_oracle::{
	AnnotationOracle, OracleFailure, OracleSession, RawNode, RawResults, RawThemeColors, Token, TokenLines, TokenizeFailure,
	TokenizerOracle,
};
use snapline_primitives::{LanguageId, Revision, Rope, TextEdit, ThemeId};
use tokio::sync::oneshot;

pub const ANALYSIS_DEBOUNCE: Duration = Duration::from_millis(500);

pub fn ms(n: u64) -> Duration {
	Duration::from_millis(n)
}

/// Analysis oracle understanding just enough TypeScript for tests:
/// `const name = literal;` declarations and `//   ^?` query markers.
///
/// Calls can be held back with [`TypeOracle::hold`] and released in any
/// order with [`TypeOracle::release`].
#[derive(Default)]
pub struct TypeOracle {
	calls: Mutex<Vec<String>>,
	held: Mutex<Option<Vec<Option<oneshot::Sender<()>>>>>,
	inits: AtomicUsize,
}

impl TypeOracle {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Makes every later call wait until released.
	pub fn hold(&self) {
		*self.held.lock() = Some(Vec::new());
	}

	/// Lets held call number `call` produce its result.
	pub fn release(&self, call: usize) {
		let gate = self.held.lock().as_mut().and_then(|gates| gates.get_mut(call)).and_then(Option::take);
		if let Some(gate) = gate {
			let _ = gate.send(());
		}
	}

	/// Releases every held call and stops holding new ones.
	pub fn resume(&self) {
		let gates = self.held.lock().take().unwrap_or_default();
		for gate in gates.into_iter().flatten() {
			let _ = gate.send(());
		}
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	pub fn inits(&self) -> usize {
		self.inits.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl AnnotationOracle for TypeOracle {
	async fn initialize(&self) -> Result<(), OracleFailure> {
		self.inits.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn analyze(&self, code: &str, _extension: &str) -> Result<RawResults, OracleFailure> {
		self.calls.lock().push(code.to_owned());
		let gate = {
			let mut held = self.held.lock();
			held.as_mut().map(|gates| {
				let (tx, rx) = oneshot::channel();
				gates.push(Some(tx));
				rx
			})
		};
		if let Some(gate) = gate {
			let _ = gate.await;
		}
		Ok(RawResults::new(analyze_source(code)))
	}
}

/// Produces hover nodes for `const` declarations and query nodes for `^?`
/// markers pointing at a declared name on the previous line.
pub fn analyze_source(code: &str) -> Vec<RawNode> {
	let lines: Vec<&str> = code.split('\n').collect();
	let line_starts: Vec<usize> = lines
		.iter()
		.scan(0, |offset, line| {
			let start = *offset;
			*offset += line.encode_utf16().count() + 1;
			Some(start)
		})
		.collect();

	let mut declared: Vec<(String, &'static str)> = Vec::new();
	let mut nodes = Vec::new();
	for (line_no, line) in lines.iter().enumerate() {
		if let Some(rest) = line.trim_start().strip_prefix("const ") {
			let mut parts = rest.splitn(2, '=');
			let name = parts.next().unwrap_or("").trim().to_string();
			let value = parts.next().unwrap_or("").trim().trim_end_matches(';').trim();
			let ty = if value.starts_with('\'') || value.starts_with('"') {
				"string"
			} else if value.parse::<f64>().is_ok() {
				"number"
			} else {
				"any"
			};
			let column = line.find(&name).unwrap_or(0);
			nodes.push(RawNode::hover(
				line_starts[line_no] + column,
				name.len(),
				line_no as u32,
				column as u32,
				format!("const {name}: {ty}"),
			));
			declared.push((name, ty));
		}

		if let Some(column) = line.find("^?") {
			let Some(target) = line_no.checked_sub(1) else {
				continue;
			};
			// Markers past the end of the target line point at its last char.
			let chars: Vec<char> = lines[target].chars().collect();
			if chars.is_empty() {
				continue;
			}
			let column = column.min(chars.len() - 1);
			let is_ident = |ch: &char| ch.is_alphanumeric() || *ch == '_';
			let from = chars[..=column].iter().rposition(|ch| !is_ident(ch)).map_or(0, |i| i + 1);
			let ident: String = chars[from..].iter().take_while(|ch| is_ident(*ch)).collect();
			let text = declared
				.iter()
				.find(|(name, _)| *name == ident)
				.map(|(name, ty)| format!("const {name}: {ty}"))
				.unwrap_or_default();
			nodes.push(RawNode::query(
				line_starts[target] + from,
				ident.len().max(1),
				target as u32,
				from as u32,
				text,
			));
		}
	}
	nodes
}

/// Tokenizer coloring `const` keywords; knows only typescript.
pub struct KeywordTokenizer;

impl TokenizerOracle for KeywordTokenizer {
	fn tokenize(&self, code: &str, language: &LanguageId, theme: &ThemeId) -> Result<TokenLines, TokenizeFailure> {
		if language.as_str() != "typescript" {
			return Err(TokenizeFailure::UnsupportedLanguage(language.clone()));
		}
		let keyword = if theme.as_str() == "github-dark" { "#ff7b72" } else { "#d73a49" };
		Ok(code
			.split('\n')
			.map(|line| match line.strip_prefix("const") {
				Some(rest) => vec![Token::new("const", Some(keyword)), Token::plain(rest)],
				None => vec![Token::plain(line)],
			})
			.collect())
	}

	fn theme_colors(&self, theme: &ThemeId) -> Option<RawThemeColors> {
		(theme.as_str() == "github-dark").then(|| RawThemeColors {
			bg: Some("#0d1117".into()),
			fg: Some("#e6edf3".into()),
			..RawThemeColors::default()
		})
	}
}

/// A pipeline over `oracle` with default configuration, plus the text
/// and revision bookkeeping an editing surface would do.
pub struct Editor {
	pub pipeline: AnnotationPipeline,
	pub text: Rope,
	pub revision: Revision,
}

impl Editor {
	pub fn new(oracle: Arc<dyn AnnotationOracle>, language: &str, now: Instant) -> Self {
		Self::with_config(oracle, language, &PipelineConfig::default(), now)
	}

	pub fn with_config(oracle: Arc<dyn AnnotationOracle>, language: &str, config: &PipelineConfig, now: Instant) -> Self {
		let _ = tracing_subscriber::fmt::try_init();
		let session = Arc::new(OracleSession::new(oracle, Arc::new(KeywordTokenizer)));
		Self {
			pipeline: AnnotationPipeline::new(session, config, LanguageId::new(language), now),
			text: Rope::new(),
			revision: Revision::INITIAL,
		}
	}

	/// Replaces the whole text.
	pub fn load(&mut self, text: &str, now: Instant) {
		self.text = Rope::from(text);
		self.revision = self.revision.next();
		self.pipeline.set_text(self.text.clone(), self.revision, now);
	}

	/// Types `s` at char `at`, as a focused user would.
	pub fn type_at(&mut self, at: usize, s: &str, now: Instant) {
		self.text.insert(at, s);
		self.revision = self.revision.next();
		self.pipeline.on_input(now);
		self.pipeline
			.on_change(self.text.clone(), TextEdit::insert(at, s.chars().count()), self.revision, now);
	}

	/// Ticks at `now` until no request is in flight.
	pub async fn settle(&mut self, now: Instant) -> TickReport {
		let mut report = TickReport::default();
		for _ in 0..64 {
			let tick = self.pipeline.tick(now);
			report.index_changed |= tick.index_changed;
			report.tokens_changed |= tick.tokens_changed;
			if self.pipeline.scheduler().state().in_flight().is_none() {
				break;
			}
			tokio::task::yield_now().await;
		}
		report
	}

	/// Lets spawned oracle calls run without ticking.
	pub async fn yield_to_tasks(&self) {
		for _ in 0..32 {
			tokio::task::yield_now().await;
		}
	}
}
