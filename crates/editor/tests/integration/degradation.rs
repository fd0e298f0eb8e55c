use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use snapline_editor::{ConfigError, PipelineConfig, SchedState};
use snapline_oracle::{AnnotationKind, AnnotationOracle, OracleFailure, RawResults};
use snapline_primitives::{LanguageId, TextSpan};

use crate::common::{ANALYSIS_DEBOUNCE, Editor, TypeOracle, analyze_source, ms};

/// Fails every call with a fixed failure once `failing` is set.
#[derive(Default)]
struct FlakyOracle {
	failing: AtomicBool,
	failure: Option<OracleFailure>,
	calls: AtomicUsize,
}

impl FlakyOracle {
	fn failing_with(failure: OracleFailure) -> Arc<Self> {
		Arc::new(Self {
			failing: AtomicBool::new(true),
			failure: Some(failure),
			calls: AtomicUsize::new(0),
		})
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl AnnotationOracle for FlakyOracle {
	async fn initialize(&self) -> Result<(), OracleFailure> {
		Ok(())
	}

	async fn analyze(&self, code: &str, _extension: &str) -> Result<RawResults, OracleFailure> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.failing.load(Ordering::SeqCst) {
			return Err(self.failure.clone().unwrap_or_else(|| OracleFailure::new("checker crashed")));
		}
		Ok(RawResults::new(analyze_source(code)))
	}
}

/// Never gets past initialization.
#[derive(Default)]
struct BrokenOracle {
	inits: AtomicUsize,
	calls: AtomicUsize,
}

#[async_trait]
impl AnnotationOracle for BrokenOracle {
	async fn initialize(&self) -> Result<(), OracleFailure> {
		self.inits.fetch_add(1, Ordering::SeqCst);
		Err(OracleFailure::new("lib.d.ts could not be fetched"))
	}

	async fn analyze(&self, _code: &str, _extension: &str) -> Result<RawResults, OracleFailure> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(RawResults::default())
	}
}

#[tokio::test]
async fn test_partial_results_survive_oracle_failure() {
	let failure = OracleFailure::new("Errors were thrown in the sample, but not included in an errors tag").with_payload(json!({
		"twoslashResults": {
			"nodes": [
				{ "type": "hover", "start": 6, "length": 1, "line": 0, "character": 6, "text": "const x: number" },
				{ "type": "error", "start": 14, "length": 3, "line": 1, "character": 0,
				  "text": "Cannot find name 'foo'.", "code": 2304 }
			]
		}
	}));
	let oracle = FlakyOracle::failing_with(failure);
	let t0 = Instant::now();
	let mut editor = Editor::new(oracle.clone(), "typescript", t0);
	editor.load("const x = 42;\nfoo", t0);
	assert!(editor.settle(t0 + ANALYSIS_DEBOUNCE).await.index_changed);

	let index = editor.pipeline.index();
	assert_eq!(index.all_of_kind(AnnotationKind::Hover).len(), 1);
	assert_eq!(index.all_of_kind(AnnotationKind::Error)[0].span, TextSpan::new(14, 3));
	assert_eq!(index.lookup_at_offset(6).map(|node| &*node.text), Some("const x: number"));

	let frame = editor.pipeline.frame(t0 + ANALYSIS_DEBOUNCE);
	assert_eq!(frame.underlines.len(), 1);
	assert_eq!(frame.underlines[0].segments[0].line, 1);
	assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn test_failure_naming_a_line_becomes_an_error() {
	let oracle = FlakyOracle::failing_with(OracleFailure::new("The request on line 2 for foo did not return anything"));
	let t0 = Instant::now();
	let mut editor = Editor::new(oracle, "typescript", t0);
	editor.load("const x = 42;\nfoo\n//  ^?", t0);
	editor.settle(t0 + ANALYSIS_DEBOUNCE).await;

	let errors = editor.pipeline.index().all_of_kind(AnnotationKind::Error);
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].span.start, 14);
	assert!(errors[0].text.contains("line 2"));
	assert_eq!(editor.pipeline.frame(t0 + ANALYSIS_DEBOUNCE).underlines[0].segments[0].line, 1);
}

#[tokio::test]
async fn test_unrecoverable_failure_keeps_previous_snapshot() {
	let oracle = Arc::new(FlakyOracle::default());
	let t0 = Instant::now();
	let mut editor = Editor::new(oracle.clone(), "typescript", t0);
	editor.load("const x = 42;", t0);
	editor.settle(t0 + ANALYSIS_DEBOUNCE).await;
	assert_eq!(editor.pipeline.index().all_of_kind(AnnotationKind::Hover).len(), 1);

	oracle.failing.store(true, Ordering::SeqCst);
	let t1 = t0 + ms(1000);
	editor.type_at(0, "\n", t1);
	assert!(!editor.settle(t1 + ANALYSIS_DEBOUNCE).await.index_changed);
	assert_eq!(oracle.calls(), 2);

	// Still there, remapped past the inserted line, and shown provisionally.
	let hovers = editor.pipeline.index().all_of_kind(AnnotationKind::Hover);
	assert_eq!(hovers.len(), 1);
	assert_eq!(hovers[0].span, TextSpan::new(7, 1));
	assert!(editor.pipeline.frame(t1 + ANALYSIS_DEBOUNCE).provisional);
	assert_eq!(editor.pipeline.scheduler().state(), SchedState::Idle);

	// The same failing input is not resent.
	editor.settle(t1 + ms(2000)).await;
	assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn test_initialization_failure_leaves_tokens_working() {
	let oracle = Arc::new(BrokenOracle::default());
	let t0 = Instant::now();
	let mut editor = Editor::new(oracle.clone(), "typescript", t0);
	editor.load("const x = 42;", t0);
	let report = editor.settle(t0 + ANALYSIS_DEBOUNCE).await;
	assert!(report.tokens_changed);
	assert!(!report.index_changed);
	assert!(editor.pipeline.index().is_empty());
	assert_eq!(editor.pipeline.tokens().len(), 1);

	for round in 1..3u64 {
		let at = t0 + ms(1000 * round);
		let end = editor.text.len_chars();
		editor.type_at(end, " ", at);
		editor.settle(at + ANALYSIS_DEBOUNCE).await;
	}
	assert_eq!(oracle.inits.load(Ordering::SeqCst), 1);
	assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
	assert_eq!(editor.pipeline.tokens().len(), 1);
	assert_eq!(editor.pipeline.tokens()[0].span, TextSpan::new(0, 5));
}

#[tokio::test]
async fn test_unsupported_language_clears_and_stays_quiet() {
	let oracle = TypeOracle::new();
	let t0 = Instant::now();
	let mut editor = Editor::new(oracle.clone(), "typescript", t0);
	editor.load("const x = 42;\nx\n//    ^?", t0);
	editor.settle(t0 + ANALYSIS_DEBOUNCE).await;
	assert!(!editor.pipeline.index().is_empty());
	assert!(!editor.pipeline.tokens().is_empty());

	let t1 = t0 + ms(1000);
	editor.pipeline.set_language(LanguageId::new("python"), t1);
	assert!(editor.pipeline.index().is_empty());
	assert!(editor.pipeline.frame(t1).queries.is_empty());
	assert_eq!(editor.pipeline.scheduler().state(), SchedState::Disabled);

	editor.type_at(0, "# ", t1 + ms(10));
	let report = editor.settle(t1 + ms(2000)).await;
	assert!(report.tokens_changed);
	assert!(editor.pipeline.tokens().is_empty());
	assert_eq!(oracle.calls().len(), 1);
}

#[tokio::test]
async fn test_config_from_toml_drives_the_pipeline() {
	let config = PipelineConfig::from_toml_str("analysis_debounce_ms = 200\nhover_delay_ms = 50\n").unwrap();
	let oracle = TypeOracle::new();
	let t0 = Instant::now();
	let mut editor = Editor::with_config(oracle.clone(), "typescript", &config, t0);
	editor.load("const x = 42;", t0);

	editor.pipeline.tick(t0 + ms(199));
	editor.yield_to_tasks().await;
	assert!(oracle.calls().is_empty());
	editor.settle(t0 + ms(200)).await;
	assert_eq!(oracle.calls().len(), 1);

	editor.pipeline.pointer_at(6, t0 + ms(300));
	assert!(editor.pipeline.frame(t0 + ms(350)).hover.is_some());
}

#[tokio::test]
async fn test_disabled_config_never_calls_the_oracle() {
	let config = PipelineConfig::from_toml_str("enabled = false").unwrap();
	let oracle = TypeOracle::new();
	let t0 = Instant::now();
	let mut editor = Editor::with_config(oracle.clone(), "typescript", &config, t0);
	editor.load("const x = 42;", t0);
	let report = editor.settle(t0 + ms(5000)).await;
	assert!(report.tokens_changed);
	assert!(!report.index_changed);
	assert!(oracle.calls().is_empty());
	assert_eq!(oracle.inits(), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
	let err = PipelineConfig::from_toml_str("idle_opacity = 1.5").unwrap_err();
	assert!(matches!(err, ConfigError::Invalid { field: "idle_opacity", .. }));

	let err = PipelineConfig::from_toml_str("analysis_debounce_ms = \"soon\"").unwrap_err();
	assert!(matches!(err, ConfigError::Toml(_)));
}
