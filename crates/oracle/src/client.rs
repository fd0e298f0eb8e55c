//! Analysis client: drives the oracle and recovers from its failures.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use snapline_primitives::{LanguageId, OracleCoord, Rope, TextSpan};
use tracing::{debug, warn};

use crate::node::{AnnotationKind, AnnotationNode, ErrorCode};
use crate::oracle::OracleFailure;
use crate::session::OracleSession;
use crate::wire::RawResults;
use crate::{OracleError, Result};

/// Field of a failure payload holding the results resolved before the failure.
const PARTIAL_RESULTS_FIELD: &str = "twoslashResults";

/// Error code of nodes synthesized from a failure description.
const SYNTHESIZED_ERROR_CODE: &str = ": Twoslash Error";

static FAILED_LINE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"The request on line (\d+)").ok());

/// How an analysis pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
	/// The oracle succeeded.
	Complete(Vec<AnnotationNode>),
	/// The oracle failed, but nodes were recovered from the failure.
	Recovered { nodes: Vec<AnnotationNode>, failure: Arc<str> },
	/// Nothing usable this pass. Any previously displayed snapshot stays.
	Degraded(OracleError),
}

impl AnalysisOutcome {
	/// Nodes to install, or `None` when the pass produced nothing to install.
	pub fn into_nodes(self) -> Option<Vec<AnnotationNode>> {
		match self {
			Self::Complete(nodes) | Self::Recovered { nodes, .. } => Some(nodes),
			Self::Degraded(_) => None,
		}
	}

	pub fn is_degraded(&self) -> bool {
		matches!(self, Self::Degraded(_))
	}
}

/// Client of the analysis oracle for one session.
#[derive(Debug, Clone)]
pub struct AnnotationOracleClient {
	session: Arc<OracleSession>,
}

impl AnnotationOracleClient {
	pub fn new(session: Arc<OracleSession>) -> Self {
		Self { session }
	}

	pub fn session(&self) -> &Arc<OracleSession> {
		&self.session
	}

	/// Returns true if `language` can be analyzed at all.
	///
	/// Callers check this before scheduling work; [`Self::analyze`] degrades
	/// on unsupported languages without touching the oracle.
	pub fn supports(language: &LanguageId) -> bool {
		language.supports_analysis()
	}

	/// Analyzes `text` as `language`.
	///
	/// Never fails: oracle failures resolve to [`AnalysisOutcome::Recovered`]
	/// or [`AnalysisOutcome::Degraded`].
	pub async fn analyze(&self, text: &Rope, language: &LanguageId) -> AnalysisOutcome {
		let Some(extension) = language.analysis_extension() else {
			return AnalysisOutcome::Degraded(OracleError::UnsupportedLanguage(language.clone()));
		};
		if let Err(err) = self.session.ensure_ready().await {
			return AnalysisOutcome::Degraded(err);
		}

		let code = text.to_string();
		match self.session.annotator().analyze(&code, extension).await {
			Ok(results) => {
				let nodes = results.into_nodes(text);
				debug!(%language, nodes = nodes.len(), "analysis complete");
				AnalysisOutcome::Complete(nodes)
			}
			Err(failure) => match recover_partial(&failure, text) {
				Ok(nodes) => {
					warn!(error = %failure, recovered = nodes.len(), "analysis failed; using recovered nodes");
					AnalysisOutcome::Recovered {
						nodes,
						failure: failure.description.into(),
					}
				}
				Err(err) => {
					warn!(error = %err, "analysis failed; nothing recovered");
					AnalysisOutcome::Degraded(err)
				}
			},
		}
	}
}

/// Extracts whatever nodes a failure still carries.
///
/// Structured partial results win. Failing that, a failure naming the
/// offending line yields a single error node spanning that line; this path
/// depends on the oracle's message wording and is best-effort only.
pub fn recover_partial(failure: &OracleFailure, text: &Rope) -> Result<Vec<AnnotationNode>> {
	if let Some(payload) = failure.payload.get(PARTIAL_RESULTS_FIELD) {
		let results: RawResults =
			serde_json::from_value(payload.clone()).map_err(|err| OracleError::Payload(err.to_string().into()))?;
		return Ok(results.into_nodes(text));
	}

	if let Some(node) = failed_line_node(&failure.description, text) {
		return Ok(vec![node]);
	}

	Err(OracleError::Analysis(failure.description.as_str().into()))
}

fn failed_line_node(description: &str, text: &Rope) -> Option<AnnotationNode> {
	let re = FAILED_LINE_RE.as_ref()?;
	let line_1based: usize = re.captures(description)?.get(1)?.as_str().parse().ok()?;
	let line = line_1based.checked_sub(1)?;
	if line >= text.len_lines() {
		return None;
	}

	let start = text.line_to_char(line);
	let span = TextSpan::new(start, text.line(line).len_chars());
	Some(
		AnnotationNode::new(AnnotationKind::Error, span, OracleCoord::new(line as u32, 0), description)
			.with_error_code(ErrorCode::Text(SYNTHESIZED_ERROR_CODE.to_owned())),
	)
}
