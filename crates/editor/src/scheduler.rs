//! Debounced, supersession-safe scheduling of analysis passes.
//!
//! [`OverlayScheduler`] owns the [`AnnotationIndex`] and is its only writer.
//! Buffer changes are pushed in with [`OverlayScheduler::on_edit`]; the host
//! drives time with [`OverlayScheduler::tick`], which collects finished
//! oracle calls and fires the debounce when due. Nothing blocks: oracle
//! calls run as Tokio tasks and are polled for completion.
//!
//! # Ordering
//!
//! Every request gets a strictly increasing [`RequestId`]. A result is
//! applied only if it belongs to the request the scheduler is currently
//! waiting on and is newer than the last applied one. Everything else is a
//! superseded result and is dropped silently, whatever order results arrive
//! in.
//!
//! Edits made while a request runs are recorded and replayed over its
//! result, so the applied snapshot is remapped to the current text before
//! anything renders it.

mod state;
mod tasks;

use std::mem;
use std::time::{Duration, Instant};

use snapline_oracle::{AnnotationNode, AnnotationOracleClient};
use snapline_primitives::{CharLen, LanguageId, Revision, Rope, TextEdit};
use tracing::{debug, trace};

pub use self::state::{RequestId, SchedState};
use self::tasks::{AnalysisTasks, FinishedTask, RequestInput};
use crate::config::PipelineConfig;
use crate::index::{AnalysisSnapshot, AnnotationIndex};

/// Input and result of the last pass that reached the oracle.
struct AnalyzedInput {
	text: Rope,
	language: LanguageId,
	/// `None` when that pass degraded.
	nodes: Option<Vec<AnnotationNode>>,
}

/// Schedules analysis passes for one buffer.
///
/// Must be ticked from within a Tokio runtime.
pub struct OverlayScheduler {
	client: AnnotationOracleClient,
	debounce: Duration,
	state: SchedState,
	enabled: bool,
	language: LanguageId,
	text: Rope,
	revision: Revision,
	index: AnnotationIndex,
	tasks: AnalysisTasks,
	/// Edits since the in-flight request was issued, with the doc length after each.
	edits_in_flight: Vec<(TextEdit, CharLen)>,
	last_applied: Option<RequestId>,
	analyzed: Option<AnalyzedInput>,
	/// Next pass must reach the oracle even for unchanged input.
	force: bool,
}

impl std::fmt::Debug for OverlayScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OverlayScheduler")
			.field("state", &self.state)
			.field("enabled", &self.enabled)
			.field("language", &self.language)
			.field("revision", &self.revision)
			.field("tasks", &self.tasks.len())
			.finish_non_exhaustive()
	}
}

impl OverlayScheduler {
	pub fn new(client: AnnotationOracleClient, config: &PipelineConfig, language: LanguageId) -> Self {
		let enabled = config.enabled;
		let state = if enabled && AnnotationOracleClient::supports(&language) {
			SchedState::Idle
		} else {
			SchedState::Disabled
		};
		Self {
			client,
			debounce: config.analysis_debounce(),
			state,
			enabled,
			language,
			text: Rope::new(),
			revision: Revision::INITIAL,
			index: AnnotationIndex::new(),
			tasks: AnalysisTasks::new(),
			edits_in_flight: Vec::new(),
			last_applied: None,
			analyzed: None,
			force: false,
		}
	}

	/// Records a buffer change: `text` is the new content at `revision`,
	/// produced from the previous content by `edit`.
	pub fn on_edit(&mut self, text: Rope, edit: TextEdit, revision: Revision, now: Instant) {
		let len = text.len_chars();
		self.index.apply_edit(&edit, len);
		self.index.invalidate(revision);
		if self.state.in_flight().is_some() {
			self.edits_in_flight.push((edit, len));
		}
		self.text = text;
		self.revision = revision;

		let next = self.state.edited(now, self.debounce);
		trace!(%revision, from = self.state.name(), to = next.name(), "analysis.edit");
		self.state = next;
	}

	/// Switches the feature on or off.
	///
	/// Switching off clears the index immediately. Switching back on forces
	/// a fresh pass even if the text did not change.
	pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
		if self.enabled == enabled {
			return;
		}
		self.enabled = enabled;
		if !enabled {
			self.deactivate("feature disabled");
		} else if AnnotationOracleClient::supports(&self.language) {
			self.force_pass(now);
		}
	}

	/// Changes the language of the buffer.
	///
	/// An unanalyzable language clears the index immediately. Another
	/// analyzable language supersedes any running request and forces a pass;
	/// the current data stays up as provisional until it lands.
	pub fn set_language(&mut self, language: LanguageId, now: Instant) {
		if self.language == language {
			return;
		}
		debug!(from = %self.language, to = %language, "analysis.language");
		self.language = language;
		if !self.enabled {
			return;
		}
		if AnnotationOracleClient::supports(&self.language) {
			self.force_pass(now);
		} else {
			self.deactivate("language not analyzable");
		}
	}

	/// Collects finished requests and fires the debounce if due.
	///
	/// Returns true if the index changed.
	pub fn tick(&mut self, now: Instant) -> bool {
		let mut changed = false;
		for finished in self.tasks.drain_finished() {
			changed |= self.on_finished(finished);
		}
		if let SchedState::Scheduled { due_at } = self.state {
			if now >= due_at {
				changed |= self.fire();
			}
		}
		changed
	}

	pub fn state(&self) -> SchedState {
		self.state
	}

	/// Returns true while displayed data is provisional: a pass is pending,
	/// running, or the snapshot trails the buffer.
	pub fn is_busy(&self) -> bool {
		self.state.is_busy() || self.index.is_stale()
	}

	pub fn index(&self) -> &AnnotationIndex {
		&self.index
	}

	pub fn language(&self) -> &LanguageId {
		&self.language
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// When the next debounce fires, if one is armed.
	pub fn next_deadline(&self) -> Option<Instant> {
		match self.state {
			SchedState::Scheduled { due_at } => Some(due_at),
			_ => None,
		}
	}

	/// Number of spawned requests not yet collected, superseded ones included.
	pub fn outstanding_requests(&self) -> usize {
		self.tasks.len()
	}

	fn force_pass(&mut self, now: Instant) {
		self.supersede_in_flight();
		self.force = true;
		self.state = SchedState::forced(now);
	}

	fn deactivate(&mut self, reason: &'static str) {
		self.supersede_in_flight();
		self.index.clear();
		self.analyzed = None;
		self.force = false;
		self.state = SchedState::Disabled;
		debug!(reason, "analysis.disabled");
	}

	fn supersede_in_flight(&mut self) {
		if let Some(request) = self.state.in_flight() {
			trace!(%request, "analysis.superseded");
			self.tasks.cancel(request);
			self.edits_in_flight.clear();
		}
	}

	fn on_finished(&mut self, finished: FinishedTask) -> bool {
		let FinishedTask { id, input, outcome } = finished;
		let is_current = self.state.in_flight() == Some(id);
		if !is_current || self.last_applied.is_some_and(|last| id <= last) {
			trace!(request = %id, revision = %input.revision, "analysis.discard_superseded");
			return false;
		}

		self.state = self.state.resolved(self.debounce);
		self.last_applied = Some(id);
		let edits = mem::take(&mut self.edits_in_flight);

		let Some(nodes) = outcome.and_then(|outcome| outcome.into_nodes()) else {
			// Degraded: the previous snapshot stays up.
			self.analyzed = Some(AnalyzedInput {
				text: input.text,
				language: input.language,
				nodes: None,
			});
			return false;
		};

		let count = nodes.len();
		self.analyzed = Some(AnalyzedInput {
			text: input.text.clone(),
			language: input.language.clone(),
			nodes: Some(nodes.clone()),
		});
		self.index
			.update(AnalysisSnapshot::new(input.revision, input.language, nodes), &input.text);
		for (edit, len) in &edits {
			self.index.apply_edit(edit, *len);
		}
		self.index.invalidate(self.revision);
		debug!(
			request = %id,
			revision = %input.revision,
			nodes = count,
			replayed_edits = edits.len(),
			next = self.state.name(),
			"analysis.applied"
		);
		true
	}

	fn fire(&mut self) -> bool {
		self.state = SchedState::Idle;
		let force = mem::take(&mut self.force);

		if self.text.len_chars() == 0 {
			self.analyzed = None;
			self.index.update(AnalysisSnapshot::empty(self.revision, self.language.clone()), &self.text);
			trace!(revision = %self.revision, "analysis.empty_text");
			return true;
		}

		if !force {
			if let Some(prev) = &self.analyzed {
				if prev.language == self.language && prev.text == self.text {
					trace!(revision = %self.revision, "analysis.unchanged");
					return self.reinstall_unchanged();
				}
			}
		}

		let input = RequestInput {
			revision: self.revision,
			language: self.language.clone(),
			text: self.text.clone(),
		};
		let request = self.tasks.spawn(&self.client, input);
		self.edits_in_flight.clear();
		self.state = SchedState::InFlight {
			request,
			rerun_after: None,
		};
		debug!(%request, revision = %self.revision, language = %self.language, forced = force, "analysis.issued");
		false
	}

	/// Text matches the last analyzed input: serve its nodes at the current
	/// revision instead of asking the oracle again.
	fn reinstall_unchanged(&mut self) -> bool {
		if !self.index.is_stale() {
			return false;
		}
		let Some(nodes) = self.analyzed.as_ref().and_then(|prev| prev.nodes.clone()) else {
			return false;
		};
		self.index
			.update(AnalysisSnapshot::new(self.revision, self.language.clone(), nodes), &self.text);
		true
	}
}
