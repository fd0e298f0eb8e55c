use futures::FutureExt;
use rustc_hash::FxHashMap;
use snapline_oracle::{AnalysisOutcome, AnnotationOracleClient};
use snapline_primitives::{LanguageId, Revision, Rope};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::state::RequestId;

/// What a request analyzed.
pub(super) struct RequestInput {
	pub(super) revision: Revision,
	pub(super) language: LanguageId,
	pub(super) text: Rope,
}

struct PendingTask {
	input: RequestInput,
	cancel: CancellationToken,
	handle: JoinHandle<Option<AnalysisOutcome>>,
}

/// A request whose task has ended.
pub(super) struct FinishedTask {
	pub(super) id: RequestId,
	pub(super) input: RequestInput,
	/// `None` when the task was cancelled or panicked.
	pub(super) outcome: Option<AnalysisOutcome>,
}

/// Owns the spawned analysis tasks and collects them without blocking.
pub(super) struct AnalysisTasks {
	next_id: u64,
	tasks: FxHashMap<RequestId, PendingTask>,
}

impl AnalysisTasks {
	pub(super) fn new() -> Self {
		Self {
			next_id: 0,
			tasks: FxHashMap::default(),
		}
	}

	/// Spawns an analysis of `input` on the ambient Tokio runtime.
	pub(super) fn spawn(&mut self, client: &AnnotationOracleClient, input: RequestInput) -> RequestId {
		self.next_id += 1;
		let id = RequestId(self.next_id);

		let cancel = CancellationToken::new();
		let token = cancel.clone();
		let client = client.clone();
		let text = input.text.clone();
		let language = input.language.clone();
		let handle = tokio::spawn(async move {
			// Initialization is never raced against cancellation: dropping it
			// halfway would make the next request start it over. Its outcome is
			// cached, and `analyze` reports a failure.
			let _ = client.session().ensure_ready().await;
			if token.is_cancelled() {
				return None;
			}
			tokio::select! {
				biased;
				_ = token.cancelled() => None,
				outcome = client.analyze(&text, &language) => Some(outcome),
			}
		});

		self.tasks.insert(id, PendingTask { input, cancel, handle });
		id
	}

	/// Stops awaiting the oracle for `id`. The task still reports back.
	pub(super) fn cancel(&self, id: RequestId) {
		if let Some(task) = self.tasks.get(&id) {
			task.cancel.cancel();
		}
	}

	/// Removes and returns every finished task, oldest request first.
	pub(super) fn drain_finished(&mut self) -> Vec<FinishedTask> {
		let finished: Vec<RequestId> = self
			.tasks
			.iter()
			.filter(|(_, task)| task.handle.is_finished())
			.map(|(id, _)| *id)
			.collect();

		let mut done = Vec::with_capacity(finished.len());
		for id in finished {
			let Some(mut task) = self.tasks.remove(&id) else {
				continue;
			};
			let outcome = match (&mut task.handle).now_or_never() {
				Some(Ok(outcome)) => outcome,
				Some(Err(err)) => {
					tracing::warn!(request = %id, error = %err, "analysis task failed");
					None
				}
				None => {
					self.tasks.insert(id, task);
					continue;
				}
			};
			done.push(FinishedTask {
				id,
				input: task.input,
				outcome,
			});
		}

		done.sort_by_key(|task| task.id);
		done
	}

	pub(super) fn len(&self) -> usize {
		self.tasks.len()
	}
}
