use std::time::{Duration, Instant};

/// Identifier of one analysis request. Strictly increasing per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Phase of the analysis scheduler.
///
/// | from        | event            | to                          |
/// |-------------|------------------|-----------------------------|
/// | `Idle`      | edit             | `Scheduled`                 |
/// | `Scheduled` | edit             | `Scheduled` (timer reset)   |
/// | `Scheduled` | deadline         | `InFlight`                  |
/// | `InFlight`  | edit             | `InFlight` (rerun noted)    |
/// | `InFlight`  | result           | `Idle`, or `Scheduled` if a rerun was noted |
///
/// `Disabled` is entered from any phase when the feature is switched off or
/// the language cannot be analyzed, and left once both are true again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedState {
	/// No pending work.
	Idle,
	/// Waiting for the debounce deadline.
	Scheduled { due_at: Instant },
	/// One oracle call outstanding. `rerun_after` holds the time of the most
	/// recent edit made while it ran, if any.
	InFlight { request: RequestId, rerun_after: Option<Instant> },
	/// Feature off or language unsupported.
	Disabled,
}

impl SchedState {
	/// Transition for a buffer change at `now`.
	pub(super) fn edited(self, now: Instant, debounce: Duration) -> Self {
		match self {
			Self::Idle | Self::Scheduled { .. } => Self::Scheduled { due_at: now + debounce },
			Self::InFlight { request, .. } => Self::InFlight {
				request,
				rerun_after: Some(now),
			},
			Self::Disabled => Self::Disabled,
		}
	}

	/// Transition for the in-flight request resolving.
	pub(super) fn resolved(self, debounce: Duration) -> Self {
		match self {
			Self::InFlight {
				rerun_after: Some(edited_at),
				..
			} => Self::Scheduled {
				due_at: edited_at + debounce,
			},
			Self::InFlight { rerun_after: None, .. } => Self::Idle,
			other => other,
		}
	}

	/// Transition for a pass that must run as soon as possible.
	pub(super) fn forced(now: Instant) -> Self {
		Self::Scheduled { due_at: now }
	}

	/// The request currently awaited, if any.
	pub fn in_flight(&self) -> Option<RequestId> {
		match self {
			Self::InFlight { request, .. } => Some(*request),
			_ => None,
		}
	}

	/// Returns true while analysis work is pending or running.
	pub fn is_busy(&self) -> bool {
		matches!(self, Self::Scheduled { .. } | Self::InFlight { .. })
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Scheduled { .. } => "scheduled",
			Self::InFlight { .. } => "in_flight",
			Self::Disabled => "disabled",
		}
	}
}
