use std::time::{Duration, Instant};

/// Hides query overlays while the user types.
///
/// - focused, input within the quiet window: opacity 0 (fully hidden)
/// - focused, quiet window elapsed: the idle opacity
/// - not focused: opacity 1
///
/// Every input restarts the window, so a steady stream of keystrokes keeps
/// overlays hidden without gaps.
#[derive(Debug, Clone)]
pub struct TypingAttenuation {
	quiet: Duration,
	idle_opacity: f32,
	focused: bool,
	last_input: Option<Instant>,
}

impl TypingAttenuation {
	pub fn new(quiet: Duration, idle_opacity: f32) -> Self {
		Self {
			quiet,
			idle_opacity: idle_opacity.clamp(0.0, 1.0),
			focused: false,
			last_input: None,
		}
	}

	/// Records a keystroke, paste, or cut at `now`.
	pub fn note_input(&mut self, now: Instant) {
		self.last_input = Some(now);
	}

	pub fn set_focused(&mut self, focused: bool) {
		self.focused = focused;
		if !focused {
			self.last_input = None;
		}
	}

	pub fn is_focused(&self) -> bool {
		self.focused
	}

	pub fn opacity(&self, now: Instant) -> f32 {
		if !self.focused {
			return 1.0;
		}
		match self.last_input {
			Some(at) if now.saturating_duration_since(at) < self.quiet => 0.0,
			_ => self.idle_opacity,
		}
	}

	/// When the opacity next changes on its own.
	pub fn next_change(&self, now: Instant) -> Option<Instant> {
		if !self.focused {
			return None;
		}
		let resume = self.last_input? + self.quiet;
		(resume > now).then_some(resume)
	}
}
