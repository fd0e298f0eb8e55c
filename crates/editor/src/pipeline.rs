//! Event-driven facade over the whole overlay pipeline.
//!
//! The editing surface pushes events in (`on_change`, `on_focus`, ...), the
//! host calls [`AnnotationPipeline::tick`] on its event loop and redraws
//! when the returned [`TickReport`] says something changed or when
//! [`AnnotationPipeline::next_deadline`] passes.

use std::sync::Arc;
use std::time::Instant;

use snapline_oracle::{ColoredSpan, OracleSession, TokenStore, token_spans};
use snapline_primitives::{CharIdx, LanguageId, Revision, Rope, TextEdit, ThemeId};
use tracing::trace;

use crate::config::PipelineConfig;
use crate::index::AnnotationIndex;
use crate::render::{OverlayFrame, OverlayRenderer};
use crate::scheduler::OverlayScheduler;
use crate::theme::{EditorStyle, ThemeContext, ThemePalette};
use crate::tokens::{TokenLayer, TokenRefresh};

/// What a tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
	pub index_changed: bool,
	pub tokens_changed: bool,
}

impl TickReport {
	pub fn any(&self) -> bool {
		self.index_changed || self.tokens_changed
	}
}

/// Exactly what is on screen, for export.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
	pub revision: Revision,
	pub text: Rope,
	pub language: LanguageId,
	pub palette: Arc<ThemePalette>,
	pub style: EditorStyle,
	pub tokens: Vec<ColoredSpan>,
	pub overlays: OverlayFrame,
}

/// Annotation overlays for one editor buffer.
///
/// Must be ticked from within a Tokio runtime.
#[derive(Debug)]
pub struct AnnotationPipeline {
	text: Rope,
	revision: Revision,
	scheduler: OverlayScheduler,
	renderer: OverlayRenderer,
	theme: ThemeContext,
	tokens: TokenStore,
	token_layer: TokenLayer,
	token_refresh: TokenRefresh,
}

impl AnnotationPipeline {
	pub fn new(session: Arc<OracleSession>, config: &PipelineConfig, language: LanguageId, now: Instant) -> Self {
		let mut token_refresh = TokenRefresh::new(config.token_debounce());
		token_refresh.request_now(now);
		Self {
			text: Rope::new(),
			revision: Revision::INITIAL,
			scheduler: OverlayScheduler::new(session.annotation_client(), config, language),
			renderer: OverlayRenderer::new(config),
			theme: ThemeContext::new(session.tokenizer().clone(), config.default_theme.clone()),
			tokens: session.token_store(),
			token_layer: TokenLayer::new(),
			token_refresh,
		}
	}

	/// The buffer changed to `text` at `revision` through `edit`.
	pub fn on_change(&mut self, text: Rope, edit: TextEdit, revision: Revision, now: Instant) {
		let len = text.len_chars();
		self.token_layer.apply_edit(&edit, len, revision);
		self.token_refresh.note_edit(now);
		self.renderer.hover_mut().on_buffer_change();
		self.scheduler.on_edit(text.clone(), edit, revision, now);
		self.text = text;
		self.revision = revision;
	}

	/// Replaces the whole buffer, e.g. on load or paste-all.
	pub fn set_text(&mut self, text: Rope, revision: Revision, now: Instant) {
		let edit = TextEdit::new(0, self.text.len_chars(), text.len_chars());
		self.on_change(text, edit, revision, now);
	}

	/// A keystroke, paste, or cut happened.
	pub fn on_input(&mut self, now: Instant) {
		self.renderer.attenuation_mut().note_input(now);
	}

	pub fn on_focus(&mut self) {
		self.renderer.attenuation_mut().set_focused(true);
	}

	pub fn on_blur(&mut self) {
		self.renderer.attenuation_mut().set_focused(false);
	}

	pub fn pointer_at(&mut self, offset: CharIdx, now: Instant) {
		self.renderer.hover_mut().pointer_at(offset, self.scheduler.index(), now);
	}

	pub fn pointer_left(&mut self) {
		self.renderer.hover_mut().pointer_left();
	}

	pub fn set_language(&mut self, language: LanguageId, now: Instant) {
		if self.scheduler.language() == &language {
			return;
		}
		self.scheduler.set_language(language, now);
		self.token_refresh.request_now(now);
	}

	/// Switches theme. Returns true if the active theme changed.
	pub fn set_theme(&mut self, theme: ThemeId, now: Instant) -> bool {
		let changed = self.theme.set_theme(theme);
		if changed {
			self.token_refresh.request_now(now);
		}
		changed
	}

	pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
		self.scheduler.set_enabled(enabled, now);
	}

	/// Advances timers and collects finished work.
	pub fn tick(&mut self, now: Instant) -> TickReport {
		let index_changed = self.scheduler.tick(now);
		let tokens_changed = self.token_refresh.take_due(now) && self.refresh_tokens();
		TickReport {
			index_changed,
			tokens_changed,
		}
	}

	/// The overlay frame to draw at `now`.
	pub fn frame(&self, now: Instant) -> OverlayFrame {
		self.renderer.frame(self.scheduler.index(), &self.text, now)
	}

	/// Everything currently displayed, for export.
	pub fn display_snapshot(&self, now: Instant) -> DisplaySnapshot {
		let palette = self.theme.palette();
		DisplaySnapshot {
			revision: self.revision,
			text: self.text.clone(),
			language: self.scheduler.language().clone(),
			style: EditorStyle::from_palette(&palette),
			palette,
			tokens: self.token_layer.spans().to_vec(),
			overlays: self.frame(now),
		}
	}

	/// Returns true while displayed annotations are provisional or pending.
	pub fn is_analysis_pending(&self) -> bool {
		self.scheduler.is_busy()
	}

	/// Earliest instant at which ticking or redrawing would have an effect.
	pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
		[
			self.scheduler.next_deadline(),
			self.token_refresh.next_deadline(),
			self.renderer.next_change(now),
		]
		.into_iter()
		.flatten()
		.min()
	}

	pub fn index(&self) -> &AnnotationIndex {
		self.scheduler.index()
	}

	pub fn scheduler(&self) -> &OverlayScheduler {
		&self.scheduler
	}

	pub fn theme(&self) -> &ThemeContext {
		&self.theme
	}

	pub fn tokens(&self) -> &[ColoredSpan] {
		self.token_layer.spans()
	}

	pub fn text(&self) -> &Rope {
		&self.text
	}

	pub fn revision(&self) -> Revision {
		self.revision
	}

	fn refresh_tokens(&mut self) -> bool {
		let theme = self.theme.theme_id();
		let lines = self.tokens.tokenize(&self.text, self.scheduler.language(), &theme);
		let spans = token_spans(&lines, &self.text);
		trace!(revision = %self.revision, spans = spans.len(), "tokens.refresh");
		self.token_layer.replace(spans, self.revision)
	}
}
