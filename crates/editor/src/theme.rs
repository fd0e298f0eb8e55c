//! Active theme and the styles derived from it.
//!
//! [`ThemeContext`] holds the active palette behind an [`ArcSwap`], so a
//! theme switch replaces the whole palette at once and readers never see a
//! half-updated one. Styles are computed as plain values from the palette;
//! nothing here touches a stylesheet.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use snapline_oracle::{RawThemeColors, TokenizerOracle};
use snapline_primitives::ThemeId;
use tracing::debug;

/// Color of error underlines, identical under every theme.
pub const ERROR_ACCENT: &str = "#f14c4c";

const DEFAULT_BACKGROUND: &str = "#ffffff";
const DEFAULT_FOREGROUND: &str = "#000000";

const SELECTION_KEYS: [&str; 2] = ["editor.selectionBackground", "selection.background"];
const LINE_HIGHLIGHT_KEYS: [&str; 2] = ["editor.lineHighlightBackground", "lineHighlight.background"];

/// Resolved colors of one theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePalette {
	pub id: ThemeId,
	pub background: String,
	pub foreground: String,
	pub selection: Option<String>,
	pub line_highlight: Option<String>,
}

impl ThemePalette {
	/// Extracts a palette from the tokenizer's theme data, filling gaps with
	/// black on white.
	pub fn from_raw(id: ThemeId, raw: Option<&RawThemeColors>) -> Self {
		let lookup = |keys: &[&str]| raw.and_then(|raw| keys.iter().find_map(|key| raw.colors.get(*key).cloned()));
		Self {
			background: raw
				.and_then(|raw| raw.bg.clone())
				.unwrap_or_else(|| DEFAULT_BACKGROUND.to_owned()),
			foreground: raw
				.and_then(|raw| raw.fg.clone())
				.unwrap_or_else(|| DEFAULT_FOREGROUND.to_owned()),
			selection: lookup(&SELECTION_KEYS),
			line_highlight: lookup(&LINE_HIGHLIGHT_KEYS),
			id,
		}
	}
}

/// Style values for the editing surface, derived from a palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStyle {
	pub background: String,
	pub foreground: String,
	pub caret: String,
	pub gutter_foreground: String,
	pub active_line: String,
	pub selection: String,
	pub error_accent: &'static str,
}

impl EditorStyle {
	pub fn from_palette(palette: &ThemePalette) -> Self {
		let fg = &palette.foreground;
		Self {
			background: palette.background.clone(),
			foreground: fg.clone(),
			caret: fg.clone(),
			gutter_foreground: with_alpha(fg, "80"),
			active_line: palette.line_highlight.clone().unwrap_or_else(|| with_alpha(fg, "08")),
			selection: palette.selection.clone().unwrap_or_else(|| with_alpha(fg, "20")),
			error_accent: ERROR_ACCENT,
		}
	}
}

/// Fixed colors of hover and query tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipStyle {
	pub background: &'static str,
	pub foreground: &'static str,
	pub border: &'static str,
	pub type_text: &'static str,
	pub docs_text: &'static str,
}

impl TooltipStyle {
	pub const DEFAULT: Self = Self {
		background: "#1e1e1e",
		foreground: "#d4d4d4",
		border: "#454545",
		type_text: "#4ec9b0",
		docs_text: "#9cdcfe",
	};
}

/// Appends a two-digit hex alpha to an opaque `#rgb` or `#rrggbb` color.
///
/// Other colors are returned unchanged.
fn with_alpha(color: &str, alpha: &str) -> String {
	let Some(hex) = color.strip_prefix('#') else {
		return color.to_owned();
	};
	if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
		return color.to_owned();
	}
	match hex.len() {
		3 => {
			let expanded: String = hex.chars().flat_map(|ch| [ch, ch]).collect();
			format!("#{expanded}{alpha}")
		}
		6 => format!("#{hex}{alpha}"),
		_ => color.to_owned(),
	}
}

/// Active theme of one editor.
pub struct ThemeContext {
	tokenizer: Arc<dyn TokenizerOracle>,
	active: ArcSwap<ThemePalette>,
	palettes: Mutex<FxHashMap<ThemeId, Arc<ThemePalette>>>,
}

impl std::fmt::Debug for ThemeContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ThemeContext").field("active", &self.active.load().id).finish_non_exhaustive()
	}
}

impl ThemeContext {
	pub fn new(tokenizer: Arc<dyn TokenizerOracle>, initial: ThemeId) -> Self {
		let mut palettes = FxHashMap::default();
		let palette = Arc::new(ThemePalette::from_raw(initial.clone(), tokenizer.theme_colors(&initial).as_ref()));
		palettes.insert(initial, palette.clone());
		Self {
			tokenizer,
			active: ArcSwap::new(palette),
			palettes: Mutex::new(palettes),
		}
	}

	/// Makes `theme` active. Returns true if the active theme changed.
	pub fn set_theme(&self, theme: ThemeId) -> bool {
		if self.active.load().id == theme {
			return false;
		}
		let palette = self.resolve(theme);
		debug!(theme = %palette.id, "theme.switch");
		self.active.store(palette);
		true
	}

	pub fn theme_id(&self) -> ThemeId {
		self.active.load().id.clone()
	}

	/// The active palette. Stays valid across later switches.
	pub fn palette(&self) -> Arc<ThemePalette> {
		self.active.load_full()
	}

	pub fn editor_style(&self) -> EditorStyle {
		EditorStyle::from_palette(&self.active.load())
	}

	pub fn error_accent(&self) -> &'static str {
		ERROR_ACCENT
	}

	fn resolve(&self, theme: ThemeId) -> Arc<ThemePalette> {
		if let Some(palette) = self.palettes.lock().get(&theme) {
			return palette.clone();
		}
		let raw = self.tokenizer.theme_colors(&theme);
		let palette = Arc::new(ThemePalette::from_raw(theme.clone(), raw.as_ref()));
		self.palettes.lock().entry(theme).or_insert(palette).clone()
	}
}
