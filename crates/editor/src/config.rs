//! Pipeline configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! enabled = true
//! analysis_debounce_ms = 500
//! token_debounce_ms = 100
//! typing_quiet_ms = 3000
//! idle_opacity = 0.45
//! hover_delay_ms = 300
//! default_theme = "github-light"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use snapline_primitives::ThemeId;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or field types.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value parsed but is out of range.
	#[error("invalid value for `{field}`: {reason}")]
	Invalid {
		/// Name of the offending field.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

/// Tunables of the annotation overlay pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
	/// Whether type annotations are shown at all.
	pub enabled: bool,
	/// Quiet period after the last edit before the analysis oracle is called.
	pub analysis_debounce_ms: u64,
	/// Quiet period after the last edit before re-tokenizing.
	pub token_debounce_ms: u64,
	/// How long query overlays stay hidden after a keystroke.
	pub typing_quiet_ms: u64,
	/// Query overlay opacity while focused but not typing.
	pub idle_opacity: f32,
	/// How long the pointer must rest on a span before its hover shows.
	pub hover_delay_ms: u64,
	pub default_theme: ThemeId,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			analysis_debounce_ms: 500,
			token_debounce_ms: 100,
			typing_quiet_ms: 3000,
			idle_opacity: 0.45,
			hover_delay_ms: 300,
			default_theme: ThemeId::default(),
		}
	}
}

impl PipelineConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.analysis_debounce_ms == 0 {
			return Err(ConfigError::Invalid {
				field: "analysis_debounce_ms",
				reason: "must be greater than zero".into(),
			});
		}
		if !(0.0..=1.0).contains(&self.idle_opacity) {
			return Err(ConfigError::Invalid {
				field: "idle_opacity",
				reason: format!("{} is outside [0, 1]", self.idle_opacity),
			});
		}
		Ok(())
	}

	pub fn analysis_debounce(&self) -> Duration {
		Duration::from_millis(self.analysis_debounce_ms)
	}

	pub fn token_debounce(&self) -> Duration {
		Duration::from_millis(self.token_debounce_ms)
	}

	pub fn typing_quiet(&self) -> Duration {
		Duration::from_millis(self.typing_quiet_ms)
	}

	pub fn hover_delay(&self) -> Duration {
		Duration::from_millis(self.hover_delay_ms)
	}
}
