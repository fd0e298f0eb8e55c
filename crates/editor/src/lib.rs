#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Type-annotation overlay engine for a code editor.
//!
//! Source text is analyzed by an external type oracle; the resulting hover,
//! query, error, and completion nodes are indexed against the live buffer,
//! kept in range across edits, and rendered as overlays that stay out of
//! the user's way while typing.
//!
//! # Main Types
//!
//! - [`AnnotationPipeline`] - Facade taking editor events and producing frames
//! - [`OverlayScheduler`] - Debounced, supersession-safe analysis scheduling
//! - [`AnnotationIndex`] - Queryable view of the latest analysis snapshot
//! - [`OverlayRenderer`] - Overlay frames, typing attenuation, and hover delay
//! - [`ThemeContext`] - Active palette with atomic switching
//!
//! # Architecture
//!
//! ```text
//! editing surface ──events──► AnnotationPipeline
//!                              ├── OverlayScheduler ──spawn──► AnnotationOracleClient
//!                              │    └── AnnotationIndex ◄──results (last request wins)
//!                              ├── TokenLayer ◄── TokenStore (debounced)
//!                              ├── OverlayRenderer ──► OverlayFrame
//!                              └── ThemeContext ──► EditorStyle
//! ```

/// Pipeline tunables and their TOML loading.
pub mod config;
/// Index over the latest analysis snapshot.
pub mod index;
/// Event facade wiring all components together.
pub mod pipeline;
/// Overlay frame construction.
pub mod render;
/// Analysis scheduling state machine.
pub mod scheduler;
/// Palettes, derived styles, and theme switching.
pub mod theme;
/// Syntax-color decorations.
pub mod tokens;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, PipelineConfig};
pub use index::{AnalysisSnapshot, AnnotationIndex, QueryAnchor};
pub use pipeline::{AnnotationPipeline, DisplaySnapshot, TickReport};
pub use render::{
	HoverTracker, NO_TYPE_INFO, OverlayFrame, OverlayRenderer, QueryOverlay, Tooltip, TooltipSection, TypingAttenuation,
	Underline, UnderlineSegment,
};
pub use scheduler::{OverlayScheduler, RequestId, SchedState};
pub use theme::{ERROR_ACCENT, EditorStyle, ThemeContext, ThemePalette, TooltipStyle};
pub use tokens::{TokenLayer, TokenRefresh};
