// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. poi::PoiError)
    clippy::module_name_repetitions
)]

//! # Sidelegend
//!
//! Points of interest for long documents: every heading gets a small handle
//! floating at the right edge of the viewport, placed like a minimap.
//!
//! - Resting handles peek a few pixels into view
//! - Hovering any handle slides all of them out, leaving starts a delayed hide
//! - The section under the middle of the viewport stays pinned open
//!
//! ## Architecture
//!
//! The [`poi::Registry`] is host-agnostic. It talks to a [`surface::UiSurface`]
//! for geometry and styling and to a [`surface::Timer`] for delayed hides, and
//! is driven by [`poi::PoiEvent`]s the host forwards.
//!
//! The bundled host is a terminal pager using The Elm Architecture (TEA):
//! - **Model**: Application state, registry included
//! - **Message**: Events and actions
//! - **Update**: State transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`poi`]: POI registry, options and errors
//! - [`surface`]: Surface and timer capabilities, headless implementations
//! - [`document`]: Markdown parsing and layout
//! - [`ui`]: Terminal surface and rendering
//! - [`app`]: Main application loop and state
//! - [`watcher`]: File watching
//! - [`config`]: Saved flag defaults
//! - [`dump`]: Headless layout for `--dump`

pub mod app;
pub mod config;
pub mod document;
pub mod dump;
pub mod poi;
pub mod surface;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::poi::{PoiConfig, PoiEvent, PoiOptions, Registry};
    pub use crate::surface::{DeadlineTimer, RecordingSurface, Timer, UiSurface};
    pub use crate::ui::viewport::Viewport;
}
