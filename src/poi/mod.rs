//! Points of interest: floating heading tabs and the registry that drives them.
//!
//! A [`Poi`] is a small handle bound to one document heading. It rests mostly
//! off-screen ("peeking"), slides in when the reader hovers any handle, and is
//! pinned in view while its section holds the middle of the viewport.
//!
//! The [`Registry`] owns every POI on a page and turns host events into
//! show/hide/pin transitions. It talks to the host only through
//! [`crate::surface::UiSurface`] and [`crate::surface::Timer`].

mod error;
mod options;
mod registry;

pub use error::PoiError;
pub use options::{
    DEFAULT_ANIMATION_MILLIS, DEFAULT_CSS_CLASS, DEFAULT_DELAY_MILLIS, DEFAULT_MAX_LEVEL,
    DEFAULT_PEAK_PIXELS, PoiConfig, PoiOptions,
};
pub use registry::{Poi, PoiEvent, PoiState, Registry, minimap_offset, strip_decoration};
