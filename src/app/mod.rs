//! Terminal pager that hosts the POI registry.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state, registry included
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions, forwarding host events to the registry
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::time::Duration;

use crate::poi::PoiConfig;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    watch_enabled: bool,
    watch_settle: Duration,
    poi_config: PoiConfig,
}

impl App {
    /// Create a new application for the given file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            watch_enabled: false,
            watch_settle: crate::watcher::DEFAULT_SETTLE,
            poi_config: PoiConfig::default(),
        }
    }

    /// Enable or disable file watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Quiet time after a file change before it is reloaded.
    #[must_use]
    pub const fn with_watch_settle(mut self, settle: Duration) -> Self {
        self.watch_settle = settle;
        self
    }

    /// Registry-wide POI defaults.
    #[must_use]
    pub fn with_poi_config(mut self, config: PoiConfig) -> Self {
        self.poi_config = config;
        self
    }
}

#[cfg(test)]
mod tests;
