//! Headless POI layout for `--dump`.
//!
//! Lays a document out the way a terminal of the given size would and reports
//! where every handle ends up, without opening the terminal.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::document::Document;
use crate::poi::{PoiConfig, PoiState, Registry};

/// Where one handle sits after a scan with the viewport at the top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiLayout {
    pub anchor_id: String,
    pub title: String,
    pub href: String,
    pub class: String,
    /// Absolute top of the heading, in pixels
    pub anchor_top: f64,
    /// Minimap offset of the handle, in pixels
    pub top: i64,
    pub right: f64,
    pub width: f64,
    pub state: PoiState,
}

/// Scan `document` in a headless terminal `height` rows tall.
pub fn layout(document: &Document, height: u16, config: PoiConfig) -> Vec<PoiLayout> {
    let mut surface = crate::ui::headless_surface(document, height);
    let mut registry = Registry::new(config);
    let created = registry.scan(&document.anchors(), &mut surface);
    tracing::debug!(created, height, "headless layout");

    registry
        .pois()
        .iter()
        .filter_map(|poi| {
            let handle = surface.handle(poi.handle())?;
            Some(PoiLayout {
                anchor_id: poi.anchor_id().to_string(),
                title: poi.title().to_string(),
                href: poi.href().to_string(),
                class: handle.class.clone(),
                anchor_top: poi.anchor_top(),
                top: poi.top_offset(),
                right: handle.right,
                width: handle.width,
                state: poi.state(),
            })
        })
        .collect()
}

/// Pretty JSON array of [`layout`] entries.
pub fn to_json(layouts: &[PoiLayout]) -> Result<String> {
    serde_json::to_string_pretty(layouts).context("Failed to serialize POI layout")
}
