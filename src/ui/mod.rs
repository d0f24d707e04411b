//! Terminal UI.
//!
//! This module contains:
//! - [`surface`]: the terminal implementation of [`crate::surface::UiSurface`]
//! - [`viewport`]: scroll position management
//! - [`style`]: colors for document lines and handles

pub mod style;
pub mod surface;
pub mod viewport;

mod render;
mod status;

pub use render::{document_area, handle_at, render};
pub use surface::TerminalSurface;

use crate::document::Document;
use crate::surface::RecordingSurface;

pub const DOCUMENT_LEFT_PADDING: u16 = 2;
/// Columns kept free on the right so resting handles do not cover text.
pub const HANDLE_GUTTER: u16 = 3;

/// Wrap width of the document for a terminal `total_width` columns wide.
pub const fn document_content_width(total_width: u16) -> u16 {
    let width = total_width.saturating_sub(DOCUMENT_LEFT_PADDING + HANDLE_GUTTER);
    if width == 0 { 1 } else { width }
}

/// Headless surface with the geometry a terminal of `height` rows would have.
///
/// Used by `--dump` to lay out handles without opening a terminal.
pub fn headless_surface(document: &Document, height: u16) -> RecordingSurface {
    let rows = usize::from(height.saturating_sub(1));
    #[allow(clippy::cast_precision_loss)]
    let to_px = |lines: usize| lines as f64 * surface::CELL_HEIGHT_PX;
    let mut headless = RecordingSurface::new(
        to_px(document.line_count().max(rows)),
        to_px(rows),
    )
    .with_char_width(surface::CELL_WIDTH_PX)
    .with_max_label_cols(surface::MAX_TITLE_COLS);
    for heading in document.headings() {
        if let Some(id) = &heading.id {
            headless.move_anchor(id, to_px(heading.line));
        }
    }
    headless
}
