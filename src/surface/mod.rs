//! Host capabilities consumed by the POI registry.
//!
//! The registry never talks to a rendering toolkit directly. Everything it
//! needs from the host goes through two small traits:
//! - [`UiSurface`]: geometry queries and handle styling/animation
//! - [`Timer`]: one-shot cancellable timers
//!
//! Two surfaces ship with the crate: the terminal surface in
//! [`crate::ui::surface`] and the headless [`RecordingSurface`].

mod recording;
mod timer;

pub use recording::{RecordedCall, RecordingSurface};
pub use timer::{DeadlineTimer, Timer, TimerHandle, TimerTask};

use std::time::Duration;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Opaque id of a handle element created by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct HandleId(pub usize);

/// Style properties the registry positions handles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum StyleProp {
    /// Vertical offset from the top of the viewport
    Top,
    /// Horizontal offset from the right edge (negative = partly off-screen)
    Right,
}

/// A heading discovered in the host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnchor {
    /// Element id, if the heading has one
    pub id: Option<String>,
    /// Raw text content of the heading
    pub text: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Everything the registry needs from a rendering environment.
///
/// All geometry is in pixels. Surfaces that do not have pixels (a terminal)
/// are expected to convert from their native units.
pub trait UiSurface {
    /// Total height of the document content.
    fn document_height(&self) -> f64;

    /// Height of the visible viewport.
    fn viewport_height(&self) -> f64;

    /// Current vertical scroll position.
    fn scroll_top(&self) -> f64;

    /// Absolute top of the element with `anchor_id`, or `None` if no such element exists.
    fn anchor_top(&self, anchor_id: &str) -> Option<f64>;

    /// Create a floating handle element and return its id.
    fn create_handle(&mut self, anchor_id: &str, title: &str, href: &str, class: &str) -> HandleId;

    /// Rendered width of a handle.
    fn handle_width(&self, handle: HandleId) -> f64;

    /// Set a style property immediately.
    fn set_style(&mut self, handle: HandleId, prop: StyleProp, px: f64);

    /// Animate a style property towards `target` over `duration`.
    ///
    /// Fire-and-forget: the registry never waits for completion.
    fn animate(&mut self, handle: HandleId, prop: StyleProp, target: f64, duration: Duration);

    /// Stop every running animation on a handle, leaving it where it is.
    fn stop_animations(&mut self, handle: HandleId);
}

/// Fit `title` into `max_cols` display columns, ending with `…` when cut.
pub fn fit_label(title: &str, max_cols: usize) -> String {
    if title.width() <= max_cols {
        return title.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in title.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_cols {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_label_keeps_short_titles() {
        assert_eq!(fit_label("Usage", 32), "Usage");
    }

    #[test]
    fn test_fit_label_cuts_by_display_width() {
        assert_eq!(fit_label("abcdefgh", 5), "abcd…");
        // Wide characters never straddle the limit.
        assert_eq!(fit_label("概要概要概要", 6), "概要…");
    }
}
