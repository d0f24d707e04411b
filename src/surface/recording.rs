//! Headless surface that records every call the registry makes.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::{HandleId, StyleProp, UiSurface, fit_label};

const DEFAULT_HANDLE_WIDTH: f64 = 120.0;

/// A call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Create(HandleId),
    SetStyle(HandleId, StyleProp, f64),
    Animate(HandleId, StyleProp, f64, Duration),
    Stop(HandleId),
}

/// State of one handle on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedHandle {
    pub anchor_id: String,
    pub title: String,
    pub href: String,
    pub class: String,
    pub width: f64,
    pub top: f64,
    pub right: f64,
}

/// Surface without a renderer.
///
/// Animations complete instantly; every call is appended to a log so tests can
/// count transitions. Also used to compute layouts for `--dump`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    document_height: f64,
    viewport_height: f64,
    scroll_top: f64,
    handle_width: f64,
    char_width: Option<f64>,
    max_label_cols: Option<usize>,
    anchors: HashMap<String, f64>,
    handles: Vec<RecordedHandle>,
    calls: Vec<RecordedCall>,
}

impl RecordingSurface {
    pub fn new(document_height: f64, viewport_height: f64) -> Self {
        Self {
            document_height,
            viewport_height,
            handle_width: DEFAULT_HANDLE_WIDTH,
            ..Self::default()
        }
    }

    /// Add an element with `id` at absolute `top`.
    #[must_use]
    pub fn with_anchor(mut self, id: &str, top: f64) -> Self {
        self.anchors.insert(id.to_string(), top);
        self
    }

    /// Size handles from their titles: one `px` per column plus a column of
    /// padding on each side.
    #[must_use]
    pub const fn with_char_width(mut self, px: f64) -> Self {
        self.char_width = Some(px);
        self
    }

    /// Size handles as if titles were cut to `cols` columns, like a host
    /// that truncates long labels.
    #[must_use]
    pub const fn with_max_label_cols(mut self, cols: usize) -> Self {
        self.max_label_cols = Some(cols);
        self
    }

    /// Width reported for every handle created afterwards.
    #[must_use]
    pub const fn with_handle_width(mut self, width: f64) -> Self {
        self.handle_width = width;
        self
    }

    pub const fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top;
    }

    pub const fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
    }

    pub const fn set_document_height(&mut self, height: f64) {
        self.document_height = height;
    }

    /// Move an existing element (or add a new one).
    pub fn move_anchor(&mut self, id: &str, top: f64) {
        self.anchors.insert(id.to_string(), top);
    }

    pub fn handles(&self) -> &[RecordedHandle] {
        &self.handles
    }

    pub fn handle(&self, handle: HandleId) -> Option<&RecordedHandle> {
        self.handles.get(handle.0)
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of animations started on `handle` since the log was last cleared.
    pub fn animation_count(&self, handle: HandleId) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, RecordedCall::Animate(h, ..) if *h == handle))
            .count()
    }

    fn apply(&mut self, handle: HandleId, prop: StyleProp, px: f64) {
        if let Some(h) = self.handles.get_mut(handle.0) {
            match prop {
                StyleProp::Top => h.top = px,
                StyleProp::Right => h.right = px,
            }
        }
    }
}

impl UiSurface for RecordingSurface {
    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn anchor_top(&self, anchor_id: &str) -> Option<f64> {
        self.anchors.get(anchor_id).copied()
    }

    fn create_handle(&mut self, anchor_id: &str, title: &str, href: &str, class: &str) -> HandleId {
        let id = HandleId(self.handles.len());
        self.handles.push(RecordedHandle {
            anchor_id: anchor_id.to_string(),
            title: title.to_string(),
            href: href.to_string(),
            class: class.to_string(),
            width: self.char_width.map_or(self.handle_width, |px| {
                let label_cols = self
                    .max_label_cols
                    .map_or_else(|| title.width(), |max| fit_label(title, max).width());
                #[allow(clippy::cast_precision_loss)]
                let cols = (label_cols + 2) as f64;
                cols * px
            }),
            top: 0.0,
            right: 0.0,
        });
        self.calls.push(RecordedCall::Create(id));
        id
    }

    fn handle_width(&self, handle: HandleId) -> f64 {
        self.handles.get(handle.0).map_or(0.0, |h| h.width)
    }

    fn set_style(&mut self, handle: HandleId, prop: StyleProp, px: f64) {
        self.calls.push(RecordedCall::SetStyle(handle, prop, px));
        self.apply(handle, prop, px);
    }

    fn animate(&mut self, handle: HandleId, prop: StyleProp, target: f64, duration: Duration) {
        self.calls
            .push(RecordedCall::Animate(handle, prop, target, duration));
        self.apply(handle, prop, target);
    }

    fn stop_animations(&mut self, handle: HandleId) {
        self.calls.push(RecordedCall::Stop(handle));
    }
}
