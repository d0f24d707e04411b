//! [`UiSurface`] over a terminal viewport.
//!
//! The registry thinks in pixels. Terminal cells are mapped to nominal pixels
//! ([`CELL_WIDTH_PX`] x [`CELL_HEIGHT_PX`]) so the pixel-valued defaults keep
//! roughly the proportions they were chosen for.

use std::time::Duration;

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use crate::document::Document;
use crate::surface::{HandleId, StyleProp, UiSurface, fit_label};

use super::viewport::Viewport;

pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Longest title drawn on a handle, in columns.
pub const MAX_TITLE_COLS: usize = 32;

#[derive(Debug, Clone, Copy)]
struct Animation {
    prop: StyleProp,
    from: f64,
    to: f64,
    start_ms: u64,
    duration_ms: u64,
}

impl Animation {
    #[allow(clippy::cast_precision_loss)]
    fn value_at(&self, now_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return self.to;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms).min(self.duration_ms);
        let t = elapsed as f64 / self.duration_ms as f64;
        (self.to - self.from).mul_add(t, self.from)
    }

    const fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }
}

/// A floating handle drawn at the right edge of the document pane.
#[derive(Debug, Clone)]
pub struct TerminalHandle {
    pub anchor_id: String,
    pub label: String,
    pub href: String,
    pub class: String,
    top: f64,
    right: f64,
    animations: Vec<Animation>,
}

impl TerminalHandle {
    /// Width in columns, including one column of padding on each side.
    pub fn width_cols(&self) -> u16 {
        u16::try_from(self.label.width() + 2).unwrap_or(u16::MAX)
    }

    fn value(&self, prop: StyleProp, now_ms: u64) -> f64 {
        self.animations
            .iter()
            .find(|a| a.prop == prop)
            .map_or_else(
                || match prop {
                    StyleProp::Top => self.top,
                    StyleProp::Right => self.right,
                },
                |a| a.value_at(now_ms),
            )
    }

    fn store(&mut self, prop: StyleProp, px: f64) {
        match prop {
            StyleProp::Top => self.top = px,
            StyleProp::Right => self.right = px,
        }
    }
}

/// Document, viewport and handles of the terminal pager.
#[derive(Debug, Clone, Default)]
pub struct TerminalSurface {
    document: Document,
    viewport: Viewport,
    handles: Vec<TerminalHandle>,
    now_ms: u64,
}

impl TerminalSurface {
    /// `height` is the number of rows available to the document.
    pub fn new(document: Document, width: u16, height: u16) -> Self {
        let viewport = Viewport::new(width, height, document.line_count());
        Self {
            document,
            viewport,
            handles: Vec::new(),
            now_ms: 0,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn handles(&self) -> &[TerminalHandle] {
        &self.handles
    }

    /// Swap in a relaid-out document, keeping handles.
    pub fn set_document(&mut self, document: Document) {
        self.viewport.set_total_lines(document.line_count());
        self.document = document;
    }

    /// Swap in an unrelated document: handles belong to the old one and are dropped.
    pub fn replace_document(&mut self, document: Document) {
        self.set_document(document);
        self.handles.clear();
    }

    /// Advance the animation clock. Returns true when the frame needs repainting.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;
        let mut changed = false;
        for handle in &mut self.handles {
            if handle.animations.is_empty() {
                continue;
            }
            changed = true;
            let (done, running): (Vec<Animation>, Vec<Animation>) =
                handle.animations.iter().partition(|a| a.is_done(now));
            for anim in done {
                handle.store(anim.prop, anim.to);
            }
            handle.animations = running;
        }
        changed
    }

    pub fn is_animating(&self) -> bool {
        self.handles.iter().any(|h| !h.animations.is_empty())
    }

    /// Current position of a style property, mid-animation included.
    pub fn style_value(&self, handle: HandleId, prop: StyleProp) -> Option<f64> {
        self.handles
            .get(handle.0)
            .map(|h| h.value(prop, self.now_ms))
    }

    /// Screen rectangle of the visible part of a handle inside `area`.
    pub fn handle_rect(&self, handle: HandleId, area: Rect) -> Option<Rect> {
        let h = self.handles.get(handle.0)?;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let width = i32::from(h.width_cols());
        let right_cols = px_to_cells(h.value(StyleProp::Right, self.now_ms), CELL_WIDTH_PX);
        let row = px_to_cells(h.value(StyleProp::Top, self.now_ms), CELL_HEIGHT_PX)
            .clamp(0, i32::from(area.height) - 1);

        let area_right = i32::from(area.x) + i32::from(area.width);
        let left = area_right - width - right_cols;
        let visible_left = left.max(i32::from(area.x));
        let visible_right = (left + width).min(area_right);
        if visible_right <= visible_left {
            return None;
        }
        Some(Rect {
            x: u16::try_from(visible_left).ok()?,
            y: area.y + u16::try_from(row).ok()?,
            width: u16::try_from(visible_right - visible_left).ok()?,
            height: 1,
        })
    }

    /// Topmost handle under a cell. Later handles are drawn over earlier ones.
    pub fn handle_at(&self, column: u16, row: u16, area: Rect) -> Option<HandleId> {
        (0..self.handles.len())
            .rev()
            .map(HandleId)
            .find(|&id| {
                self.handle_rect(id, area).is_some_and(|r| {
                    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
                })
            })
    }

    /// Columns of the handle's label visible in `rect`, left-aligned like a tab.
    pub fn visible_label(&self, handle: HandleId, rect: Rect) -> String {
        let Some(h) = self.handles.get(handle.0) else {
            return String::new();
        };
        let full = format!(" {} ", h.label);
        let mut out = String::new();
        let mut used = 0_usize;
        for ch in full.chars() {
            let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + w > usize::from(rect.width) {
                break;
            }
            out.push(ch);
            used += w;
        }
        out
    }
}

#[allow(clippy::cast_possible_truncation)]
fn px_to_cells(px: f64, cell: f64) -> i32 {
    (px / cell).round() as i32
}

#[allow(clippy::cast_precision_loss)]
fn lines_to_px(lines: usize) -> f64 {
    lines as f64 * CELL_HEIGHT_PX
}

impl UiSurface for TerminalSurface {
    fn document_height(&self) -> f64 {
        // A document shorter than the window still fills it.
        lines_to_px(
            self.document
                .line_count()
                .max(usize::from(self.viewport.height())),
        )
    }

    fn viewport_height(&self) -> f64 {
        lines_to_px(usize::from(self.viewport.height()))
    }

    fn scroll_top(&self) -> f64 {
        lines_to_px(self.viewport.offset())
    }

    fn anchor_top(&self, anchor_id: &str) -> Option<f64> {
        self.document
            .heading_by_id(anchor_id)
            .map(|h| lines_to_px(h.line))
    }

    fn create_handle(&mut self, anchor_id: &str, title: &str, href: &str, class: &str) -> HandleId {
        let id = HandleId(self.handles.len());
        self.handles.push(TerminalHandle {
            anchor_id: anchor_id.to_string(),
            label: fit_label(title, MAX_TITLE_COLS),
            href: href.to_string(),
            class: class.to_string(),
            top: 0.0,
            right: 0.0,
            animations: Vec::new(),
        });
        id
    }

    fn handle_width(&self, handle: HandleId) -> f64 {
        self.handles
            .get(handle.0)
            .map_or(0.0, |h| f64::from(h.width_cols()) * CELL_WIDTH_PX)
    }

    fn set_style(&mut self, handle: HandleId, prop: StyleProp, px: f64) {
        if let Some(h) = self.handles.get_mut(handle.0) {
            h.animations.retain(|a| a.prop != prop);
            h.store(prop, px);
        }
    }

    fn animate(&mut self, handle: HandleId, prop: StyleProp, target: f64, duration: Duration) {
        let now = self.now_ms;
        if let Some(h) = self.handles.get_mut(handle.0) {
            let from = h.value(prop, now);
            h.animations.retain(|a| a.prop != prop);
            h.store(prop, from);
            let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
            if duration_ms == 0 {
                h.store(prop, target);
                return;
            }
            h.animations.push(Animation {
                prop,
                from,
                to: target,
                start_ms: now,
                duration_ms,
            });
        }
    }

    fn stop_animations(&mut self, handle: HandleId) {
        let now = self.now_ms;
        if let Some(h) = self.handles.get_mut(handle.0) {
            for anim in std::mem::take(&mut h.animations) {
                h.store(anim.prop, anim.value_at(now));
            }
        }
    }
}
