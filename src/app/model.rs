use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::document::Document;
use crate::poi::{PoiConfig, PoiEvent, Registry};
use crate::surface::{DeadlineTimer, HandleId};
use crate::ui::TerminalSurface;
use crate::ui::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state. The registry, the
/// surface it draws on and the timer it schedules with are owned side by
/// side so a single `&mut Model` can lend all three at once.
#[derive(Default)]
pub struct Model {
    /// Path to the source file
    pub file_path: PathBuf,
    /// Laid-out document, viewport and handles
    pub surface: TerminalSurface,
    /// Points of interest for the current document
    pub registry: Registry,
    /// Timer backing the registry's delayed hides
    pub timer: DeadlineTimer,
    /// Handle currently under the mouse pointer
    pub hovered: Option<HandleId>,
    /// Whether file watching is enabled
    pub watch_enabled: bool,
    /// Quiet time after a file change before reloading
    pub watch_settle: Duration,
    /// Whether the app should quit
    pub should_quit: bool,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("pois", &self.registry.len())
            .field("hovered", &self.hovered)
            .field("watch_enabled", &self.watch_enabled)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model and scan `document` for points of interest.
    pub fn new(
        file_path: PathBuf,
        document: Document,
        terminal_size: (u16, u16),
        config: PoiConfig,
    ) -> Self {
        let mut surface =
            TerminalSurface::new(document, terminal_size.0, terminal_size.1.saturating_sub(1));
        let mut registry = Registry::new(config);
        let anchors = surface.document().anchors();
        registry.scan(&anchors, &mut surface);
        Self {
            file_path,
            surface,
            registry,
            watch_settle: crate::watcher::DEFAULT_SETTLE,
            ..Self::default()
        }
    }

    pub const fn viewport(&self) -> &Viewport {
        self.surface.viewport()
    }

    pub(super) fn dispatch(&mut self, event: PoiEvent) {
        self.registry
            .handle_event(event, &mut self.surface, &mut self.timer);
    }

    /// Apply a viewport change and tell the registry if the page actually moved.
    pub(super) fn scroll_with(&mut self, f: impl FnOnce(&mut Viewport)) {
        let before = self.surface.viewport().offset();
        f(self.surface.viewport_mut());
        if self.surface.viewport().offset() != before {
            self.dispatch(PoiEvent::Scroll);
        }
    }

    /// Lines of the headings that have a POI, in document order.
    pub(super) fn section_lines(&self) -> Vec<usize> {
        let document = self.surface.document();
        self.registry
            .pois()
            .iter()
            .filter_map(|poi| document.heading_by_id(poi.anchor_id()))
            .map(|heading| heading.line)
            .collect()
    }

    pub(super) fn resize(&mut self, width: u16, height: u16) {
        self.surface
            .viewport_mut()
            .resize(width, height.saturating_sub(1));
        self.reflow_layout();
        self.dispatch(PoiEvent::Resize);
        self.dispatch(PoiEvent::Scroll);
    }

    fn layout_width(&self) -> u16 {
        crate::ui::document_content_width(self.surface.viewport().width())
    }

    /// Re-wrap the current source for the current width. Heading ids do not change.
    fn reflow_layout(&mut self) {
        match Document::parse_with_layout(self.surface.document().source(), self.layout_width()) {
            Ok(document) => self.surface.set_document(document),
            Err(err) => tracing::warn!(%err, "relayout failed, keeping previous layout"),
        }
    }

    /// Re-read the file.
    ///
    /// If the set of headings is unchanged the registry keeps its POIs and
    /// only refreshes their positions. Otherwise the page is rebuilt with a
    /// fresh registry.
    pub(super) fn reload_from_disk(&mut self) -> Result<()> {
        let document = crate::document::load(&self.file_path, self.layout_width())?;
        let same_headings = heading_ids(&document) == heading_ids(self.surface.document());
        if same_headings {
            self.surface.set_document(document);
            self.dispatch(PoiEvent::ContentResized);
            self.dispatch(PoiEvent::Scroll);
            return Ok(());
        }

        tracing::debug!(path = %self.file_path.display(), "headings changed, rebuilding registry");
        if let Some(pending) = self.registry.pending_hide() {
            crate::surface::Timer::cancel(&mut self.timer, pending);
        }
        self.surface.replace_document(document);
        self.registry = Registry::new(self.registry.config().clone());
        self.hovered = None;
        let anchors = self.surface.document().anchors();
        self.registry.scan(&anchors, &mut self.surface);
        Ok(())
    }

    /// Track the pointer across handles, emitting enter/leave transitions.
    pub(super) fn hover(&mut self, handle: Option<HandleId>) {
        if handle == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.dispatch(PoiEvent::PointerLeave(old));
        }
        if let Some(new) = handle {
            self.dispatch(PoiEvent::PointerEnter(new));
        }
        self.hovered = handle;
    }

    /// Jump to the heading a handle links to.
    pub(super) fn follow_handle(&mut self, handle: HandleId) {
        let line = self
            .registry
            .by_handle(handle)
            .and_then(|poi| self.surface.document().heading_by_id(poi.anchor_id()))
            .map(|heading| heading.line);
        if let Some(line) = line {
            self.scroll_with(|vp| vp.go_to_line(line));
        }
    }

    /// Advance timers and animations. Returns true when a repaint is needed.
    pub(super) fn tick(&mut self, now_ms: u64) -> bool {
        let fired = self.timer.expire(now_ms);
        let any_fired = !fired.is_empty();
        for (handle, task) in fired {
            self.dispatch(PoiEvent::TimerFired(handle, task));
        }
        let animating = self.surface.tick(now_ms);
        any_fired || animating
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

fn heading_ids(document: &Document) -> Vec<Option<&str>> {
    document
        .headings()
        .iter()
        .map(|h| h.id.as_deref())
        .collect()
}
