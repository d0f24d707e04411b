use std::collections::HashSet;
use std::time::Duration;

use crate::surface::{HandleId, HeadingAnchor, StyleProp, Timer, TimerHandle, TimerTask, UiSurface};

use super::error::PoiError;
use super::options::{PoiConfig, PoiOptions};

/// Glyphs documentation generators append to headings as permalink markers.
const DECORATION_GLYPHS: &[char] = &['\u{00b6}', '\u{00a7}', '\u{1f517}'];

/// Events a host forwards to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoiEvent {
    /// Viewport size changed
    Resize,
    /// Document content height changed
    ContentResized,
    /// Scroll position changed
    Scroll,
    /// Pointer moved onto a handle
    PointerEnter(HandleId),
    /// Pointer moved off a handle
    PointerLeave(HandleId),
    /// A timer scheduled by the registry expired
    TimerFired(TimerHandle, TimerTask),
}

/// Visible state of a single POI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiState {
    Hidden,
    Visible,
    Pinned,
}

/// A navigable point of interest bound to one heading.
#[derive(Debug, Clone)]
pub struct Poi {
    anchor_id: String,
    title: String,
    href: String,
    handle: HandleId,
    anchor_top: f64,
    top_offset: i64,
    visible: bool,
    pinned: bool,
    peak_pixels: f64,
    delay: Duration,
    animation: Duration,
}

impl Poi {
    fn new<S: UiSurface + ?Sized>(
        anchor: &HeadingAnchor,
        title: Option<&str>,
        options: &PoiOptions,
        config: &PoiConfig,
        surface: &mut S,
    ) -> Result<Self, PoiError> {
        let anchor_id = anchor
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(PoiError::MissingAnchorId)?
            .to_string();
        let anchor_top = surface
            .anchor_top(&anchor_id)
            .ok_or_else(|| PoiError::UnresolvedAnchor(anchor_id.clone()))?;
        let title = title.map_or_else(|| strip_decoration(&anchor.text), ToOwned::to_owned);
        let href = format!("#{anchor_id}");
        let resolved = options.resolve(config);
        let handle = surface.create_handle(&anchor_id, &title, &href, &resolved.css_class);

        let mut poi = Self {
            anchor_id,
            title,
            href,
            handle,
            anchor_top,
            top_offset: 0,
            visible: false,
            pinned: false,
            peak_pixels: resolved.peak_pixels,
            delay: resolved.delay,
            animation: resolved.animation,
        };
        poi.refresh(surface);
        let rest = poi.rest_offset(surface);
        surface.set_style(handle, StyleProp::Right, rest);
        Ok(poi)
    }

    pub fn anchor_id(&self) -> &str {
        &self.anchor_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub const fn handle(&self) -> HandleId {
        self.handle
    }

    /// Absolute top of the anchor as of the last refresh.
    pub const fn anchor_top(&self) -> f64 {
        self.anchor_top
    }

    pub const fn top_offset(&self) -> i64 {
        self.top_offset
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub const fn peak_pixels(&self) -> f64 {
        self.peak_pixels
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    pub const fn state(&self) -> PoiState {
        match (self.visible, self.pinned) {
            (_, true) => PoiState::Pinned,
            (true, false) => PoiState::Visible,
            (false, false) => PoiState::Hidden,
        }
    }

    /// Map the anchor's position in the document onto the viewport.
    pub fn refresh<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(top) = surface.anchor_top(&self.anchor_id) {
            self.anchor_top = top;
        }
        self.top_offset = minimap_offset(
            surface.viewport_height(),
            self.anchor_top,
            surface.document_height(),
        );
        tracing::trace!(
            anchor = %self.anchor_id,
            anchor_top = self.anchor_top,
            top_offset = self.top_offset,
            "poi refreshed"
        );
        #[allow(clippy::cast_precision_loss)]
        surface.set_style(self.handle, StyleProp::Top, self.top_offset as f64);
    }

    /// Slide the handle fully on screen.
    pub fn show<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.visible {
            return;
        }
        surface.animate(self.handle, StyleProp::Right, 0.0, self.animation);
        self.visible = true;
    }

    /// Slide the handle back to its peek position unless it is pinned.
    pub fn hide<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.pinned || !self.visible {
            return;
        }
        surface.stop_animations(self.handle);
        let rest = self.rest_offset(surface);
        surface.animate(self.handle, StyleProp::Right, rest, self.animation);
        self.visible = false;
    }

    fn pin<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        self.show(surface);
        self.pinned = true;
    }

    fn unpin(&mut self) {
        self.pinned = false;
    }

    fn rest_offset<S: UiSurface + ?Sized>(&self, surface: &S) -> f64 {
        -(surface.handle_width(self.handle) - self.peak_pixels).max(0.0)
    }
}

/// `round(viewport_height * anchor_top / document_height)`, or 0 for an empty document.
pub fn minimap_offset(viewport_height: f64, anchor_top: f64, document_height: f64) -> i64 {
    if document_height <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    {
        (viewport_height * anchor_top / document_height).round() as i64
    }
}

/// Drop trailing permalink glyphs and surrounding whitespace from heading text.
pub fn strip_decoration(text: &str) -> String {
    text.trim_end_matches(|c: char| c.is_whitespace() || DECORATION_GLYPHS.contains(&c))
        .trim()
        .to_string()
}

/// Every POI on a page, in document order.
///
/// Owns the shared pending-hide timer handle. Built once per document and
/// never reordered; POIs are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    config: PoiConfig,
    pois: Vec<Poi>,
    ids: HashSet<String>,
    pending_hide: Option<TimerHandle>,
}

impl Registry {
    pub fn new(config: PoiConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub const fn config(&self) -> &PoiConfig {
        &self.config
    }

    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    pub fn get(&self, anchor_id: &str) -> Option<&Poi> {
        self.pois.iter().find(|p| p.anchor_id == anchor_id)
    }

    pub fn by_handle(&self, handle: HandleId) -> Option<&Poi> {
        self.pois.iter().find(|p| p.handle == handle)
    }

    /// The POI currently pinned by [`Self::whereami`].
    pub fn pinned(&self) -> Option<&Poi> {
        self.pois.iter().find(|p| p.pinned)
    }

    /// Timer of the group hide waiting to run, if any.
    pub const fn pending_hide(&self) -> Option<TimerHandle> {
        self.pending_hide
    }

    /// Create a POI for `anchor` and append it.
    ///
    /// # Errors
    ///
    /// Fails if the anchor has no id, the id is already registered, or the
    /// surface cannot locate it.
    pub fn register<S: UiSurface + ?Sized>(
        &mut self,
        anchor: &HeadingAnchor,
        title: Option<&str>,
        options: &PoiOptions,
        surface: &mut S,
    ) -> Result<&Poi, PoiError> {
        if let Some(id) = anchor.id.as_deref().map(str::trim)
            && self.ids.contains(id)
        {
            return Err(PoiError::DuplicateAnchorId(id.to_string()));
        }
        let poi = Poi::new(anchor, title, options, &self.config, surface)?;
        self.ids.insert(poi.anchor_id.clone());
        self.pois.push(poi);
        Ok(&self.pois[self.pois.len() - 1])
    }

    /// Register every heading up to the configured depth, skipping the ones
    /// that cannot become POIs, then pin the section under the viewport.
    ///
    /// Returns the number of POIs created.
    pub fn scan<S: UiSurface + ?Sized>(&mut self, anchors: &[HeadingAnchor], surface: &mut S) -> usize {
        let before = self.pois.len();
        let max_level = self.config.max_level;
        let mut considered = 0_usize;
        for anchor in anchors.iter().filter(|a| a.level <= max_level) {
            considered += 1;
            if let Err(err) = self.register(anchor, None, &PoiOptions::default(), surface) {
                tracing::debug!(heading = %anchor.text, %err, "skipping heading");
            }
        }
        let created = self.pois.len() - before;
        tracing::debug!(created, skipped = considered - created, "scan complete");
        self.whereami(surface);
        created
    }

    pub fn refresh_all<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        for poi in &mut self.pois {
            poi.refresh(surface);
        }
    }

    pub fn show_all<S: UiSurface + ?Sized, T: Timer + ?Sized>(&mut self, surface: &mut S, timer: &mut T) {
        self.cancel_pending(timer);
        for poi in &mut self.pois {
            poi.show(surface);
        }
    }

    /// Hide every unpinned POI, now or after `delay`.
    ///
    /// A new request always supersedes a pending one.
    pub fn hide_all<S: UiSurface + ?Sized, T: Timer + ?Sized>(
        &mut self,
        delay: Option<Duration>,
        surface: &mut S,
        timer: &mut T,
    ) {
        self.cancel_pending(timer);
        if let Some(delay) = delay {
            let handle = timer.schedule_once(delay, TimerTask::HideAll);
            tracing::debug!(timer = handle.0, ?delay, "group hide scheduled");
            self.pending_hide = Some(handle);
            return;
        }
        for poi in &mut self.pois {
            poi.hide(surface);
        }
    }

    /// Pin the POI whose section holds the middle of the viewport.
    ///
    /// That is the last POI (in document order) whose anchor starts at or
    /// above the midpoint. Every other POI is unpinned and hidden.
    pub fn whereami<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        let midpoint = surface.scroll_top() + surface.viewport_height() / 2.0;
        let current = self
            .pois
            .iter()
            .enumerate()
            .filter(|(_, poi)| surface.anchor_top(&poi.anchor_id).unwrap_or(poi.anchor_top) <= midpoint)
            .map(|(idx, _)| idx)
            .last();

        let previous = self.pois.iter().position(|p| p.pinned);
        for (idx, poi) in self.pois.iter_mut().enumerate() {
            if Some(idx) == current {
                continue;
            }
            poi.unpin();
            poi.hide(surface);
        }
        if let Some(idx) = current {
            self.pois[idx].pin(surface);
        }
        if previous != current {
            tracing::debug!(
                from = previous.map(|i| self.pois[i].anchor_id.as_str()),
                to = current.map(|i| self.pois[i].anchor_id.as_str()),
                midpoint,
                "pinned section changed"
            );
        }
    }

    /// Route a host event to the matching registry operation.
    pub fn handle_event<S: UiSurface + ?Sized, T: Timer + ?Sized>(
        &mut self,
        event: PoiEvent,
        surface: &mut S,
        timer: &mut T,
    ) {
        match event {
            PoiEvent::Resize | PoiEvent::ContentResized => self.refresh_all(surface),
            PoiEvent::Scroll => self.whereami(surface),
            PoiEvent::PointerEnter(_) => self.show_all(surface, timer),
            PoiEvent::PointerLeave(handle) => {
                let delay = self
                    .by_handle(handle)
                    .map_or(Duration::from_millis(self.config.delay_millis), Poi::delay);
                self.hide_all(Some(delay), surface, timer);
            }
            PoiEvent::TimerFired(handle, TimerTask::HideAll) => {
                if self.pending_hide != Some(handle) {
                    tracing::trace!(timer = handle.0, "ignoring stale timer");
                    return;
                }
                self.pending_hide = None;
                self.hide_all(None, surface, timer);
            }
        }
    }

    fn cancel_pending<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        if let Some(handle) = self.pending_hide.take() {
            tracing::debug!(timer = handle.0, "group hide cancelled");
            timer.cancel(handle);
        }
    }
}
