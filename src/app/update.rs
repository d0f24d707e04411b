use std::time::Duration;

use crate::app::Model;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Scroll up by n lines
    ScrollUp(usize),
    /// Scroll down by n lines
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Scroll up half page
    HalfPageUp,
    /// Scroll down half page
    HalfPageDown,
    /// Go to beginning of document
    GoToTop,
    /// Go to end of document
    GoToBottom,
    /// Jump to the next heading that has a handle
    NextSection,
    /// Jump to the previous heading that has a handle
    PrevSection,

    // Handles
    /// Slide every handle out, then schedule the group hide
    PeekLegend,
    /// Mouse moved to (column, row)
    MouseMoved(u16, u16),
    /// Mouse clicked at (column, row)
    Click(u16, u16),
    /// Clock advanced to the given milliseconds since start
    Tick(u64),

    // File watching
    /// Toggle file watching
    ToggleWatch,
    /// File changed externally, reload
    FileChanged,
    /// Force reload file
    ForceReload,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// Disk and watcher side effects are left to `effects`.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Navigation
        Message::ScrollUp(n) => model.scroll_with(|vp| vp.scroll_up(n)),
        Message::ScrollDown(n) => model.scroll_with(|vp| vp.scroll_down(n)),
        Message::PageUp => model.scroll_with(|vp| vp.page_up()),
        Message::PageDown => model.scroll_with(|vp| vp.page_down()),
        Message::HalfPageUp => model.scroll_with(|vp| vp.half_page_up()),
        Message::HalfPageDown => model.scroll_with(|vp| vp.half_page_down()),
        Message::GoToTop => model.scroll_with(|vp| vp.go_to_top()),
        Message::GoToBottom => model.scroll_with(|vp| vp.go_to_bottom()),
        Message::NextSection => {
            let offset = model.viewport().offset();
            if let Some(line) = model.section_lines().into_iter().find(|&l| l > offset) {
                model.scroll_with(|vp| vp.go_to_line(line));
            }
        }
        Message::PrevSection => {
            let offset = model.viewport().offset();
            if let Some(line) = model.section_lines().into_iter().rfind(|&l| l < offset) {
                model.scroll_with(|vp| vp.go_to_line(line));
            }
        }

        // Handles
        Message::PeekLegend => {
            let delay = Duration::from_millis(model.registry.config().delay_millis);
            model
                .registry
                .show_all(&mut model.surface, &mut model.timer);
            model
                .registry
                .hide_all(Some(delay), &mut model.surface, &mut model.timer);
        }
        Message::MouseMoved(column, row) => {
            let handle = crate::ui::handle_at(&model, column, row);
            model.hover(handle);
        }
        Message::Click(column, row) => {
            if let Some(handle) = crate::ui::handle_at(&model, column, row) {
                model.follow_handle(handle);
            }
        }
        Message::Tick(now_ms) => {
            model.tick(now_ms);
        }

        // File watching
        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        // FileChanged/ForceReload: handled in effects (disk I/O)
        // Redraw: no state change needed
        Message::FileChanged | Message::ForceReload | Message::Redraw => {}

        // Window
        Message::Resize(width, height) => model.resize(width, height),

        // Application
        Message::Quit => {
            model.should_quit = true;
        }
    }
    model
}
