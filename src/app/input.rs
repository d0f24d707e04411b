use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;

use crate::app::{App, Message, Model};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match *event {
            Event::Key(key) => Self::handle_key(key, model),
            Event::Mouse(mouse) => Self::handle_mouse(mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(w, h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let viewport = model.viewport();
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                Some(Message::MouseMoved(mouse.column, mouse.row))
            }
            MouseEventKind::Up(MouseButton::Left) => {
                crate::ui::handle_at(model, mouse.column, mouse.row)
                    .map(|_| Message::Click(mouse.column, mouse.row))
            }
            MouseEventKind::ScrollDown if viewport.can_scroll_down() => Some(Message::ScrollDown(3)),
            MouseEventKind::ScrollUp if viewport.can_scroll_up() => Some(Message::ScrollUp(3)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let can_scroll_down = model.viewport().can_scroll_down();
        let can_scroll_up = model.viewport().can_scroll_up();

        match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down if can_scroll_down => Some(Message::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up if can_scroll_up => Some(Message::ScrollUp(1)),
            KeyCode::Char(' ') | KeyCode::PageDown if can_scroll_down => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp if can_scroll_up => Some(Message::PageUp),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Message::Quit)
            }
            KeyCode::Char('d') if can_scroll_down => Some(Message::HalfPageDown),
            KeyCode::Char('u') if can_scroll_up => Some(Message::HalfPageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
            KeyCode::Char(']') => Some(Message::NextSection),
            KeyCode::Char('[') => Some(Message::PrevSection),

            // Handles
            KeyCode::Char('l') => Some(Message::PeekLegend),

            // File
            KeyCode::Char('w') => Some(Message::ToggleWatch),
            KeyCode::Char('r' | 'R') => Some(Message::ForceReload),

            // Quit
            KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}
