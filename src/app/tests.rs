use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use tempfile::tempdir;

use crate::document::Document;
use crate::poi::PoiConfig;
use crate::surface::HandleId;

use super::event_loop::{ResizeDebouncer, poll_timeout};
use super::{App, Message, Model, ToastLevel, update};

fn sections_markdown(count: usize) -> String {
    let mut md = String::new();
    for i in 1..=count {
        md.push_str(&format!("## Heading {i}\n\nBody {i}\n\n"));
    }
    md
}

/// Twenty sections, five lines apart, in a window with seven document rows.
fn create_sections_model() -> Model {
    let doc = Document::parse(&sections_markdown(20)).unwrap();
    Model::new(PathBuf::from("test.md"), doc, (80, 8), PoiConfig::default())
}

fn pinned_id(model: &Model) -> Option<&str> {
    model.registry.pinned().map(|poi| poi.anchor_id())
}

fn visible_ids(model: &Model) -> Vec<&str> {
    model
        .registry
        .pois()
        .iter()
        .filter(|poi| poi.is_visible())
        .map(|poi| poi.anchor_id())
        .collect()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

#[test]
fn test_new_model_registers_every_section_and_pins_the_first() {
    let model = create_sections_model();
    assert_eq!(model.registry.len(), 20);
    assert_eq!(model.surface.handles().len(), 20);
    assert_eq!(pinned_id(&model), Some("heading-1"));
    assert_eq!(visible_ids(&model), vec!["heading-1"]);
}

#[test]
fn test_scroll_down_updates_viewport_and_pin() {
    let model = create_sections_model();
    let model = update(model, Message::ScrollDown(5));
    assert_eq!(model.viewport().offset(), 5);
    assert_eq!(pinned_id(&model), Some("heading-2"));
    assert_eq!(visible_ids(&model), vec!["heading-2"]);
}

#[test]
fn test_scroll_up_moves_pin_back() {
    let model = create_sections_model();
    let model = update(model, Message::ScrollDown(8));
    assert_eq!(pinned_id(&model), Some("heading-3"));
    let model = update(model, Message::ScrollUp(7));
    assert_eq!(model.viewport().offset(), 1);
    assert_eq!(pinned_id(&model), Some("heading-1"));
}

#[test]
fn test_go_to_bottom_pins_last_section() {
    let model = create_sections_model();
    let model = update(model, Message::GoToBottom);
    assert_eq!(pinned_id(&model), Some("heading-20"));
    let model = update(model, Message::GoToTop);
    assert_eq!(model.viewport().offset(), 0);
    assert_eq!(pinned_id(&model), Some("heading-1"));
}

#[test]
fn test_paging_keeps_exactly_one_pin() {
    let mut model = create_sections_model();
    for msg in [
        Message::PageDown,
        Message::HalfPageDown,
        Message::PageDown,
        Message::HalfPageUp,
        Message::PageUp,
    ] {
        model = update(model, msg);
        let pinned = model.registry.pois().iter().filter(|p| p.is_pinned()).count();
        assert_eq!(pinned, 1);
    }
}

#[test]
fn test_next_and_prev_section_jump_between_headings() {
    let model = create_sections_model();
    let model = update(model, Message::NextSection);
    assert_eq!(model.viewport().offset(), 5);
    assert_eq!(pinned_id(&model), Some("heading-2"));

    let model = update(model, Message::NextSection);
    assert_eq!(model.viewport().offset(), 10);

    let model = update(model, Message::PrevSection);
    assert_eq!(model.viewport().offset(), 5);
}

#[test]
fn test_prev_section_at_top_is_noop() {
    let model = create_sections_model();
    let model = update(model, Message::PrevSection);
    assert_eq!(model.viewport().offset(), 0);
}

#[test]
fn test_peek_legend_shows_all_then_hides_after_delay() {
    let model = create_sections_model();
    let model = update(model, Message::PeekLegend);
    assert_eq!(visible_ids(&model).len(), 20);
    assert!(model.registry.pending_hide().is_some());

    let model = update(model, Message::Tick(1_999));
    assert_eq!(visible_ids(&model).len(), 20);

    let model = update(model, Message::Tick(2_000));
    assert_eq!(visible_ids(&model), vec!["heading-1"]);
    assert!(model.registry.pending_hide().is_none());
}

#[test]
fn test_hover_shows_all_and_leave_hides_after_delay() {
    let model = create_sections_model();
    // Let the pinned handle finish sliding in.
    let model = update(model, Message::Tick(1_000));

    let model = update(model, Message::MouseMoved(70, 0));
    assert_eq!(model.hovered, Some(HandleId(0)));
    assert_eq!(visible_ids(&model).len(), 20);

    let model = update(model, Message::MouseMoved(10, 3));
    assert_eq!(model.hovered, None);
    assert!(model.registry.pending_hide().is_some());

    let model = update(model, Message::Tick(2_999));
    assert_eq!(visible_ids(&model).len(), 20);

    let model = update(model, Message::Tick(3_000));
    assert_eq!(visible_ids(&model), vec!["heading-1"]);
}

#[test]
fn test_moving_between_handles_cancels_pending_hide() {
    let model = create_sections_model();
    let model = update(model, Message::Tick(1_000));
    let model = update(model, Message::MouseMoved(70, 0));
    let model = update(model, Message::MouseMoved(79, 0));
    assert_eq!(model.hovered, Some(HandleId(1)));
    assert!(model.registry.pending_hide().is_none());

    let model = update(model, Message::Tick(10_000));
    assert_eq!(visible_ids(&model).len(), 20);
}

#[test]
fn test_moving_within_a_handle_sends_nothing() {
    let model = create_sections_model();
    let model = update(model, Message::Tick(1_000));
    let model = update(model, Message::MouseMoved(70, 0));
    let model = update(model, Message::MouseMoved(72, 0));
    assert_eq!(model.hovered, Some(HandleId(0)));
    assert!(model.registry.pending_hide().is_none());
}

#[test]
fn test_click_on_handle_jumps_to_its_heading() {
    let model = create_sections_model();
    let model = update(model, Message::Tick(1_000));
    let model = update(model, Message::Click(79, 0));
    assert_eq!(model.viewport().offset(), 5);
    assert_eq!(pinned_id(&model), Some("heading-2"));
}

#[test]
fn test_click_outside_handles_does_nothing() {
    let model = create_sections_model();
    let model = update(model, Message::Click(5, 5));
    assert_eq!(model.viewport().offset(), 0);
}

#[test]
fn test_tick_finishes_slide_in() {
    let model = create_sections_model();
    let pinned = HandleId(0);
    assert!(model.surface.is_animating());
    let model = update(model, Message::Tick(250));
    assert!(!model.surface.is_animating());
    assert_eq!(
        model
            .surface
            .style_value(pinned, crate::surface::StyleProp::Right),
        Some(0.0)
    );
}

#[test]
fn test_resize_relayouts_and_keeps_pois() {
    let model = create_sections_model();
    let model = update(model, Message::Resize(100, 20));
    assert_eq!(model.viewport().width(), 100);
    assert_eq!(model.viewport().height(), 19);
    assert_eq!(model.registry.len(), 20);
    assert_eq!(model.surface.handles().len(), 20);
    assert_eq!(pinned_id(&model), Some("heading-2"));
}

#[test]
fn test_resize_refreshes_minimap_offsets() {
    let model = create_sections_model();
    let before = model.registry.get("heading-20").unwrap().top_offset();
    let model = update(model, Message::Resize(80, 40));
    let after = model.registry.get("heading-20").unwrap().top_offset();
    assert!(after > before);
}

#[test]
fn test_toggle_watch_changes_state() {
    let model = create_sections_model();
    assert!(!model.watch_enabled);

    let model = update(model, Message::ToggleWatch);
    assert!(model.watch_enabled);

    let model = update(model, Message::ToggleWatch);
    assert!(!model.watch_enabled);
}

#[test]
fn test_toggle_watch_starts_watcher_with_model_settle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, sections_markdown(2)).unwrap();
    let doc = crate::document::load(&path, 75).unwrap();
    let mut model = Model::new(path, doc, (80, 8), PoiConfig::default());
    assert_eq!(model.watch_settle, crate::watcher::DEFAULT_SETTLE);
    model.watch_settle = Duration::from_millis(20);

    let mut model = update(model, Message::ToggleWatch);
    let mut watcher = None;
    App::handle_message_side_effects(&mut model, &mut watcher, &Message::ToggleWatch);
    assert!(watcher.is_some());
    assert_eq!(model.active_toast(), Some(("Watching file changes", ToastLevel::Info)));

    let mut model = update(model, Message::ToggleWatch);
    App::handle_message_side_effects(&mut model, &mut watcher, &Message::ToggleWatch);
    assert!(watcher.is_none());
}

#[test]
fn test_quit_sets_flag() {
    let model = create_sections_model();
    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_reload_with_same_headings_keeps_handles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, sections_markdown(3)).unwrap();
    let doc = crate::document::load(&path, 75).unwrap();
    let mut model = Model::new(path.clone(), doc, (80, 8), PoiConfig::default());
    let handle = model.registry.get("heading-2").unwrap().handle();

    std::fs::write(
        &path,
        "## Heading 1\n\nLonger body\n\nwith two paragraphs\n\n## Heading 2\n\nBody\n\n## Heading 3\n",
    )
    .unwrap();
    let mut watcher = None;
    App::handle_message_side_effects(&mut model, &mut watcher, &Message::FileChanged);

    assert_eq!(model.registry.len(), 3);
    assert_eq!(model.surface.handles().len(), 3);
    assert_eq!(model.registry.get("heading-2").unwrap().handle(), handle);
    assert_eq!(model.registry.get("heading-2").unwrap().anchor_top(), 7.0 * 16.0);
    assert!(model.active_toast().is_none());
}

#[test]
fn test_reload_with_new_headings_rebuilds_registry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, sections_markdown(2)).unwrap();
    let doc = crate::document::load(&path, 75).unwrap();
    let mut model = Model::new(path.clone(), doc, (80, 8), PoiConfig::default());
    assert_eq!(model.registry.len(), 2);

    std::fs::write(&path, sections_markdown(4)).unwrap();
    let mut watcher = None;
    App::handle_message_side_effects(&mut model, &mut watcher, &Message::ForceReload);

    assert_eq!(model.registry.len(), 4);
    assert_eq!(model.surface.handles().len(), 4);
    assert_eq!(pinned_id(&model), Some("heading-1"));
    assert_eq!(model.active_toast(), Some(("Reloaded", ToastLevel::Info)));
}

#[test]
fn test_reload_failure_keeps_document_and_shows_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, sections_markdown(2)).unwrap();
    let doc = crate::document::load(&path, 75).unwrap();
    let mut model = Model::new(path.clone(), doc, (80, 8), PoiConfig::default());

    std::fs::remove_file(&path).unwrap();
    let mut watcher = None;
    App::handle_message_side_effects(&mut model, &mut watcher, &Message::ForceReload);

    assert_eq!(model.registry.len(), 2);
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Reload failed"));
}

#[test]
fn test_toast_expires() {
    let mut model = create_sections_model();
    model.show_toast(ToastLevel::Warning, "careful");
    assert_eq!(model.active_toast(), Some(("careful", ToastLevel::Warning)));

    assert!(!model.expire_toast(Instant::now()));
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(5)));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_keys_map_to_messages() {
    let model = create_sections_model();
    let cases = [
        (KeyCode::Char('j'), Some(Message::ScrollDown(1))),
        (KeyCode::Down, Some(Message::ScrollDown(1))),
        (KeyCode::Char(' '), Some(Message::PageDown)),
        (KeyCode::Char('d'), Some(Message::HalfPageDown)),
        (KeyCode::Char('G'), Some(Message::GoToBottom)),
        (KeyCode::Char(']'), Some(Message::NextSection)),
        (KeyCode::Char('l'), Some(Message::PeekLegend)),
        (KeyCode::Char('w'), Some(Message::ToggleWatch)),
        (KeyCode::Char('r'), Some(Message::ForceReload)),
        (KeyCode::Char('q'), Some(Message::Quit)),
        (KeyCode::Esc, Some(Message::Quit)),
        (KeyCode::Char('x'), None),
    ];
    for (code, expected) in cases {
        assert_eq!(App::handle_key(key(code), &model), expected, "{code:?}");
    }
}

#[test]
fn test_scroll_up_keys_ignored_at_top() {
    let model = create_sections_model();
    assert_eq!(App::handle_key(key(KeyCode::Char('k')), &model), None);
    assert_eq!(App::handle_key(key(KeyCode::PageUp), &model), None);
    assert_eq!(App::handle_key(key(KeyCode::Char('u')), &model), None);
}

#[test]
fn test_ctrl_c_quits() {
    let model = create_sections_model();
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(App::handle_key(ctrl_c, &model), Some(Message::Quit));
}

#[test]
fn test_mouse_events_map_to_messages() {
    let model = create_sections_model();
    let model = update(model, Message::Tick(1_000));
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::Moved, 3, 4), &model),
        Some(Message::MouseMoved(3, 4))
    );
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::ScrollDown, 3, 4), &model),
        Some(Message::ScrollDown(3))
    );
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::ScrollUp, 3, 4), &model),
        None
    );
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 70, 0), &model),
        Some(Message::Click(70, 0))
    );
    assert_eq!(
        App::handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 3, 4), &model),
        None
    );
}

#[test]
fn test_resize_event_is_debounced() {
    let model = create_sections_model();
    let mut debouncer = ResizeDebouncer::new(100);
    let msg = App::handle_event(&Event::Resize(120, 40), &model, 0, &mut debouncer);
    assert_eq!(msg, None);
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(50), None);
    assert_eq!(debouncer.take_ready(100), Some((120, 40)));
    assert!(!debouncer.is_pending());
}

#[test]
fn test_resize_debouncer_keeps_latest_size() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(100, 30, 0);
    debouncer.queue(110, 35, 60);
    assert_eq!(debouncer.take_ready(120), None);
    assert_eq!(debouncer.take_ready(160), Some((110, 35)));
}

#[test]
fn test_poll_timeout_wakes_for_timer_deadline() {
    assert_eq!(poll_timeout(1_000, None, false, false), Duration::from_millis(250));
    assert_eq!(poll_timeout(1_000, Some(1_040), false, false), Duration::from_millis(40));
    assert_eq!(poll_timeout(1_000, Some(900), false, false), Duration::ZERO);
    assert_eq!(poll_timeout(1_000, None, true, false), Duration::from_millis(16));
    assert_eq!(poll_timeout(1_000, None, false, true), Duration::from_millis(10));
}

fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect()
}

#[test]
fn test_render_draws_pinned_handle_at_right_edge() {
    let doc = Document::parse_with_layout(&sections_markdown(3), 35).unwrap();
    let model = Model::new(PathBuf::from("test.md"), doc, (40, 8), PoiConfig::default());
    let model = update(model, Message::Tick(1_000));

    let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
    terminal
        .draw(|frame| crate::ui::render(&model, frame))
        .unwrap();

    let top = row_text(&terminal, 0);
    assert!(top.starts_with("  ## Heading 1"), "{top:?}");
    assert!(top.ends_with(" Heading 1 "), "{top:?}");
}

#[test]
fn test_render_status_bar_names_pinned_section() {
    let doc = Document::parse_with_layout(&sections_markdown(3), 35).unwrap();
    let model = Model::new(PathBuf::from("notes.md"), doc, (60, 8), PoiConfig::default());

    let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
    terminal
        .draw(|frame| crate::ui::render(&model, frame))
        .unwrap();

    let status = row_text(&terminal, 7);
    assert!(status.contains("notes.md"), "{status:?}");
    assert!(status.contains("§ Heading 1"), "{status:?}");
}

#[test]
fn test_render_shows_toast_instead_of_status() {
    let mut model = create_sections_model();
    model.show_toast(ToastLevel::Error, "Reload failed: gone");

    let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
    terminal
        .draw(|frame| crate::ui::render(&model, frame))
        .unwrap();

    let status = row_text(&terminal, 7);
    assert!(status.starts_with("[error] Reload failed: gone"), "{status:?}");
}
