use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::watcher::FileWatcher;

/// Frame interval while a handle is sliding.
const ANIMATION_FRAME_MS: u64 = 16;
/// Poll interval when nothing is pending.
const IDLE_POLL_MS: u64 = 250;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// How long to wait for input before the next timer, animation frame or
/// debounced resize or file change is due.
pub(super) fn poll_timeout(
    now_ms: u64,
    next_deadline: Option<u64>,
    animating: bool,
    debouncing: bool,
) -> Duration {
    let mut wait = IDLE_POLL_MS;
    if animating {
        wait = wait.min(ANIMATION_FRAME_MS);
    }
    if debouncing {
        wait = wait.min(10);
    }
    if let Some(deadline) = next_deadline {
        wait = wait.min(deadline.saturating_sub(now_ms));
    }
    Duration::from_millis(wait)
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization, document parsing,
    /// or the event loop encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - sidelegend requires an interactive terminal")?;
        let size = terminal.size()?;

        let layout_width = crate::ui::document_content_width(size.width);
        let document = match crate::document::load(&self.file_path, layout_width) {
            Ok(document) => document,
            Err(err) => {
                ratatui::restore();
                return Err(err);
            }
        };
        tracing::debug!(
            width = size.width,
            height = size.height,
            layout_width,
            lines = document.line_count(),
            "document loaded"
        );

        let mut model = Model::new(
            self.file_path.clone(),
            document,
            (size.width, size.height),
            self.poi_config.clone(),
        );
        model.watch_enabled = self.watch_enabled;
        model.watch_settle = self.watch_settle;

        let result = Self::event_loop(&mut terminal, &mut model);

        // Restore terminal
        let _ = set_mouse_motion_tracking(false);
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let elapsed_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut file_watcher = if model.watch_enabled {
            Self::start_watching(model)
        } else {
            None
        };
        let mut needs_render = true;

        execute!(stdout(), EnableMouseCapture)?;
        set_mouse_motion_tracking(true)?;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = elapsed_ms();

            // Timers and animations share one clock.
            let due = model.timer.next_deadline().is_some_and(|d| d <= now_ms)
                || model.surface.is_animating();
            *model = update(std::mem::take(model), Message::Tick(now_ms));
            needs_render |= due;

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::debug!(width, height, "resize applied");
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            if model.watch_enabled
                && let Some(msg) = file_watcher.as_mut().and_then(FileWatcher::poll)
            {
                *model = update(std::mem::take(model), msg.clone());
                Self::handle_message_side_effects(model, &mut file_watcher, &msg);
                needs_render = true;
            }

            if needs_render {
                terminal.draw(|frame| Self::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }

            let poll = poll_timeout(
                now_ms,
                model.timer.next_deadline(),
                model.surface.is_animating(),
                resize_debouncer.is_pending()
                    || file_watcher.as_ref().is_some_and(FileWatcher::is_settling),
            );
            if event::poll(poll)? {
                // Coalesce key repeat bursts into a single render.
                loop {
                    let event_ms = elapsed_ms();
                    let msg =
                        Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        tracing::trace!(?msg, "message");
                        // Delays and animations start from the event's time, not the last frame.
                        *model = update(std::mem::take(model), Message::Tick(event_ms));
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        Self::handle_message_side_effects(model, &mut file_watcher, &side_msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

fn set_mouse_motion_tracking(enable: bool) -> std::io::Result<()> {
    // Request any-event mouse motion reporting (1003) with SGR encoding (1006)
    // so hovering a handle is seen without a button held.
    let mut out = stdout();
    if enable {
        out.write_all(b"\x1b[?1003h\x1b[?1006h")?;
    } else {
        out.write_all(b"\x1b[?1003l\x1b[?1006l")?;
    }
    out.flush()
}
