use crate::app::{App, Message, Model, ToastLevel};
use crate::watcher::FileWatcher;

impl App {
    /// Start watching, or degrade to watch-disabled with a toast.
    pub(super) fn start_watching(model: &mut Model) -> Option<FileWatcher> {
        match FileWatcher::new(&model.file_path, model.watch_settle) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                model.watch_enabled = false;
                model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                tracing::warn!(path = %model.file_path.display(), %err, "file watcher unavailable");
                None
            }
        }
    }

    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_watcher: &mut Option<FileWatcher>,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleWatch => {
                if model.watch_enabled {
                    *file_watcher = Self::start_watching(model);
                    if file_watcher.is_some() {
                        model.show_toast(ToastLevel::Info, "Watching file changes");
                    }
                } else {
                    *file_watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                }
            }
            Message::ForceReload | Message::FileChanged => {
                if let Err(err) = model.reload_from_disk() {
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                    tracing::warn!(path = %model.file_path.display(), %err, "reload failed");
                } else if matches!(msg, Message::ForceReload) {
                    model.show_toast(ToastLevel::Info, "Reloaded");
                }
            }
            _ => {}
        }
    }
}
