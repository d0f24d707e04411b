//! Live reload of the viewed file.
//!
//! notify delivers events on its own thread. [`FileWatcher::poll`] drains them
//! on the event loop and, once the file has been quiet for the settle
//! interval, turns the burst into a single [`Message::FileChanged`]. Bursts
//! that leave the file's size and modification time as they were (an editor
//! touching the file, a save without edits) produce nothing, so the registry
//! is not rebuilt for them.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant, SystemTime};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::app::Message;

/// Quiet time after the last event before a reload is requested.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(200);

/// Size and modification time of the watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn read(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// The viewed file and the directory notify listens on for it.
///
/// Editors often save by writing a temp file and renaming it over the
/// original, so the directory is watched rather than the file itself.
#[derive(Debug, Clone)]
struct WatchTarget {
    file: PathBuf,
    dir: PathBuf,
}

impl WatchTarget {
    fn new(path: &Path) -> Self {
        // Event paths from the OS are canonical.
        let file = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self { file, dir }
    }

    /// Some backends only report the directory, others report the temp
    /// file's final name.
    fn is_touched_by(&self, event: &Event) -> bool {
        let name = self.file.file_name();
        event.paths.iter().any(|path| {
            path == &self.dir
                || path == &self.file
                || (name.is_some() && path.file_name() == name)
        })
    }
}

/// Watches the viewed file and yields reload messages.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    target: WatchTarget,
    settle: Duration,
    touched_at: Option<Instant>,
    stamp: Option<FileStamp>,
}

impl FileWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if notify cannot watch the file's directory.
    pub fn new(path: &Path, settle: Duration) -> notify::Result<Self> {
        let target = WatchTarget::new(path);
        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&target.dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %target.file.display(), ?settle, "watching");

        Ok(Self {
            _watcher: watcher,
            events,
            stamp: FileStamp::read(&target.file),
            target,
            settle,
            touched_at: None,
        })
    }

    /// Message for the event loop once a change has settled.
    pub fn poll(&mut self) -> Option<Message> {
        self.poll_at(Instant::now())
    }

    /// Whether events arrived that have not settled yet.
    pub const fn is_settling(&self) -> bool {
        self.touched_at.is_some()
    }

    fn poll_at(&mut self, now: Instant) -> Option<Message> {
        self.drain(now);
        let touched_at = self.touched_at?;
        if now.saturating_duration_since(touched_at) < self.settle {
            return None;
        }
        self.touched_at = None;

        let stamp = FileStamp::read(&self.target.file);
        if stamp.is_some() && stamp == self.stamp {
            tracing::trace!(path = %self.target.file.display(), "touched without changes");
            return None;
        }
        self.stamp = stamp;
        Some(Message::FileChanged)
    }

    fn drain(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Ok(ev) if self.target.is_touched_by(&ev) => {
                    tracing::trace!(kind = ?ev.kind, "file touched");
                    self.touched_at = Some(now);
                }
                Ok(_) => {}
                Err(err) => tracing::debug!(%err, dir = %self.target.dir.display(), "watch error"),
            }
        }
    }
}
