//! One-shot cancellable timers.

use std::time::Duration;

/// Handle returned by [`Timer::schedule_once`], used to cancel or identify an expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Work a timer carries back to the registry when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Run the deferred group hide
    HideAll,
}

/// Cancellable one-shot timer capability.
///
/// Timers never call back into the registry. The host collects expirations
/// and dispatches them as [`crate::poi::PoiEvent::TimerFired`].
pub trait Timer {
    /// Schedule `task` to fire once after `delay`.
    fn schedule_once(&mut self, delay: Duration, task: TimerTask) -> TimerHandle;

    /// Cancel a scheduled timer. Cancelling an unknown or fired handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: TimerHandle,
    deadline_ms: u64,
    task: TimerTask,
}

/// Timer driven by an externally supplied millisecond clock.
///
/// The terminal event loop feeds it elapsed time; tests feed it whatever
/// they like.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use sidelegend::surface::{DeadlineTimer, Timer, TimerTask};
///
/// let mut timer = DeadlineTimer::new();
/// let handle = timer.schedule_once(Duration::from_millis(100), TimerTask::HideAll);
/// assert!(timer.expire(99).is_empty());
/// assert_eq!(timer.expire(100), vec![(handle, TimerTask::HideAll)]);
/// ```
#[derive(Debug, Default)]
pub struct DeadlineTimer {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.deadline_ms).min()
    }

    /// Number of timers still waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Move the clock to `now_ms` and return every expired entry in deadline order.
    ///
    /// The clock never moves backwards.
    pub fn expire(&mut self, now_ms: u64) -> Vec<(TimerHandle, TimerTask)> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;
        let mut fired: Vec<Entry> = Vec::new();
        self.entries.retain(|entry| {
            if entry.deadline_ms <= now {
                fired.push(*entry);
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|e| (e.deadline_ms, e.handle));
        fired.into_iter().map(|e| (e.handle, e.task)).collect()
    }
}

impl Timer for DeadlineTimer {
    fn schedule_once(&mut self, delay: Duration, task: TimerTask) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.entries.push(Entry {
            handle,
            deadline_ms: self.now_ms.saturating_add(delay_ms),
            task,
        });
        tracing::trace!(handle = handle.0, delay_ms, "timer scheduled");
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        if self.entries.len() != before {
            tracing::trace!(handle = handle.0, "timer cancelled");
        }
    }
}
