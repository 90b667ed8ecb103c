use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use mandelset_render::{Purpose, PROGRESS_IDLE};

/// Status text shown when no error is pending.
pub const DEFAULT_STATUS: &str = "Ready";

/// Latest progress per render purpose. `-1` means idle.
#[derive(Debug)]
pub struct ProgressBoard {
    preview: AtomicI32,
    save: AtomicI32,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self {
            preview: AtomicI32::new(PROGRESS_IDLE),
            save: AtomicI32::new(PROGRESS_IDLE),
        }
    }

    fn slot(&self, purpose: Purpose) -> &AtomicI32 {
        match purpose {
            Purpose::Preview => &self.preview,
            Purpose::Save => &self.save,
        }
    }

    pub fn update(&self, percent: i32, purpose: Purpose) {
        self.slot(purpose).store(percent, Ordering::Relaxed);
    }

    pub fn get(&self, purpose: Purpose) -> i32 {
        self.slot(purpose).load(Ordering::Relaxed)
    }

    /// `true` while a render of `purpose` is reporting progress.
    pub fn is_active(&self, purpose: Purpose) -> bool {
        self.get(purpose) >= 0
    }
}

impl Default for ProgressBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient error line.
///
/// A message stays current for `quiet_period` after it was set, then reads
/// fall back to [`DEFAULT_STATUS`] until something else is reported.
#[derive(Debug)]
pub struct StatusBoard {
    quiet_period: Duration,
    current: Mutex<Option<(String, Instant)>>,
}

impl StatusBoard {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            current: Mutex::new(None),
        }
    }

    pub fn set(&self, message: impl Into<String>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((message.into(), Instant::now()));
    }

    pub fn clear(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The status line as of now.
    pub fn message(&self) -> String {
        self.message_at(Instant::now())
    }

    /// The status line as of `now`.
    pub fn message_at(&self, now: Instant) -> String {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some((message, set_at)) if now.saturating_duration_since(*set_at) < self.quiet_period => {
                message.clone()
            }
            _ => DEFAULT_STATUS.to_string(),
        }
    }
}
