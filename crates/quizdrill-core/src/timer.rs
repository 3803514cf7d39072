//! Countdown task ownership and clock formatting.
//!
//! The ticking loop itself lives in [`crate::session`], where it can hold a
//! weak reference to the session internals. This module owns the task handle
//! so the scheduling resource is released the moment the attempt leaves
//! `InProgress` — on cancel and on drop, never leaving an orphaned ticker.

use std::future::Future;

use tokio::task::JoinHandle;

/// Handle to a running countdown task. Aborts the task when cancelled or
/// dropped.
#[derive(Debug)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    /// Spawn a countdown loop.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(fut)),
        }
    }

    /// Stop the countdown immediately.
    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Release the handle without aborting. Used by the countdown task
    /// itself on expiry: the task that is about to perform the timeout
    /// submit must not abort itself.
    pub(crate) fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Render remaining seconds as `m:ss`, seconds zero-padded to two digits.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
