//! Close signal shared by a retrying transport and its in-flight calls.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;

/// Set once when the owning transport is closed. Wakes calls that are
/// waiting between attempts, both blocking and async.
pub(crate) struct CloseSignal {
    closed: Mutex<bool>,
    cond: Condvar,
    watch: watch::Sender<bool>,
}

impl CloseSignal {
    pub(crate) fn new() -> Self {
        let (watch, _) = watch::channel(false);
        Self {
            closed: Mutex::new(false),
            cond: Condvar::new(),
            watch,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the signal closed. Returns true only for the call that closed it.
    pub(crate) fn close(&self) -> bool {
        let mut closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return false;
        }
        *closed = true;
        self.watch.send_replace(true);
        self.cond.notify_all();
        true
    }

    /// Blocks for `delay` or until closed. Returns true if closed.
    pub(crate) fn wait_blocking(&self, delay: Duration) -> bool {
        let deadline = Instant::now().checked_add(delay);
        let mut closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        while !*closed {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                // Delay too large to represent as an instant; wait in chunks.
                None => Duration::from_secs(3600),
            };
            if deadline.is_some() && remaining.is_zero() {
                return false;
            }
            closed = self
                .cond
                .wait_timeout(closed, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Sleeps on the tokio timer for `delay` or until closed. Returns true if closed.
    pub(crate) async fn wait(&self, delay: Duration) -> bool {
        let mut rx = self.watch.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(delay) => self.is_closed(),
            res = rx.wait_for(|closed| *closed) => res.is_ok(),
        }
    }
}
