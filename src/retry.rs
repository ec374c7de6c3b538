//! Single-slot retry timer.
//!
//! A session has at most one reconnect scheduled. The guard owns the timer
//! task's handle; while it is set every new failure is ignored.

#[cfg(test)]
#[path = "retry_test.rs"]
mod retry_test;

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct RetryGuard {
    pending: Option<JoinHandle<()>>,
}

impl RetryGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Run `fire` on the local task set after `delay`.
    ///
    /// Returns `false` without scheduling anything if a retry is already
    /// pending. `fire` must call [`RetryGuard::clear`] on the owning guard
    /// before doing its work. Must be called from within a `LocalSet`.
    pub fn schedule<F>(&mut self, delay: Duration, fire: F) -> bool
    where
        F: Future<Output = ()> + 'static,
    {
        if self.is_pending() {
            return false;
        }
        let deadline = tokio::time::Instant::now() + delay;
        self.pending = Some(tokio::task::spawn_local(async move {
            tokio::time::sleep_until(deadline).await;
            fire.await;
        }));
        true
    }

    /// Forget the timer once it has fired.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Abort a pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}
