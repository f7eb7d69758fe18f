//! Keystroke debouncer.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Holds the latest value until input has been quiet for `quiet`.
///
/// Each `push` replaces the pending value and restarts the window, so only
/// the last value of a burst is ever released.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Schedules `value`, cancelling whatever was pending.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.quiet));
    }

    /// Drops the pending value; returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves with the pending value once its window has elapsed.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: dropping the
    /// future keeps the pending value.
    pub async fn fire(&mut self) -> T {
        let deadline = match &self.pending {
            Some((_, deadline)) => *deadline,
            None => std::future::pending().await,
        };
        sleep_until(deadline).await;
        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}
