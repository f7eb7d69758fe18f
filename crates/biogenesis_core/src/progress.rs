//! Repeating progress timers (startup loader, analysis run).
//!
//! # Invariants
//! - At most one tick task is alive per [`ProgressTimer`]; `start` aborts the
//!   previous task before spawning a new one.
//! - A task ends by itself once progress reaches 100.
//! - `stop` is idempotent.

use crate::rng::RandomSource;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const PROGRESS_DONE: u8 = 100;
const LOADER_FAST_PHASE_END: u8 = 95;
const LOADER_MAX_STEP: u64 = 5;

/// How progress advances on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSchedule {
    /// Random steps of 1..=5 below 95, then single steps.
    Loader,
    /// Linear in elapsed time over `duration`.
    Analysis { duration: Duration },
}

impl ProgressSchedule {
    /// Next value after `current`; never exceeds [`PROGRESS_DONE`].
    pub fn advance(self, current: u8, elapsed: Duration, rng: &mut dyn RandomSource) -> u8 {
        let next = match self {
            Self::Loader if current < LOADER_FAST_PHASE_END => {
                u64::from(current) + 1 + rng.next_below(LOADER_MAX_STEP)
            }
            Self::Loader => u64::from(current) + 1,
            Self::Analysis { duration } => {
                if duration.is_zero() {
                    u64::from(PROGRESS_DONE)
                } else {
                    (elapsed.as_secs_f64() / duration.as_secs_f64() * 100.0) as u64
                }
            }
        };
        next.min(u64::from(PROGRESS_DONE)) as u8
    }
}

/// Owner of one repeating tick task.
#[derive(Debug, Default)]
pub struct ProgressTimer {
    task: Option<JoinHandle<()>>,
}

impl ProgressTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ticking every `tick`; progress is published on the receiver.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        &mut self,
        schedule: ProgressSchedule,
        tick: Duration,
        mut rng: Box<dyn RandomSource>,
    ) -> watch::Receiver<u8> {
        if self.stop() {
            log::debug!("event=progress_restart module=progress status=ok");
        }

        let (progress_tx, progress_rx) = watch::channel(0u8);
        let task = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval_at(started + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut progress = 0u8;
            while progress < PROGRESS_DONE {
                ticker.tick().await;
                progress = schedule.advance(progress, started.elapsed(), rng.as_mut());
                progress_tx.send_replace(progress);
            }
            log::debug!("event=progress_done module=progress status=ok schedule={schedule:?}");
        });
        self.task = Some(task);
        progress_rx
    }

    /// Aborts the running task; returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
