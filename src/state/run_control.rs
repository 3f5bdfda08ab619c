// Run/pause signalling and cooperative suspension primitives
//
// The control loop is a single cooperative flow. Every wait it performs goes
// through RunControl so that pause and stop requests are observed at a
// bounded poll granularity instead of after a full settle duration.

use crate::error::{HarvestError, HarvestResult};
use crate::models::RunMode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};

/// Default poll granularity for all suspension points
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a predicate wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied,
    TimedOut,
    Cancelled,
}

/// Shared run/pause/stop flag.
///
/// Cloning is cheap; all clones observe and drive the same flag. The flag is
/// backed by a `tokio::sync::watch` channel so a paused loop sleeps until the
/// mode changes instead of spinning.
#[derive(Clone, Debug)]
pub struct RunControl {
    tx: Arc<watch::Sender<RunMode>>,
    rx: watch::Receiver<RunMode>,
    poll: Duration,
}

impl RunControl {
    pub fn new(initial: RunMode) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            rx,
            poll: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll.max(Duration::from_millis(1));
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    pub fn mode(&self) -> RunMode {
        *self.rx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.mode() == RunMode::Running
    }

    pub fn subscribe(&self) -> watch::Receiver<RunMode> {
        self.tx.subscribe()
    }

    /// Stopped is terminal; nothing moves the flag out of it.
    fn set(&self, mode: RunMode) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == RunMode::Stopped || *current == mode {
                return false;
            }
            *current = mode;
            true
        })
    }

    pub fn resume(&self) -> bool {
        self.set(RunMode::Running)
    }

    pub fn pause(&self) -> bool {
        self.set(RunMode::Paused)
    }

    pub fn stop(&self) -> bool {
        self.set(RunMode::Stopped)
    }

    /// Flip between running and paused, returning the new mode.
    pub fn toggle(&self) -> RunMode {
        match self.mode() {
            RunMode::Running => {
                self.pause();
            }
            RunMode::Paused => {
                self.resume();
            }
            RunMode::Stopped => {}
        }
        self.mode()
    }

    /// Return once running; block while paused; fail once stopped.
    pub async fn checkpoint(&self) -> HarvestResult<()> {
        let mut rx = self.rx.clone();
        loop {
            let mode = *rx.borrow_and_update();
            match mode {
                RunMode::Running => return Ok(()),
                RunMode::Stopped => return Err(HarvestError::Stopped),
                RunMode::Paused => {
                    if rx.changed().await.is_err() {
                        return Err(HarvestError::Stopped);
                    }
                }
            }
        }
    }

    /// Wait out the settle time of an action already issued to the world.
    ///
    /// Pause is not honored here; the caller reaches a checkpoint right after.
    pub async fn settle(&self, duration: Duration) -> HarvestResult<()> {
        let deadline = Instant::now() + duration;
        loop {
            if self.mode() == RunMode::Stopped {
                return Err(HarvestError::Stopped);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            sleep(self.poll.min(deadline - now)).await;
        }
    }

    /// Idle for `duration`, blocking at poll granularity while paused.
    ///
    /// Time spent paused does not count towards `duration`.
    pub async fn responsive_wait(&self, duration: Duration) -> HarvestResult<()> {
        let mut remaining = duration;
        while !remaining.is_zero() {
            self.checkpoint().await?;
            let step = remaining.min(self.poll);
            sleep(step).await;
            remaining -= step;
        }
        self.checkpoint().await
    }

    /// Poll `condition` every `poll` until it holds, `timeout` elapses, or the run stops.
    ///
    /// Pause suspends polling until resumed. With no timeout the wait is
    /// bounded only by the external condition.
    pub async fn suspend_until<F>(
        &self,
        mut condition: F,
        poll: Duration,
        timeout: Option<Duration>,
    ) -> WaitOutcome
    where
        F: FnMut() -> bool,
    {
        let started = Instant::now();
        loop {
            if self.checkpoint().await.is_err() {
                return WaitOutcome::Cancelled;
            }
            if condition() {
                return WaitOutcome::Satisfied;
            }
            if timeout.is_some_and(|limit| started.elapsed() >= limit) {
                return WaitOutcome::TimedOut;
            }
            sleep(poll.min(self.poll).max(Duration::from_millis(1))).await;
        }
    }

    /// Like [`suspend_until`](Self::suspend_until) but for the tail of an issued action: pause is ignored.
    pub async fn settle_until<F>(&self, mut condition: F, timeout: Duration) -> WaitOutcome
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if self.mode() == RunMode::Stopped {
                return WaitOutcome::Cancelled;
            }
            if condition() {
                return WaitOutcome::Satisfied;
            }
            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::TimedOut;
            }
            sleep(self.poll.min(deadline - now)).await;
        }
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new(RunMode::Paused)
    }
}
