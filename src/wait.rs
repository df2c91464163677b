//! Bounded waiting on asynchronous completion signals.
//!
//! Two shapes are covered: a flag set by an event observer ([`ReadySignal`],
//! checked at a fixed poll interval) and a one-shot completion value
//! ([`wait_for_completion`]). Both give up at a deadline and both honour a
//! [`CancellationToken`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout, Instant};
use tokio_util::sync::CancellationToken;

/// Interval between flag checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A flag with a single producer (an event observer) and a single consumer (the waiter).
#[derive(Debug, Clone, Default)]
pub struct ReadySignal(Arc<AtomicBool>);

impl ReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Deadline and poll interval of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub deadline: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    TimedOut,
    Cancelled,
}

/// Why a completion value was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("wait cancelled")]
    Cancelled,
    #[error("completion signal dropped before firing")]
    Closed,
}

/// Polls `signal` every `poll_interval` until it is set or `deadline` has elapsed.
pub async fn wait_until(
    signal: &ReadySignal,
    config: WaitConfig,
    cancel: &CancellationToken,
) -> WaitOutcome {
    let start = Instant::now();
    loop {
        if signal.is_set() {
            return WaitOutcome::Ready;
        }
        if cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        if start.elapsed() >= config.deadline {
            return WaitOutcome::TimedOut;
        }
        tokio::select! {
            _ = cancel.cancelled() => return WaitOutcome::Cancelled,
            _ = sleep(config.poll_interval) => {}
        }
    }
}

/// Waits for a one-shot completion value, giving up after `deadline`.
pub async fn wait_for_completion<T>(
    completion: oneshot::Receiver<T>,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<T, WaitError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(WaitError::Cancelled),
        received = timeout(deadline, completion) => match received {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(WaitError::Closed),
            Err(_) => Err(WaitError::TimedOut(deadline)),
        },
    }
}
