//! # Status Poller
//!
//! Out-of-band status observation of a dispatched command through the
//! injected [`LogSink`] capability.
//!
//! Two modes:
//!
//! - single poll: current best-known [`ExecutionStatus`], one sink query
//! - follow: suspend until a terminal status is observed, the caller's
//!   timeout elapses (returns `TimedOut` rather than blocking forever),
//!   or cancellation is signaled (returns the `Cancelled` error, distinct
//!   from `TimedOut`)
//!
//! Follow mode is the only long-lived wait in the coordinator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::dispatch::fleet::LogSink;
use crate::dispatch::types::ExecutionStatus;
use crate::error::{CoordinatorError, Result};

/// Cooperative cancellation signal a caller can hand into a follow wait.
///
/// Cloning shares the underlying signal. Once cancelled, a handle stays
/// cancelled.
#[derive(Clone, Default)]
pub struct CancellationHandle {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every waiter, current and future.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once cancellation has been signaled.
    pub async fn cancelled(&self) {
        loop {
            // register interest before checking the flag so a concurrent
            // cancel() cannot slip between check and wait
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

pub struct StatusPoller {
    sink: Arc<dyn LogSink>,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(sink: Arc<dyn LogSink>, interval: Duration) -> Self {
        Self { sink, interval }
    }

    /// Query the sink once and return the current best-known status.
    pub async fn poll_once(&self, sink_id: &str, command_id: &str) -> Result<ExecutionStatus> {
        let status = self.sink.query(sink_id, command_id).await?;
        debug!(
            sink = sink_id,
            command_id,
            status = %status,
            backend = self.sink.backend_name(),
            "Polled log sink"
        );
        Ok(status)
    }

    /// Follow a command until terminal status, timeout, or cancellation.
    ///
    /// Returns `Ok(TimedOut)` when `timeout` elapses without a terminal
    /// observation and `Err(Cancelled)` the moment `cancel` fires. Sink
    /// query errors propagate immediately as `PollError`; there is no
    /// internal retry.
    pub async fn follow(
        &self,
        sink_id: &str,
        command_id: &str,
        timeout: Duration,
        cancel: &CancellationHandle,
    ) -> Result<ExecutionStatus> {
        let deadline = Instant::now() + timeout;
        let mut last_seen: Option<ExecutionStatus> = None;

        loop {
            let status = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(command_id, "Follow cancelled by caller");
                    return Err(CoordinatorError::cancelled(command_id));
                }
                () = tokio::time::sleep_until(deadline) => {
                    warn!(command_id, sink = sink_id, ?timeout, "Follow timed out");
                    return Ok(ExecutionStatus::TimedOut);
                }
                result = self.poll_once(sink_id, command_id) => result?,
            };

            if last_seen != Some(status) {
                info!(command_id, status = %status, "Command status changed");
                last_seen = Some(status);
            }

            if status.is_terminal() {
                return Ok(status);
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(command_id, "Follow cancelled by caller");
                    return Err(CoordinatorError::cancelled(command_id));
                }
                () = tokio::time::sleep_until(deadline) => {
                    warn!(command_id, sink = sink_id, ?timeout, "Follow timed out");
                    return Ok(ExecutionStatus::TimedOut);
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
