//! Per-call deadlines and cancellation.
//!
//! Store calls are the only suspension points of an operation. Each one is
//! raced against the caller's deadline and cancellation signal; whichever
//! fires first wins and the in-flight store future is dropped, so a partially
//! fetched result can never escape as if it were complete.

use std::future::Future;

use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tracing::warn;

use ledgerview_common::{LedgerError, Result};

/// Deadline and cancellation carried by a single read operation.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Caller-side handle that cancels every context derived from it.
#[derive(Debug)]
pub struct CancellationHandle {
    tx: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Check whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl QueryContext {
    /// Context with neither deadline nor cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_in(timeout)
    }

    /// Create a cancellable context together with its handle.
    pub fn cancellable() -> (Self, CancellationHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel: Some(rx),
        };
        (ctx, CancellationHandle { tx })
    }

    /// Set an absolute deadline.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    pub fn deadline_in(self, timeout: Duration) -> Self {
        self.deadline_at(Instant::now() + timeout)
    }

    /// Apply a default timeout when no deadline is set.
    pub fn or_timeout(self, timeout: Option<Duration>) -> Self {
        match (self.deadline, timeout) {
            (None, Some(timeout)) => self.deadline_in(timeout),
            _ => self,
        }
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check whether the caller has cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |rx| *rx.borrow())
    }

    /// Run one store call under this context.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(LedgerError::Cancelled);
        }

        let started = Instant::now();
        let deadline = self.deadline;
        let cancel = self.cancel.clone();

        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async move {
            match cancel {
                Some(mut rx) => {
                    // A dropped handle can no longer cancel.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => {
                warn!(operation, "Store call cancelled");
                Err(LedgerError::Cancelled)
            }
            _ = expired => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                warn!(operation, elapsed_ms, "Store call exceeded deadline");
                Err(LedgerError::DeadlineExceeded { elapsed_ms })
            }
            result = call => result,
        }
    }
}
