//! Exchange tasks, results, and request deadlines.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

// ── Deadlines ─────────────────────────────────────────────────────────────────

/// A request that may carry an absolute deadline.
///
/// The dispatcher reports the budget left on this deadline after each
/// exchange. Requests without one report zero.
pub trait Deadline {
    fn deadline(&self) -> Option<Instant> {
        None
    }

    /// Time left before the deadline, saturating at zero.
    fn remaining(&self) -> Duration {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }
}

/// Pairs a request with an absolute deadline.
#[derive(Debug, Clone)]
pub struct Timed<R> {
    request: R,
    deadline: Option<Instant>,
}

impl<R> Timed<R> {
    /// No deadline.
    pub fn new(request: R) -> Self {
        Self {
            request,
            deadline: None,
        }
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(request: R, timeout: Duration) -> Self {
        Self::with_deadline(request, Instant::now() + timeout)
    }

    pub fn with_deadline(request: R, deadline: Instant) -> Self {
        Self {
            request,
            deadline: Some(deadline),
        }
    }

    pub fn request(&self) -> &R {
        &self.request
    }

    pub fn into_inner(self) -> R {
        self.request
    }
}

impl<R> Deadline for Timed<R> {
    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

// ── Tasks ─────────────────────────────────────────────────────────────────────

/// One unit of a dispatch batch.
///
/// Names key the result store; a batch should not reuse them. When two tasks
/// share a name, whichever finishes last wins.
#[derive(Debug)]
pub struct ExchangeTask<R> {
    pub name: String,
    pub request: Arc<R>,
    /// Cancelling this token abandons the exchange with [`ExchangeError::Cancelled`].
    pub cancel: Option<CancellationToken>,
}

impl<R> ExchangeTask<R> {
    pub fn new(name: impl Into<String>, request: R) -> Self {
        Self {
            name: name.into(),
            request: Arc::new(request),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError<E> {
    #[error("exchange failed: {0}")]
    Exchange(E),
    #[error("exchange cancelled")]
    Cancelled,
}

/// Outcome of one task.
#[derive(Debug)]
pub struct ExchangeResult<R, S, E> {
    pub name: String,
    pub request: Arc<R>,
    pub outcome: Result<S, ExchangeError<E>>,
}

impl<R, S, E> ExchangeResult<R, S, E> {
    pub fn response(&self) -> Option<&S> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ExchangeError<E>> {
        self.outcome.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}
