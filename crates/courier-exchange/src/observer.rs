//! Per-exchange observation.
//!
//! The dispatcher calls [`Observer::log`] exactly once per task, after the
//! exchange finishes and before its result is published. Observers run on
//! the dispatch worker and must not panic: a panic is re-raised on the
//! caller of the batch.

use std::time::{Duration, SystemTime};

pub trait Observer<R, S>: Send + Sync {
    /// `response` is `None` when the exchange failed or was cancelled.
    /// `timeout` is the deadline budget left on the request, zero if none.
    fn log(
        &self,
        start: SystemTime,
        duration: Duration,
        name: &str,
        request: &R,
        response: Option<&S>,
        timeout: Duration,
    );
}

impl<R, S, F> Observer<R, S> for F
where
    F: Fn(SystemTime, Duration, &str, &R, Option<&S>, Duration) + Send + Sync,
{
    fn log(
        &self,
        start: SystemTime,
        duration: Duration,
        name: &str,
        request: &R,
        response: Option<&S>,
        timeout: Duration,
    ) {
        self(start, duration, name, request, response, timeout)
    }
}

/// Logs every exchange through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<R, S> Observer<R, S> for TracingObserver {
    fn log(
        &self,
        start: SystemTime,
        duration: Duration,
        name: &str,
        _request: &R,
        response: Option<&S>,
        timeout: Duration,
    ) {
        let started_ms = start
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        if response.is_some() {
            tracing::info!(
                task = name,
                started_ms,
                elapsed_ms = duration.as_millis() as u64,
                timeout_ms = timeout.as_millis() as u64,
                "exchange completed"
            );
        } else {
            tracing::warn!(
                task = name,
                started_ms,
                elapsed_ms = duration.as_millis() as u64,
                timeout_ms = timeout.as_millis() as u64,
                "exchange failed"
            );
        }
    }
}
