//! Concurrent keyed dispatcher.
//!
//! Each task runs on its own tokio task: start clock, exchange, observe,
//! publish. The batch call returns only once every task has published.
//!
//! There is no batch-wide timeout. A task is bounded only by whatever its
//! request's exchange function enforces (for HTTP, the [`Timed`] deadline)
//! or by its cancel token; an exchange that never returns holds the batch
//! open indefinitely.
//!
//! [`Timed`]: crate::task::Timed

use std::future::Future;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use courier_core::config::DispatchSettings;

use crate::observer::Observer;
use crate::store::ResultStore;
use crate::task::{Deadline, ExchangeError, ExchangeResult, ExchangeTask};

/// Runs dispatch batches under a fixed set of [`DispatchSettings`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self { settings }
    }

    /// Run every task through `exchange` concurrently and wait for all of them.
    ///
    /// A failed or cancelled exchange is recorded in that task's result and
    /// does not affect its siblings. Task names are used as given, including
    /// the empty name.
    pub async fn dispatch<R, S, E, F, Fut, O>(
        &self,
        exchange: F,
        observer: O,
        tasks: impl IntoIterator<Item = ExchangeTask<R>>,
    ) -> ResultStore<R, S, E>
    where
        R: Deadline + Send + Sync + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
        F: Fn(Arc<R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, E>> + Send + 'static,
        O: Observer<R, S> + 'static,
    {
        let tasks: Vec<ExchangeTask<R>> = tasks.into_iter().collect();
        let store = ResultStore::new();
        let exchange = Arc::new(exchange);
        let observer = Arc::new(observer);
        let semaphore = match self.settings.max_concurrency {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n as usize))),
        };

        tracing::debug!(
            tasks = tasks.len(),
            max_concurrency = self.settings.max_concurrency,
            "dispatching exchange batch"
        );

        let mut set = JoinSet::new();
        for task in tasks {
            let store = store.clone();
            let exchange = Arc::clone(&exchange);
            let observer = Arc::clone(&observer);
            let semaphore = semaphore.clone();

            set.spawn(async move {
                // Permits are never closed, so acquisition only waits.
                let _permit = match semaphore {
                    Some(s) => s.acquire_owned().await.ok(),
                    None => None,
                };

                let ExchangeTask {
                    name,
                    request,
                    cancel,
                } = task;

                let start = SystemTime::now();
                let clock = Instant::now();
                let call = exchange(Arc::clone(&request));
                let outcome = match cancel {
                    Some(token) => tokio::select! {
                        r = call => r.map_err(ExchangeError::Exchange),
                        _ = token.cancelled() => Err(ExchangeError::Cancelled),
                    },
                    None => call.await.map_err(ExchangeError::Exchange),
                };
                let duration = clock.elapsed();

                observer.log(
                    start,
                    duration,
                    &name,
                    &request,
                    outcome.as_ref().ok(),
                    request.remaining(),
                );

                store.insert(ExchangeResult {
                    name,
                    request,
                    outcome,
                });
            });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
                tracing::warn!(error = %e, "exchange task did not run to completion");
            }
        }

        tracing::debug!(
            results = store.len(),
            failures = store.failures(),
            "exchange batch complete"
        );
        store
    }
}

/// [`Dispatcher::dispatch`] with default settings.
pub async fn dispatch<R, S, E, F, Fut, O>(
    exchange: F,
    observer: O,
    tasks: impl IntoIterator<Item = ExchangeTask<R>>,
) -> ResultStore<R, S, E>
where
    R: Deadline + Send + Sync + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
    F: Fn(Arc<R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S, E>> + Send + 'static,
    O: Observer<R, S> + 'static,
{
    Dispatcher::default()
        .dispatch(exchange, observer, tasks)
        .await
}
