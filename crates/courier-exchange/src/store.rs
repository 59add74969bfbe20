use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use std::sync::Arc;

use crate::task::ExchangeResult;

/// Results of a dispatch batch, keyed by task name.
///
/// Safe for concurrent inserts. Inserting under an existing name replaces
/// the earlier result.
pub struct ResultStore<R, S, E> {
    results: Arc<DashMap<String, ExchangeResult<R, S, E>>>,
}

impl<R, S, E> Clone for ResultStore<R, S, E> {
    fn clone(&self) -> Self {
        Self {
            results: Arc::clone(&self.results),
        }
    }
}

impl<R, S, E> Default for ResultStore<R, S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S, E> ResultStore<R, S, E> {
    pub fn new() -> Self {
        Self {
            results: Arc::new(DashMap::new()),
        }
    }

    /// Publish a result under its task name.
    pub fn insert(&self, result: ExchangeResult<R, S, E>) {
        self.results.insert(result.name.clone(), result);
    }

    /// Borrow the result for `name`.
    pub fn get(&self, name: &str) -> Option<Ref<'_, String, ExchangeResult<R, S, E>>> {
        self.results.get(name)
    }

    /// Take ownership of the result for `name`.
    pub fn remove(&self, name: &str) -> Option<ExchangeResult<R, S, E>> {
        self.results.remove(name).map(|(_, r)| r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    /// Task names currently held, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.results.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of tasks that failed or were cancelled.
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|e| !e.value().is_ok()).count()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
