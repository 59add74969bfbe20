//! courier-exchange: concurrent keyed dispatch of request/response exchanges.
//!
//! A batch of named [`ExchangeTask`]s is run in parallel through a
//! caller-supplied exchange function. Every task is observed once and its
//! [`ExchangeResult`] lands in a shared [`ResultStore`] under the task name.

pub mod dispatch;
pub mod http;
pub mod observer;
pub mod store;
pub mod task;

pub use dispatch::{dispatch, Dispatcher};
pub use observer::{Observer, TracingObserver};
pub use store::ResultStore;
pub use task::{Deadline, ExchangeError, ExchangeResult, ExchangeTask, Timed};
