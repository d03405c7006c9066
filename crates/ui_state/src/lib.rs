//! Framework-free model of an asynchronous operation's UI state.
//!
//! [`AsyncResult`] is the pending/succeeded/failed value presentation code
//! renders. [`run_catching`] converts an operation's outcome into it while
//! letting cooperative cancellation escape, [`StateHolder`] is the observable
//! cell views read from, and [`KeyedProducer`] scopes one in-flight operation
//! to a lifecycle key so stale results never overwrite newer ones.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod catching;
mod holder;
mod producer;
mod result;

pub use catching::{run_catching, with_deadline, Cancelled, OperationError};
pub use holder::{produce_into, ResultSink, StateHolder, Subscription};
pub use producer::{KeyedProducer, Operation};
pub use result::{AsyncResult, Cause, Failure, RetryAction, WrapAsSucceeded};
