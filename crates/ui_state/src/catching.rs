//! Converting an operation's outcome into an [`AsyncResult`].

use std::{future::Future, pin::pin, time::Duration};

use futures::future::{self, Either};
use thiserror::Error;

use crate::{AsyncResult, Cause, RetryAction};

/// Signals an operation can raise instead of producing a value.
#[derive(Debug, Clone, Error)]
pub enum OperationError {
    /// Cooperative cancellation. Never converted into a failed result.
    #[error("operation cancelled")]
    Cancelled,
    /// Deadline expiry. Unlike plain cancellation this becomes a failure.
    #[error("operation timed out{}", timeout_suffix(.after))]
    TimedOut {
        /// Deadline that expired, when known.
        after: Option<Duration>,
    },
    /// Any other failure.
    #[error("{0}")]
    Failed(Cause),
}

fn timeout_suffix(after: &Option<Duration>) -> String {
    after
        .map(|after| format!(" after {after:?}"))
        .unwrap_or_default()
}

impl OperationError {
    /// Wraps an arbitrary error as an operational failure.
    pub fn failure<E: std::error::Error + 'static>(error: E) -> Self {
        Self::Failed(Cause::new(error))
    }

    /// Operational failure carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failed(Cause::msg(message))
    }

    /// `true` for plain cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<Cause> for OperationError {
    fn from(cause: Cause) -> Self {
        Self::Failed(cause)
    }
}

impl From<Cancelled> for OperationError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Cancellation that escaped [`run_catching`]; the caller's task should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Runs `operation` and converts its outcome into an [`AsyncResult`].
///
/// Timeouts and failures become [`AsyncResult::Failed`] carrying `retry`.
/// Plain cancellation is returned as `Err(Cancelled)` so it can tear down the
/// enclosing task.
pub async fn run_catching<T, F, Fut>(
    retry: RetryAction,
    operation: F,
) -> Result<AsyncResult<T>, Cancelled>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, OperationError>>,
{
    match operation().await {
        Ok(value) => Ok(AsyncResult::Succeeded(value)),
        Err(OperationError::Cancelled) => Err(Cancelled),
        Err(timeout @ OperationError::TimedOut { .. }) => {
            Ok(AsyncResult::failed(Some(Cause::new(timeout)), retry))
        }
        Err(OperationError::Failed(cause)) => Ok(AsyncResult::failed(Some(cause), retry)),
    }
}

/// Races `operation` against `deadline`.
///
/// `deadline` is any timer future from the host runtime; when it resolves
/// first the operation is dropped and [`OperationError::TimedOut`] is returned.
pub async fn with_deadline<T, Fut, D>(
    deadline: D,
    after: Option<Duration>,
    operation: Fut,
) -> Result<T, OperationError>
where
    Fut: Future<Output = Result<T, OperationError>>,
    D: Future<Output = ()>,
{
    let operation = pin!(operation);
    let deadline = pin!(deadline);
    match future::select(operation, deadline).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(((), _)) => Err(OperationError::TimedOut { after }),
    }
}
