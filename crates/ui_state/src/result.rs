//! The three-state outcome of a long-running operation.

use std::{error::Error, fmt, rc::Rc};

/// Shared handle to the error captured by a failed operation.
///
/// Cloning is cheap; every clone points at the same underlying error so views
/// and loggers can inspect the original cause.
#[derive(Clone)]
pub struct Cause(Rc<dyn Error + 'static>);

impl Cause {
    /// Wraps an error value.
    pub fn new<E: Error + 'static>(error: E) -> Self {
        Self(Rc::new(error))
    }

    /// Creates a cause from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// Display text of the captured error.
    pub fn message(&self) -> String {
        self.0.to_string()
    }

    /// Borrows the captured error.
    pub fn as_error(&self) -> &(dyn Error + 'static) {
        self.0.as_ref()
    }

    /// Returns the captured error as `E` when it has that concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl<E: Error + 'static> From<E> for Cause {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for MessageError {}

/// Zero-argument action that re-runs a failed operation.
///
/// Always present: the default is a no-op.
#[derive(Clone)]
pub struct RetryAction(Rc<dyn Fn()>);

impl RetryAction {
    /// Wraps a callback.
    pub fn new(action: impl Fn() + 'static) -> Self {
        Self(Rc::new(action))
    }

    /// An action that does nothing.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Runs the action.
    pub fn invoke(&self) {
        (self.0)();
    }

    /// Returns `true` when both handles share the same callback.
    pub fn same_as(&self, other: &RetryAction) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for RetryAction {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for RetryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RetryAction(..)")
    }
}

/// Payload of [`AsyncResult::Failed`].
#[derive(Debug, Clone, Default)]
pub struct Failure {
    /// Captured failure cause, if one was raised.
    pub error: Option<Cause>,
    /// Action bound to the retry control of an error view.
    pub retry: RetryAction,
}

impl Failure {
    /// Creates a failure payload.
    pub fn new(error: Option<Cause>, retry: RetryAction) -> Self {
        Self { error, retry }
    }

    /// Invokes the stored retry action.
    pub fn retry(&self) {
        self.retry.invoke();
    }

    /// Display text of the cause, when present.
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(Cause::message)
    }
}

impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        self.message() == other.message() && self.retry.same_as(&other.retry)
    }
}

/// Outcome of a long-running operation: pending, succeeded or failed.
///
/// Values are immutable; a holder moves to a new state by replacing its
/// current value.
#[derive(Debug, Clone)]
pub enum AsyncResult<T> {
    /// The operation has not settled yet.
    Pending,
    /// The operation produced a value.
    Succeeded(T),
    /// The operation failed and may be retried.
    Failed(Failure),
}

impl<T> Default for AsyncResult<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> AsyncResult<T> {
    /// Builds a failed result.
    pub fn failed(error: Option<Cause>, retry: RetryAction) -> Self {
        Self::Failed(Failure::new(error, retry))
    }

    /// `true` for `Pending` and `Succeeded`: the state is not showing an error,
    /// so previously rendered content can stay visible during a refresh.
    pub fn is_settled_or_pending(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// `true` while the operation has not settled.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// `true` when a value was produced.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// `true` when the operation failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Transforms the success value. `Pending` and `Failed` pass through
    /// untouched and `transform` is not called.
    pub fn map<R>(self, transform: impl FnOnce(T) -> R) -> AsyncResult<R> {
        match self {
            Self::Succeeded(value) => AsyncResult::Succeeded(transform(value)),
            Self::Pending => AsyncResult::Pending,
            Self::Failed(failure) => AsyncResult::Failed(failure),
        }
    }

    /// Applies `transform` to the success value, `None` otherwise.
    pub fn map_success<R>(self, transform: impl FnOnce(T) -> R) -> Option<R> {
        match self {
            Self::Succeeded(value) => Some(transform(value)),
            _ => None,
        }
    }

    /// Swaps the retry action of a failed result; other states are returned
    /// unchanged.
    pub fn on_retry(self, retry: RetryAction) -> Self {
        match self {
            Self::Failed(Failure { error, .. }) => Self::Failed(Failure { error, retry }),
            other => other,
        }
    }

    /// Borrows the success value.
    pub fn as_ref(&self) -> AsyncResult<&T> {
        match self {
            Self::Pending => AsyncResult::Pending,
            Self::Succeeded(value) => AsyncResult::Succeeded(value),
            Self::Failed(failure) => AsyncResult::Failed(failure.clone()),
        }
    }

    /// Borrows the success value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the result and returns the success value, if any.
    pub fn into_value(self) -> Option<T> {
        self.map_success(|value| value)
    }

    /// Borrows the failure payload, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Calls exactly one of the presentation callbacks for the active variant.
    pub fn fold<R>(
        &self,
        on_failed: impl FnOnce(&Failure) -> R,
        on_pending: impl FnOnce() -> R,
        on_succeeded: impl FnOnce(&T) -> R,
    ) -> R {
        match self {
            Self::Failed(failure) => on_failed(failure),
            Self::Pending => on_pending(),
            Self::Succeeded(value) => on_succeeded(value),
        }
    }
}

impl<T: PartialEq> PartialEq for AsyncResult<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Pending, Self::Pending) => true,
            (Self::Succeeded(a), Self::Succeeded(b)) => a == b,
            (Self::Failed(a), Self::Failed(b)) => a == b,
            _ => false,
        }
    }
}

/// Lifts any value into a succeeded result.
pub trait WrapAsSucceeded: Sized {
    /// Wraps `self` as [`AsyncResult::Succeeded`].
    fn wrap_as_succeeded(self) -> AsyncResult<Self> {
        AsyncResult::Succeeded(self)
    }
}

impl<T> WrapAsSucceeded for T {}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn failed_with(message: &str) -> (AsyncResult<i32>, RetryAction) {
        let retry = RetryAction::noop();
        (
            AsyncResult::failed(Some(Cause::msg(message)), retry.clone()),
            retry,
        )
    }

    #[test]
    fn map_transforms_only_succeeded_values() {
        assert_eq!(21.wrap_as_succeeded().map(|v| v * 2), AsyncResult::Succeeded(42));
        assert_eq!(AsyncResult::<i32>::Pending.map(|v| v * 2), AsyncResult::Pending);

        let (failed, retry) = failed_with("boom");
        let mapped = failed.map(|v| v.to_string());
        let failure = mapped.failure().expect("still failed");
        assert_eq!(failure.message().as_deref(), Some("boom"));
        assert!(failure.retry.same_as(&retry));
    }

    #[test]
    fn transforms_run_at_most_once_and_never_for_other_states() {
        let calls = Cell::new(0);
        let _ = 1.wrap_as_succeeded().map(|v| {
            calls.set(calls.get() + 1);
            v
        });
        assert_eq!(calls.get(), 1);

        let _ = AsyncResult::<i32>::Pending.map(|v| {
            calls.set(calls.get() + 1);
            v
        });
        let _ = failed_with("x").0.map_success(|v| {
            calls.set(calls.get() + 1);
            v
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn map_success_is_absent_unless_succeeded() {
        assert_eq!(5.wrap_as_succeeded().map_success(|v| v + 1), Some(6));
        assert_eq!(AsyncResult::<i32>::Pending.map_success(|v| v + 1), None);
        assert_eq!(failed_with("x").0.map_success(|v| v + 1), None);
    }

    #[test]
    fn on_retry_swaps_action_only_for_failures() {
        let replacement = RetryAction::noop();
        let (failed, original) = failed_with("disk full");
        let swapped = failed.on_retry(replacement.clone());
        let failure = swapped.failure().expect("failed");
        assert_eq!(failure.message().as_deref(), Some("disk full"));
        assert!(failure.retry.same_as(&replacement));
        assert!(!failure.retry.same_as(&original));

        assert_eq!(
            7.wrap_as_succeeded().on_retry(replacement.clone()),
            AsyncResult::Succeeded(7)
        );
        assert_eq!(
            AsyncResult::<i32>::Pending.on_retry(replacement),
            AsyncResult::Pending
        );
    }

    #[test]
    fn settled_or_pending_excludes_failures() {
        assert!(AsyncResult::<()>::Pending.is_settled_or_pending());
        assert!(().wrap_as_succeeded().is_settled_or_pending());
        assert!(!failed_with("x").0.is_settled_or_pending());
        assert!(!AsyncResult::<()>::Failed(Failure::default()).is_settled_or_pending());
    }

    #[test]
    fn fold_fires_exactly_one_presentation() {
        let render = |state: &AsyncResult<i32>| {
            state.fold(
                |failure| format!("error:{}", failure.message().unwrap_or_default()),
                || "loading".to_string(),
                |value| format!("content:{value}"),
            )
        };
        assert_eq!(render(&AsyncResult::Pending), "loading");
        assert_eq!(render(&AsyncResult::Succeeded(3)), "content:3");
        assert_eq!(render(&failed_with("nope").0), "error:nope");
    }

    #[test]
    fn failure_retry_invokes_stored_action() {
        let hits = Rc::new(Cell::new(0));
        let retry = RetryAction::new({
            let hits = hits.clone();
            move || hits.set(hits.get() + 1)
        });
        let state = AsyncResult::<()>::failed(None, retry);
        state.failure().expect("failed").retry();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn cause_downcasts_to_original_error() {
        let cause = Cause::new(std::io::Error::new(std::io::ErrorKind::Other, "io"));
        assert!(cause.downcast_ref::<std::io::Error>().is_some());
        assert_eq!(cause.message(), "io");
    }
}
