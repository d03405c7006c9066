//! Observable cells that expose the current [`AsyncResult`].

use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::{Rc, Weak},
};

use crate::{run_catching, AsyncResult, Cancelled, OperationError, RetryAction};

/// Destination for state transitions produced by an operation.
///
/// Implemented by [`StateHolder`] and by UI-framework signals.
pub trait ResultSink<T> {
    /// Replaces the current state.
    fn publish(&self, state: AsyncResult<T>);
}

type Listener<T> = Rc<dyn Fn(&AsyncResult<T>)>;

struct HolderInner<T> {
    state: RefCell<AsyncResult<T>>,
    version: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_listener_id: Cell<u64>,
}

/// Single-writer, multiple-reader cell holding the current [`AsyncResult`].
///
/// Clones share the same cell. Listeners run synchronously after every write,
/// so each write is observed before the next one begins.
pub struct StateHolder<T> {
    inner: Rc<HolderInner<T>>,
}

impl<T> Clone for StateHolder<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for StateHolder<T> {
    fn default() -> Self {
        Self::new(AsyncResult::Pending)
    }
}

impl<T: Clone + 'static> StateHolder<T> {
    /// Creates a holder seeded with `initial`.
    pub fn new(initial: AsyncResult<T>) -> Self {
        Self {
            inner: Rc::new(HolderInner {
                state: RefCell::new(initial),
                version: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
            }),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn get(&self) -> AsyncResult<T> {
        self.inner.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&AsyncResult<T>) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Number of writes so far.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Replaces the state and notifies listeners.
    pub fn set(&self, state: AsyncResult<T>) {
        *self.inner.state.borrow_mut() = state;
        self.inner.version.set(self.inner.version.get() + 1);

        let snapshot = self.get();
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Registers a listener; dropping the returned handle removes it.
    pub fn subscribe(&self, listener: impl Fn(&AsyncResult<T>) + 'static) -> Subscription {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<HolderInner<T>> = Rc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner
                        .listeners
                        .borrow_mut()
                        .retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }
}

impl<T: Clone + 'static> ResultSink<T> for StateHolder<T> {
    fn publish(&self, state: AsyncResult<T>) {
        self.set(state);
    }
}

/// Drop-based listener registration handle.
#[must_use = "dropping the subscription removes the listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keeps the listener registered for the lifetime of the holder.
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Publishes `Pending`, runs `operation`, then publishes its outcome.
///
/// On cancellation nothing is published after `Pending` and `Err(Cancelled)`
/// is returned so the enclosing task can stop.
pub async fn produce_into<T, S, F, Fut>(
    sink: &S,
    retry: RetryAction,
    operation: F,
) -> Result<(), Cancelled>
where
    S: ResultSink<T> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, OperationError>>,
{
    sink.publish(AsyncResult::Pending);
    let outcome = run_catching(retry, operation).await?;
    sink.publish(outcome);
    Ok(())
}
