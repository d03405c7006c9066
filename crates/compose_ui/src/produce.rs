//! Hooks that keep a signal in sync with a keyed producer.

use std::{future::Future, rc::Rc};

use futures::future::LocalBoxFuture;
use leptos::*;
use ui_state::{AsyncResult, KeyedProducer, OperationError, ResultSink, RetryAction};

/// [`ResultSink`] writing into a Leptos signal.
pub struct SignalSink<T: 'static>(RwSignal<AsyncResult<T>>);

impl<T: 'static> SignalSink<T> {
    /// Wraps `signal`.
    pub fn new(signal: RwSignal<AsyncResult<T>>) -> Self {
        Self(signal)
    }

    /// The wrapped signal.
    pub fn signal(&self) -> RwSignal<AsyncResult<T>> {
        self.0
    }
}

impl<T: 'static> Clone for SignalSink<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for SignalSink<T> {}

impl<T: 'static> ResultSink<T> for SignalSink<T> {
    fn publish(&self, state: AsyncResult<T>) {
        if self.0.try_set(state).is_some() {
            logger::ll_d!("dropping state published after its signal was disposed");
        }
    }
}

/// Schedules a producer task on the host executor.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// Owns a [`KeyedProducer`] and spawns the tasks it hands back.
pub struct ProduceDriver<K, T, S> {
    producer: Rc<KeyedProducer<K, T, S>>,
    spawn: Spawner,
}

impl<K, T, S> Clone for ProduceDriver<K, T, S> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
            spawn: self.spawn.clone(),
        }
    }
}

impl<K, T, S> ProduceDriver<K, T, S>
where
    K: PartialEq + Clone + 'static,
    T: 'static,
    S: ResultSink<T> + Clone + 'static,
{
    /// Creates a driver publishing into `sink` and spawning with `spawn`.
    pub fn new(sink: S, spawn: Spawner) -> Self {
        Self {
            producer: Rc::new(KeyedProducer::new(sink)),
            spawn,
        }
    }

    /// The underlying producer.
    pub fn producer(&self) -> &KeyedProducer<K, T, S> {
        &self.producer
    }

    /// Starts `operation` for `key` unless that key is already active.
    ///
    /// Failures carry `retry` when given, otherwise [`restart_action`](Self::restart_action).
    /// Returns `true` when a task was spawned.
    pub fn activate<F, Fut>(&self, key: K, retry: Option<RetryAction>, operation: F) -> bool
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, OperationError>> + 'static,
    {
        let retry = retry.unwrap_or_else(|| self.restart_action());
        match self.producer.activate(key, retry, operation) {
            Some(task) => {
                (self.spawn)(task);
                true
            }
            None => false,
        }
    }

    /// Re-runs the current activation; `false` when nothing was activated.
    pub fn restart(&self) -> bool {
        match self.producer.restart() {
            Some(task) => {
                (self.spawn)(task);
                true
            }
            None => false,
        }
    }

    /// Retry action that restarts the current activation.
    ///
    /// Holds the producer weakly so a failed state kept alive elsewhere does
    /// not keep the producer alive.
    pub fn restart_action(&self) -> RetryAction {
        let producer = Rc::downgrade(&self.producer);
        let spawn = self.spawn.clone();
        RetryAction::new(move || {
            if let Some(task) = producer.upgrade().and_then(|producer| producer.restart()) {
                spawn(task);
            }
        })
    }

    /// Aborts the in-flight task without publishing.
    pub fn cancel(&self) {
        self.producer.cancel();
    }
}

/// State produced by [`use_produce`] or [`use_produce_keyed`].
pub struct Produced<T: 'static> {
    /// Current outcome.
    pub state: ReadSignal<AsyncResult<T>>,
    /// Resets the state to pending and re-runs the operation.
    pub retry: RetryAction,
}

impl<T: 'static> Clone for Produced<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            retry: self.retry.clone(),
        }
    }
}

fn spawn_on_leptos() -> Spawner {
    Rc::new(|task: LocalBoxFuture<'static, ()>| spawn_local(task))
}

/// Runs `operation` once for the lifetime of the current owner.
///
/// See [`use_produce_keyed`] for `retry` and cancellation.
pub fn use_produce<T, F, Fut>(retry: Option<RetryAction>, operation: F) -> Produced<T>
where
    T: 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, OperationError>> + 'static,
{
    use_produce_keyed(|| (), retry, operation)
}

/// Runs `operation` whenever the reactive `key` changes.
///
/// `key` is tracked; use a tuple for several keys. A key change aborts the
/// in-flight task so its result never reaches the state. Re-running the
/// effect with an equal key does not start a second task. Failures carry
/// `retry` when given; otherwise they restart the current activation. The task
/// is cancelled when the owner is cleaned up.
pub fn use_produce_keyed<K, T, KF, F, Fut>(
    key: KF,
    retry: Option<RetryAction>,
    operation: F,
) -> Produced<T>
where
    K: PartialEq + Clone + 'static,
    T: 'static,
    KF: Fn() -> K + 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, OperationError>> + 'static,
{
    use_produce_keyed_on(spawn_on_leptos(), key, retry, operation)
}

/// [`use_produce_keyed`] with tasks scheduled by `spawn` instead of
/// `spawn_local`.
pub fn use_produce_keyed_on<K, T, KF, F, Fut>(
    spawn: Spawner,
    key: KF,
    retry: Option<RetryAction>,
    operation: F,
) -> Produced<T>
where
    K: PartialEq + Clone + 'static,
    T: 'static,
    KF: Fn() -> K + 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, OperationError>> + 'static,
{
    let state = create_rw_signal(AsyncResult::Pending);
    let driver = ProduceDriver::new(SignalSink::new(state), spawn);
    let operation = Rc::new(operation);

    create_effect({
        let driver = driver.clone();
        move |_| {
            let key = key();
            let operation = operation.clone();
            driver.activate(key, retry.clone(), move || operation());
        }
    });

    on_cleanup({
        let driver = driver.clone();
        move || driver.cancel()
    });

    Produced {
        state: state.read_only(),
        retry: driver.restart_action(),
    }
}
