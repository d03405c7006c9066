//! Single-flight production scoped to a lifecycle key.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
};

use futures::{
    future::{AbortHandle, Abortable, LocalBoxFuture},
    FutureExt,
};

use crate::{run_catching, AsyncResult, OperationError, ResultSink, RetryAction};

/// Boxed, re-runnable operation stored by a [`KeyedProducer`].
pub type Operation<T> = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<T, OperationError>>>;

struct Activation<K, T> {
    key: K,
    generation: u64,
    abort: AbortHandle,
    finished: Rc<Cell<bool>>,
    retry: RetryAction,
    operation: Operation<T>,
}

struct ProducerState<K, T> {
    generation: u64,
    active: Option<Activation<K, T>>,
}

/// Runs at most one operation per lifecycle key and publishes into a sink.
///
/// The producer never spawns: [`KeyedProducer::activate`] hands back the task
/// and the caller schedules it on its executor. Changing the key aborts the
/// in-flight task and bumps the generation; a superseded task never writes to
/// the sink once a newer activation has started.
pub struct KeyedProducer<K, T, S> {
    sink: S,
    state: Rc<RefCell<ProducerState<K, T>>>,
}

impl<K, T, S> KeyedProducer<K, T, S>
where
    K: PartialEq + Clone + 'static,
    T: 'static,
    S: ResultSink<T> + Clone + 'static,
{
    /// Creates a producer publishing into `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: Rc::new(RefCell::new(ProducerState {
                generation: 0,
                active: None,
            })),
        }
    }

    /// The sink this producer publishes into.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Starts a new activation for `key`.
    ///
    /// Returns `None` when `key` equals the current activation's key, in which
    /// case no duplicate task is started.
    pub fn activate<F, Fut>(
        &self,
        key: K,
        retry: RetryAction,
        operation: F,
    ) -> Option<LocalBoxFuture<'static, ()>>
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, OperationError>> + 'static,
    {
        let unchanged = self
            .state
            .borrow()
            .active
            .as_ref()
            .is_some_and(|active| active.key == key);
        if unchanged {
            return None;
        }

        let operation: Operation<T> = Rc::new(move || operation().boxed_local());
        Some(self.start(key, retry, operation))
    }

    /// Re-runs the current activation's operation under the same key.
    ///
    /// This is the retry path: the sink is reset to `Pending` and a fresh task
    /// is returned. `None` when nothing was ever activated.
    pub fn restart(&self) -> Option<LocalBoxFuture<'static, ()>> {
        let (key, retry, operation) = {
            let state = self.state.borrow();
            let active = state.active.as_ref()?;
            (
                active.key.clone(),
                active.retry.clone(),
                active.operation.clone(),
            )
        };
        Some(self.start(key, retry, operation))
    }

    /// Aborts the in-flight task, if any, without publishing.
    ///
    /// The key is forgotten, so the next [`activate`](Self::activate) always
    /// starts a task.
    pub fn cancel(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(active) = state.active.take() {
            active.abort.abort();
        }
        state.generation += 1;
    }

    /// Key of the latest activation.
    pub fn current_key(&self) -> Option<K> {
        self.state
            .borrow()
            .active
            .as_ref()
            .map(|active| active.key.clone())
    }

    /// Generation counter; bumped on every activation and cancellation.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// `true` while the latest activation has not settled.
    pub fn is_in_flight(&self) -> bool {
        self.state
            .borrow()
            .active
            .as_ref()
            .is_some_and(|active| !active.finished.get())
    }

    fn start(
        &self,
        key: K,
        retry: RetryAction,
        operation: Operation<T>,
    ) -> LocalBoxFuture<'static, ()> {
        let (abort, registration) = AbortHandle::new_pair();
        let finished = Rc::new(Cell::new(false));
        let generation = {
            let mut state = self.state.borrow_mut();
            if let Some(previous) = state.active.take() {
                previous.abort.abort();
            }
            state.generation += 1;
            state.active = Some(Activation {
                key,
                generation: state.generation,
                abort,
                finished: finished.clone(),
                retry: retry.clone(),
                operation: operation.clone(),
            });
            state.generation
        };

        self.sink.publish(AsyncResult::Pending);

        let sink = self.sink.clone();
        let shared = self.state.clone();
        let task = async move {
            let outcome = run_catching(retry, || operation()).await;
            let current = shared
                .borrow()
                .active
                .as_ref()
                .is_some_and(|active| active.generation == generation);
            if !current {
                return;
            }
            finished.set(true);
            if let Ok(result) = outcome {
                sink.publish(result);
            }
        };
        Abortable::new(task, registration).map(|_| ()).boxed_local()
    }
}

impl<K, T, S> Drop for KeyedProducer<K, T, S> {
    fn drop(&mut self) {
        if let Some(active) = self.state.borrow_mut().active.take() {
            active.abort.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::{
        channel::oneshot,
        executor::LocalPool,
        future,
        task::LocalSpawnExt,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::StateHolder;

    struct Harness {
        pool: LocalPool,
        holder: StateHolder<String>,
        history: Rc<RefCell<Vec<AsyncResult<String>>>>,
        _subscription: crate::Subscription,
    }

    impl Harness {
        fn new() -> Self {
            let holder = StateHolder::default();
            let history = Rc::new(RefCell::new(Vec::new()));
            let subscription = holder.subscribe({
                let history = history.clone();
                move |state| history.borrow_mut().push(state.clone())
            });
            Self {
                pool: LocalPool::new(),
                holder,
                history,
                _subscription: subscription,
            }
        }

        fn spawn(&mut self, task: Option<LocalBoxFuture<'static, ()>>) {
            let task = task.expect("a task was started");
            self.pool.spawner().spawn_local(task).expect("spawn");
            self.pool.run_until_stalled();
        }
    }

    /// Operation that resolves once the returned sender fires.
    fn gated(
        label: &'static str,
    ) -> (
        Rc<RefCell<Option<oneshot::Sender<()>>>>,
        impl Fn() -> LocalBoxFuture<'static, Result<String, OperationError>>,
    ) {
        let gate = Rc::new(RefCell::new(None));
        let operation = {
            let gate = gate.clone();
            move || {
                let (tx, rx) = oneshot::channel();
                *gate.borrow_mut() = Some(tx);
                async move {
                    rx.await.map_err(|_| OperationError::Cancelled)?;
                    Ok::<_, OperationError>(label.to_string())
                }
                .boxed_local()
            }
        };
        (gate, operation)
    }

    #[test]
    fn activation_publishes_pending_then_value() {
        let mut harness = Harness::new();
        let producer = KeyedProducer::new(harness.holder.clone());
        harness.spawn(producer.activate(1, RetryAction::noop(), || async {
            Ok::<_, OperationError>("ready".to_string())
        }));

        assert_eq!(
            *harness.history.borrow(),
            vec![
                AsyncResult::Pending,
                AsyncResult::Succeeded("ready".to_string())
            ]
        );
        assert!(!producer.is_in_flight());
    }

    #[test]
    fn unchanged_key_does_not_start_a_duplicate() {
        let mut harness = Harness::new();
        let producer = KeyedProducer::new(harness.holder.clone());
        let (_gate, operation) = gated("first");
        harness.spawn(producer.activate("k", RetryAction::noop(), operation));
        assert!(producer.is_in_flight());

        let (_other_gate, other) = gated("second");
        assert!(producer.activate("k", RetryAction::noop(), other).is_none());
        assert_eq!(producer.generation(), 1);
    }

    #[test]
    fn key_change_drops_stale_result() {
        let mut harness = Harness::new();
        let producer = KeyedProducer::new(harness.holder.clone());

        let (first_gate, first) = gated("stale");
        harness.spawn(producer.activate(1, RetryAction::noop(), first));
        let (second_gate, second) = gated("fresh");
        harness.spawn(producer.activate(2, RetryAction::noop(), second));

        // The superseded task was aborted, so its receiver is gone.
        let stale_sender = first_gate.borrow_mut().take().expect("first gate");
        assert!(stale_sender.send(()).is_err());
        harness.pool.run_until_stalled();
        assert_eq!(harness.holder.get(), AsyncResult::Pending);

        second_gate
            .borrow_mut()
            .take()
            .expect("second gate")
            .send(())
            .expect("second task alive");
        harness.pool.run_until_stalled();

        assert_eq!(
            *harness.history.borrow(),
            vec![
                AsyncResult::Pending,
                AsyncResult::Pending,
                AsyncResult::Succeeded("fresh".to_string())
            ]
        );
        assert_eq!(producer.current_key(), Some(2));
    }

    #[test]
    fn aborted_task_polled_late_never_publishes() {
        let mut harness = Harness::new();
        let producer = KeyedProducer::new(harness.holder.clone());

        let stale = producer
            .activate(1, RetryAction::noop(), || future::ready(Ok("stale".to_string())))
            .expect("task");
        harness.spawn(producer.activate(2, RetryAction::noop(), || {
            future::ready(Ok("fresh".to_string()))
        }));
        // Polling the aborted first task yields without publishing.
        harness.spawn(Some(stale));

        assert_eq!(
            harness.holder.get(),
            AsyncResult::Succeeded("fresh".to_string())
        );
    }

    #[test]
    fn retry_resets_to_pending_and_reruns_the_operation() {
        let mut harness = Harness::new();
        let producer = Rc::new(KeyedProducer::new(harness.holder.clone()));
        let attempts = Rc::new(Cell::new(0));

        let operation = {
            let attempts = attempts.clone();
            move || {
                attempts.set(attempts.get() + 1);
                let attempt = attempts.get();
                async move {
                    if attempt == 1 {
                        Err(OperationError::message("disk full"))
                    } else {
                        Ok(format!("attempt {attempt}"))
                    }
                }
            }
        };
        harness.spawn(producer.activate((), RetryAction::noop(), operation));
        let failure = harness.holder.get();
        assert_eq!(
            failure.failure().and_then(|failure| failure.message()).as_deref(),
            Some("disk full")
        );

        harness.history.borrow_mut().clear();
        harness.spawn(producer.restart());
        assert_eq!(
            *harness.history.borrow(),
            vec![
                AsyncResult::Pending,
                AsyncResult::Succeeded("attempt 2".to_string())
            ]
        );
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn cancel_aborts_without_publishing() {
        let mut harness = Harness::new();
        let producer = KeyedProducer::new(harness.holder.clone());
        let (gate, operation) = gated("never");
        harness.spawn(producer.activate(7, RetryAction::noop(), operation));

        producer.cancel();
        harness.pool.run_until_stalled();
        let sender = gate.borrow_mut().take().expect("gate");
        assert!(sender.send(()).is_err());

        assert_eq!(*harness.history.borrow(), vec![AsyncResult::Pending]);
        assert_eq!(producer.current_key(), None);
    }
}
