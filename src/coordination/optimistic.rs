use crate::core::{AdminError, Result};
use crate::notify::{Notification, Notifier, default_notifier};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{Instrument, Level, event, info_span};

/// One-shot state mutation applied by the executor.
pub type Transform<S> = Box<dyn FnOnce(&mut S) + Send>;
/// Reconciles local state with the operation's result.
pub type SuccessHook<S, T> = Box<dyn FnOnce(&mut S, &T) + Send>;
pub type ErrorHook = Box<dyn FnOnce(&AdminError) + Send>;

/// Observable piece of local state.
///
/// Cloning yields another handle to the same state. Mutations are
/// synchronous and every subscriber sees each change.
pub struct StateHandle<S> {
    tx: Arc<watch::Sender<S>>,
}

impl<S> Clone for StateHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<S> StateHandle<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn modify(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Swaps in `value` and returns the previous state.
    pub fn replace(&self, value: S) -> S {
        self.tx.send_replace(value)
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}

/// Tracks whether an executor has updates in flight.
///
/// Overlapping updates are counted, so the flag only drops once the last
/// one settles.
#[derive(Clone)]
pub struct UpdateState {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Default for UpdateState {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            in_flight: Arc::new(tx),
        }
    }
}

impl UpdateState {
    pub fn is_updating(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    fn begin(&self) -> UpdateGuard {
        self.in_flight.send_modify(|count| *count += 1);
        UpdateGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

struct UpdateGuard {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Drop for UpdateGuard {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// Restores the pre-optimistic state unless disarmed.
///
/// Firing on drop covers an update whose future is dropped mid-flight.
struct RollbackGuard<S>
where
    S: Clone + Send + Sync + 'static,
{
    state: StateHandle<S>,
    rollback: Option<Transform<S>>,
}

impl<S> RollbackGuard<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn disarm(&mut self) {
        self.rollback = None;
    }

    fn roll_back(&mut self) {
        if let Some(rollback) = self.rollback.take() {
            self.state.modify(rollback);
        }
    }
}

impl<S> Drop for RollbackGuard<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if self.rollback.is_some() {
            event!(Level::WARN, "optimistic update abandoned, rolling back");
            self.roll_back();
        }
    }
}

/// What to do with a failed update once state is rolled back.
pub enum ErrorHandling {
    /// Surface the error's user message through the executor's notifier.
    Notify,
    /// Hand the error to the caller; the notifier is not used.
    Handle(ErrorHook),
}

impl ErrorHandling {
    pub fn handle(hook: impl FnOnce(&AdminError) + Send + 'static) -> Self {
        Self::Handle(Box::new(hook))
    }
}

impl Default for ErrorHandling {
    fn default() -> Self {
        Self::Notify
    }
}

/// A remote operation plus the local state changes that bracket it.
pub struct OptimisticUpdate<S, T, Fut> {
    label: String,
    operation: Fut,
    optimistic: Option<Transform<S>>,
    rollback: Option<Transform<S>>,
    on_success: Option<SuccessHook<S, T>>,
    on_error: ErrorHandling,
}

impl<S, T, Fut> OptimisticUpdate<S, T, Fut>
where
    Fut: Future<Output = Result<T>>,
{
    pub fn new(operation: Fut) -> Self {
        Self {
            label: "update".to_string(),
            operation,
            optimistic: None,
            rollback: None,
            on_success: None,
            on_error: ErrorHandling::Notify,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn optimistic(mut self, transform: impl FnOnce(&mut S) + Send + 'static) -> Self {
        self.optimistic = Some(Box::new(transform));
        self
    }

    pub fn rollback(mut self, transform: impl FnOnce(&mut S) + Send + 'static) -> Self {
        self.rollback = Some(Box::new(transform));
        self
    }

    pub fn on_success(mut self, hook: impl FnOnce(&mut S, &T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl FnOnce(&AdminError) + Send + 'static) -> Self {
        self.on_error = ErrorHandling::handle(hook);
        self
    }

    pub fn error_handling(mut self, handling: ErrorHandling) -> Self {
        self.on_error = handling;
        self
    }
}

/// Applies local changes ahead of a remote operation and reconciles or
/// rolls them back once it settles.
pub struct OptimisticExecutor<S> {
    state: StateHandle<S>,
    updates: UpdateState,
    notifier: Arc<dyn Notifier>,
}

impl<S> OptimisticExecutor<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        Self::with_state(StateHandle::new(initial))
    }

    pub fn with_state(state: StateHandle<S>) -> Self {
        Self {
            state,
            updates: UpdateState::default(),
            notifier: default_notifier(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> &StateHandle<S> {
        &self.state
    }

    pub fn updates(&self) -> &UpdateState {
        &self.updates
    }

    pub fn is_updating(&self) -> bool {
        self.updates.is_updating()
    }

    /// Runs `update`.
    ///
    /// The optimistic transform is applied before `operation` is first
    /// polled. On success the result is reconciled through `on_success`; on
    /// failure the rollback is applied before the error is reported and
    /// returned. The in-flight flag is cleared however the call ends,
    /// including when the returned future is dropped early, which also rolls
    /// state back.
    pub async fn execute<T, Fut>(&self, update: OptimisticUpdate<S, T, Fut>) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let OptimisticUpdate {
            label,
            operation,
            optimistic,
            rollback,
            on_success,
            on_error,
        } = update;

        let _updating = self.updates.begin();
        if let Some(apply) = optimistic {
            self.state.modify(apply);
        }
        let mut guard = RollbackGuard {
            state: self.state.clone(),
            rollback,
        };

        let span = info_span!("optimistic_update", label = %label);
        match operation.instrument(span).await {
            Ok(result) => {
                guard.disarm();
                if let Some(reconcile) = on_success {
                    self.state.modify(|state| reconcile(state, &result));
                }
                event!(Level::DEBUG, label = %label, "optimistic update confirmed");
                Ok(result)
            }
            Err(err) => {
                guard.roll_back();
                event!(Level::WARN, label = %label, error = %err, "optimistic update rolled back");
                match on_error {
                    ErrorHandling::Handle(hook) => hook(&err),
                    ErrorHandling::Notify => {
                        self.notifier.notify(Notification::error(err.user_message()))
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChannelNotifier;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn gated<T: Send + 'static>() -> (
        oneshot::Sender<Result<T>>,
        impl Future<Output = Result<T>>,
    ) {
        let (tx, rx) = oneshot::channel();
        let operation = async move {
            rx.await
                .unwrap_or_else(|_| Err(AdminError::Transport("operation dropped".to_string())))
        };
        (tx, operation)
    }

    #[tokio::test]
    async fn optimistic_state_is_visible_before_operation_settles() {
        let executor = OptimisticExecutor::new(10u32);
        let (tx, operation) = gated::<u32>();

        assert!(!executor.is_updating());
        let update = OptimisticUpdate::new(operation)
            .optimistic(|count: &mut u32| *count += 1)
            .rollback(|count: &mut u32| *count -= 1)
            .on_success(|count: &mut u32, confirmed: &u32| *count = *confirmed);

        let (outcome, ()) = tokio::join!(executor.execute(update), async {
            assert_eq!(executor.state().snapshot(), 11);
            assert!(executor.is_updating());
            tx.send(Ok(20)).unwrap();
        });

        assert_eq!(outcome.unwrap(), 20);
        assert_eq!(executor.state().snapshot(), 20);
        assert!(!executor.is_updating());
    }

    #[tokio::test]
    async fn failure_rolls_back_and_notifies_by_default() {
        let (notifier, mut toasts) = ChannelNotifier::new();
        let executor = OptimisticExecutor::new(vec!["rice"]).with_notifier(Arc::new(notifier));

        let update = OptimisticUpdate::new(async {
            Err::<(), _>(AdminError::Api {
                status: 422,
                detail: "Name is required".to_string(),
            })
        })
        .optimistic(|items: &mut Vec<&str>| items.push("noodles"))
        .rollback(|items: &mut Vec<&str>| {
            items.pop();
        });

        let err = executor.execute(update).await.unwrap_err();

        assert_eq!(err.status(), Some(422));
        assert_eq!(executor.state().snapshot(), vec!["rice"]);
        assert_eq!(
            toasts.try_recv().unwrap(),
            Notification::error("Name is required")
        );
        assert!(!executor.is_updating());
    }

    #[tokio::test]
    async fn error_hook_replaces_default_notification() {
        let (notifier, mut toasts) = ChannelNotifier::new();
        let executor = OptimisticExecutor::new(1u8).with_notifier(Arc::new(notifier));
        let handled = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&handled);

        let update = OptimisticUpdate::new(async {
            Err::<u8, _>(AdminError::Transport("timeout".to_string()))
        })
        .optimistic(|value: &mut u8| *value = 2)
        .rollback(|value: &mut u8| *value = 1)
        .on_error(move |err| *sink.lock().unwrap() = Some(err.clone()));

        assert!(executor.execute(update).await.is_err());
        assert_eq!(executor.state().snapshot(), 1);
        assert_eq!(
            *handled.lock().unwrap(),
            Some(AdminError::Transport("timeout".to_string()))
        );
        assert!(toasts.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_update_rolls_back_and_clears_flag() {
        let executor = OptimisticExecutor::new(String::from("draft"));
        let (_tx, operation) = gated::<()>();

        let update = OptimisticUpdate::new(operation)
            .optimistic(|text: &mut String| text.push_str(" (saving)"))
            .rollback(|text: &mut String| *text = String::from("draft"));

        {
            let pending = executor.execute(update);
            tokio::pin!(pending);
            let polled = futures::poll!(pending.as_mut());
            assert!(polled.is_pending());
            assert_eq!(executor.state().snapshot(), "draft (saving)");
            assert!(executor.is_updating());
        }

        assert_eq!(executor.state().snapshot(), "draft");
        assert!(!executor.is_updating());
    }

    #[tokio::test]
    async fn overlapping_updates_keep_flag_until_last_settles() {
        let executor = OptimisticExecutor::new(0i32);
        let (first_tx, first_op) = gated::<i32>();
        let (second_tx, second_op) = gated::<i32>();

        let first = executor.execute(OptimisticUpdate::new(first_op).optimistic(|n: &mut i32| *n += 1));
        let second = executor.execute(OptimisticUpdate::new(second_op).optimistic(|n: &mut i32| *n += 1));

        let (a, b, ()) = tokio::join!(first, second, async {
            assert_eq!(executor.updates().in_flight(), 2);
            first_tx.send(Ok(1)).unwrap();
            tokio::task::yield_now().await;
            assert!(executor.is_updating());
            second_tx.send(Ok(2)).unwrap();
        });

        assert_eq!((a.unwrap(), b.unwrap()), (1, 2));
        assert_eq!(executor.state().snapshot(), 2);
        assert!(!executor.is_updating());
    }
}
