use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{Level, event};

type Callback<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>;

/// Coalesces bursts of calls into one delayed invocation.
///
/// Every [`call`](Debouncer::call) cancels the pending timer and arms a new
/// one, so only the last call inside a quiet window reaches the callback.
/// Once the timer fires the callback runs on its own task and is never
/// interrupted by later calls. Dropping the debouncer cancels a pending call.
///
/// Timers run on the runtime the debouncer was created in, so `call` also
/// works from threads outside it. A debouncer created outside any runtime
/// falls back to the caller's runtime and drops calls made without one.
pub struct Debouncer<A> {
    callback: Callback<A>,
    delay: Duration,
    runtime: Option<Handle>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Wraps `callback` so that it fires `delay` after the last call.
pub fn debounce<A, F, Fut>(callback: F, delay: Duration) -> Debouncer<A>
where
    A: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Debouncer::new(callback, delay)
}

impl<A> Debouncer<A>
where
    A: Send + 'static,
{
    pub fn new<F, Fut>(callback: F, delay: Duration) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            callback: Arc::new(move |args: A| callback(args).boxed()),
            delay,
            runtime: Handle::try_current().ok(),
            pending: Mutex::new(None),
        }
    }

    /// Runs timers and callbacks on `runtime`.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn call(&self, args: A) {
        let Some(runtime) = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            event!(Level::WARN, "debounced call dropped: no tokio runtime");
            return;
        };

        let callback = Arc::clone(&self.callback);
        let delay = self.delay;
        let timer = runtime.spawn(async move {
            sleep(delay).await;
            tokio::spawn(callback(args));
        });

        if let Some(previous) = self.pending().replace(timer) {
            previous.abort();
        }
    }

    /// Drops the scheduled call, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.pending().take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}
