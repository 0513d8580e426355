use crate::core::Result;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{Level, event};

type SharedCall<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Deduplicates concurrent calls that share a key.
///
/// The first caller for a key starts the operation; everyone who arrives
/// while it is still running awaits the same shared future and observes the
/// identical value or error. The registration is dropped as soon as the
/// operation settles, so the next call for the key starts a fresh execution.
///
/// There is no timeout: a hung operation blocks every caller of its key.
pub struct SingleFlight<T> {
    calls: Arc<Mutex<HashMap<String, SharedCall<T>>>>,
}

impl<T> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs `operation` under `key`, or joins the call already in flight.
    ///
    /// `operation` is only invoked when no call for `key` is outstanding. It
    /// must not re-enter this coordinator before returning its future.
    pub async fn run<F, Fut>(&self, key: &str, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let call = {
            let mut calls = lock_calls(&self.calls);
            match calls.get(key) {
                Some(existing) => {
                    event!(Level::DEBUG, key = %key, "joining in-flight call");
                    existing.clone()
                }
                None => {
                    let registry = Arc::clone(&self.calls);
                    let owned_key = key.to_string();
                    let pending = operation();
                    let call = async move {
                        let outcome = pending.await;
                        lock_calls(&registry).remove(&owned_key);
                        outcome
                    }
                    .boxed()
                    .shared();
                    calls.insert(key.to_string(), call.clone());
                    call
                }
            }
        };

        call.await
    }

    pub fn in_flight(&self, key: &str) -> bool {
        lock_calls(&self.calls).contains_key(key)
    }

    /// Number of keys with an outstanding call.
    pub fn len(&self) -> usize {
        lock_calls(&self.calls).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Critical sections are plain map operations, so a poisoned map is still consistent.
fn lock_calls<T>(
    calls: &Mutex<HashMap<String, SharedCall<T>>>,
) -> MutexGuard<'_, HashMap<String, SharedCall<T>>> {
    calls.lock().unwrap_or_else(PoisonError::into_inner)
}
