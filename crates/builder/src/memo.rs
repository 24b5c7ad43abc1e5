//! Request-coalescing memoization for a zero-argument async producer.

use crate::error::{ErrorKind, Result};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// Nobody has asked yet.
    Idle,
    /// The producer has started; callers wait on it.
    InFlight,
    Resolved,
    /// The producer failed. The failure is kept and handed to every later
    /// caller; there is no retry.
    Failed,
}

type Outcome<T> = std::result::Result<Arc<T>, ErrorKind>;

/// Runs its producer at most once, however many callers race for it.
///
/// The memo owns the producer's future, so a caller that is dropped while
/// waiting doesn't abandon the run: the next caller picks it up where it
/// left off. Every caller receives the same value (shared through an
/// [`Arc`]) or the same [`ErrorKind`]. The full error tree of a failure is
/// logged once, when it happens.
pub struct Memo<T> {
    name: &'static str,
    run: Mutex<Option<Shared<BoxFuture<'static, Outcome<T>>>>>,
}

impl<T: Send + Sync + 'static> Memo<T> {
    pub fn new(name: &'static str) -> Self {
        Self { name, run: Mutex::new(None) }
    }

    pub fn state(&self) -> MemoState {
        match self.run.lock().unwrap_or_else(PoisonError::into_inner).as_ref().map(Shared::peek) {
            None => MemoState::Idle,
            Some(None) => MemoState::InFlight,
            Some(Some(Ok(_))) => MemoState::Resolved,
            Some(Some(Err(_))) => MemoState::Failed,
        }
    }

    /// Return the memoized value, starting `producer` if this is the first
    /// call. Later callers' producers are dropped without being run.
    pub async fn get_or_fetch<F, Fut>(&self, producer: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let run = self
            .run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(|| {
                let name = self.name;
                let pending = producer();
                tracing::debug!(memo = name, "Running memoized producer");
                async move {
                    match pending.await {
                        Ok(value) => Ok(Arc::new(value)),
                        Err(err) => {
                            tracing::warn!(memo = name, error = ?err, "Memoized producer failed");
                            Err((*err).clone())
                        },
                    }
                }
                .boxed()
                .shared()
            })
            .clone();
        run.await.map_err(exn::Exn::from)
    }
}
