//! Key-driven subscriptions over a [`QueryCache`].
//!
//! A subscription tracks one active key (the handle being viewed), cancels
//! the previous key's fetch whenever the key changes, and publishes a
//! three-state status to subscribers. A slow response for an old key can
//! never overwrite the state of the current key: outcomes are guarded by a
//! generation counter and discarded when stale.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::cache::QueryCache;
use crate::cancel::{CancelScope, CancelToken};
use crate::error::FetchError;

/// Snapshot of a query's state as seen by the presentation layer.
#[derive(Debug)]
pub struct QueryStatus<T> {
    /// The fetched value, absent while loading, on error, or when disabled.
    pub data: Option<Arc<T>>,
    /// Whether a fetch is in progress.
    pub is_loading: bool,
    /// The surfaced error, if the last fetch failed. Never `Cancelled`.
    pub error: Option<Arc<FetchError>>,
}

// Manual impl: the fields are `Arc`s and a bool, so snapshots are cheap to
// clone even when `T` itself is not `Clone`.
impl<T> Clone for QueryStatus<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }
}

impl<T> QueryStatus<T> {
    /// Disabled or not-yet-keyed state.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }

    pub fn ready(data: Arc<T>) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }

    pub fn failed(error: Arc<FetchError>) -> Self {
        Self {
            data: None,
            is_loading: false,
            error: Some(error),
        }
    }
}

/// Fetch function invoked for a key, observing a cancellation token.
pub type FetchFn<T> = Arc<
    dyn Fn(String, CancelToken) -> Pin<Box<dyn Future<Output = crate::error::Result<T>> + Send>>
        + Send
        + Sync,
>;

struct ActiveKey {
    /// Cancels the in-flight fetch when replaced or dropped.
    scope: Option<CancelScope>,
    /// Increments on every key change; stale outcomes compare unequal.
    generation: u64,
}

struct Inner<T> {
    cache: Arc<QueryCache<T>>,
    fetch: FetchFn<T>,
    state: watch::Sender<QueryStatus<T>>,
    active: Mutex<ActiveKey>,
}

/// A live view of one (resource, key) pair.
///
/// Dropping the subscription cancels any outstanding fetch for its key.
pub struct Subscription<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub fn new(cache: Arc<QueryCache<T>>, fetch: FetchFn<T>) -> Self {
        let (state, _) = watch::channel(QueryStatus::idle());
        Self {
            inner: Arc::new(Inner {
                cache,
                fetch,
                state,
                active: Mutex::new(ActiveKey {
                    scope: None,
                    generation: 0,
                }),
            }),
        }
    }

    /// Subscribe to status updates.
    pub fn subscribe(&self) -> watch::Receiver<QueryStatus<T>> {
        self.inner.state.subscribe()
    }

    /// Current status snapshot.
    pub fn status(&self) -> QueryStatus<T> {
        self.inner.state.borrow().clone()
    }

    /// Switch the active key.
    ///
    /// A blank key disables the subscription: no network activity, idle
    /// status. Otherwise the previous key's fetch is cancelled and a fetch
    /// for the new key starts (served from cache when fresh). Must be called
    /// from within a tokio runtime.
    pub fn set_key(&self, key: &str) {
        let key = key.trim().to_string();

        let (token, generation) = {
            let mut active = self
                .inner
                .active
                .lock()
                .expect("subscription lock should not be poisoned");
            active.generation += 1;

            // Replacing the scope drops the old one, cancelling the
            // previous key's in-flight fetch.
            if key.is_empty() {
                active.scope = None;
                (None, active.generation)
            } else {
                let scope = CancelScope::new();
                let token = scope.token();
                active.scope = Some(scope);
                (Some(token), active.generation)
            }
        };

        let Some(token) = token else {
            let _ = self.inner.state.send(QueryStatus::idle());
            return;
        };

        let _ = self.inner.state.send(QueryStatus::loading());

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let fetch = Arc::clone(&inner.fetch);
            let fetch_key = key.clone();
            let outcome = inner
                .cache
                .get_or_fetch(&key, move || fetch(fetch_key.clone(), token.clone()))
                .await;

            inner.publish(generation, outcome);
        });
    }
}

impl<T> Inner<T> {
    /// Apply an outcome unless it belongs to a superseded key.
    fn publish(&self, generation: u64, outcome: super::cache::Outcome<T>) {
        let active = self
            .active
            .lock()
            .expect("subscription lock should not be poisoned");
        if active.generation != generation {
            tracing::debug!("discarding stale outcome for superseded key");
            return;
        }

        match outcome {
            Ok(value) => {
                let _ = self.state.send(QueryStatus::ready(value));
            }
            // Cancellations are swallowed, never surfaced to subscribers.
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                let _ = self.state.send(QueryStatus::failed(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fetch fn resolving each key to its value after a per-key delay,
    /// aborting early when the token fires.
    fn delayed_fetch(
        delays: HashMap<String, Duration>,
        calls: Arc<AtomicUsize>,
    ) -> FetchFn<String> {
        Arc::new(move |key, token| {
            let delay = delays.get(&key).copied().unwrap_or(Duration::ZERO);
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::select! {
                    _ = token.cancelled() => Err(FetchError::Cancelled),
                    _ = tokio::time::sleep(delay) => Ok(format!("profile:{key}")),
                }
            })
        })
    }

    async fn wait_for_settled(
        rx: &mut watch::Receiver<QueryStatus<String>>,
    ) -> QueryStatus<String> {
        let status = rx
            .wait_for(|s| !s.is_loading)
            .await
            .expect("subscription alive");
        status.clone()
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_and_publishes_data_for_a_key() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new(
            cache,
            delayed_fetch(
                HashMap::from([("alice".to_string(), Duration::from_secs(1))]),
                Arc::clone(&calls),
            ),
        );
        let mut rx = sub.subscribe();

        sub.set_key("alice");
        assert!(sub.status().is_loading);

        let status = wait_for_settled(&mut rx).await;
        assert_eq!(status.data.as_deref(), Some(&"profile:alice".to_string()));
        assert!(status.error.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_keys_are_disabled_and_fetch_nothing() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new(cache, delayed_fetch(HashMap::new(), Arc::clone(&calls)));

        sub.set_key("   ");
        tokio::task::yield_now().await;

        let status = sub.status();
        assert!(status.data.is_none());
        assert!(!status.is_loading);
        assert!(status.error.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_keys_discards_the_stale_outcome() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        // alice is slow, bob is fast: the late-arrival race from the
        // upstream's perspective.
        let sub = Subscription::new(
            cache,
            delayed_fetch(
                HashMap::from([
                    ("alice".to_string(), Duration::from_secs(30)),
                    ("bob".to_string(), Duration::from_secs(1)),
                ]),
                Arc::clone(&calls),
            ),
        );
        let mut rx = sub.subscribe();

        sub.set_key("alice");
        tokio::task::yield_now().await;
        sub.set_key("bob");

        let status = wait_for_settled(&mut rx).await;
        assert_eq!(status.data.as_deref(), Some(&"profile:bob".to_string()));

        // Let alice's (cancelled) fetch wind down fully; bob must survive.
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;

        let status = sub.status();
        assert_eq!(status.data.as_deref(), Some(&"profile:bob".to_string()));
        assert!(status.error.is_none(), "cancelled fetch must stay silent");
    }

    #[tokio::test]
    async fn status_snapshots_do_not_require_cloneable_data() {
        // Deliberately not Clone; snapshots share it through the Arc.
        #[derive(Debug)]
        struct Payload(&'static str);

        let cache = Arc::new(QueryCache::new());
        let fetch: FetchFn<Payload> =
            Arc::new(|_key, _token| Box::pin(async { Ok(Payload("octocat")) }));
        let sub = Subscription::new(cache, fetch);
        let mut rx = sub.subscribe();

        sub.set_key("alice");
        let status = rx
            .wait_for(|s| !s.is_loading)
            .await
            .expect("subscription alive")
            .clone();
        assert_eq!(status.data.expect("data published").0, "octocat");
        assert!(!sub.status().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_surface_but_cancellations_do_not() {
        let cache = Arc::new(QueryCache::new());
        let fetch: FetchFn<String> = Arc::new(|_key, _token| {
            Box::pin(async { Err(FetchError::transient("upstream down")) })
        });
        let sub = Subscription::new(cache, fetch);
        let mut rx = sub.subscribe();

        sub.set_key("alice");
        let status = wait_for_settled(&mut rx).await;
        assert!(status.data.is_none());
        let err = status.error.expect("error surfaced");
        assert!(err.to_string().contains("try again"));
    }
}
