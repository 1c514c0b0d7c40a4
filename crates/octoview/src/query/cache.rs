//! Keyed fetch cache with in-flight deduplication.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

use crate::error::FetchError;

/// How long a successful result is served without a new upstream call.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Shared outcome of a fetch, cheap to hand to every waiter.
pub type Outcome<T> = std::result::Result<Arc<T>, Arc<FetchError>>;

enum Slot<T> {
    /// A fetch is running; waiters attach to its outcome instead of issuing
    /// a duplicate request.
    InFlight {
        rx: watch::Receiver<Option<Outcome<T>>>,
        leader_id: u64,
    },
    /// A completed fetch. Served until the freshness window expires, then
    /// refetched (no stale-while-revalidate).
    Ready { value: Arc<T>, fetched_at: Instant },
}

enum Role<T> {
    Hit(Arc<T>),
    Follower(watch::Receiver<Option<Outcome<T>>>),
    Leader {
        tx: watch::Sender<Option<Outcome<T>>>,
        leader_id: u64,
    },
}

/// Map from key to cached or in-flight result.
///
/// The map is the only shared mutable state of the coordinator. It is
/// guarded by an async mutex and check-then-fetch happens under a single
/// lock acquisition, which preserves the at-most-one-in-flight-per-key
/// guarantee.
pub struct QueryCache<T> {
    entries: Mutex<HashMap<String, Slot<T>>>,
    ttl: Duration,
    next_leader_id: AtomicU64,
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new() -> Self {
        Self::with_ttl(FRESHNESS_WINDOW)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            next_leader_id: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, or run `fetch` to produce it.
    ///
    /// Exactly one fetch runs per key at a time; concurrent callers share
    /// the leader's outcome. Errors are never cached, so the next caller
    /// after a failure triggers a fresh fetch.
    ///
    /// A leader's cancellation is its own: a follower whose token did not
    /// fire loops back, claims the vacated slot and fetches itself, so it
    /// only ever resolves `Cancelled` from its own fetch. The same loop
    /// reclaims a slot whose leader future was dropped mid-fetch.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, mut fetch: F) -> Outcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::error::Result<T>>,
    {
        loop {
            match self.claim(key).await {
                Role::Hit(value) => {
                    tracing::debug!("cache hit for '{key}'");
                    return Ok(value);
                }
                Role::Follower(mut rx) => {
                    tracing::debug!("attaching to in-flight fetch for '{key}'");
                    match rx.wait_for(|outcome| outcome.is_some()).await {
                        Ok(outcome) => match outcome.clone() {
                            // The leader was cancelled but this caller was
                            // not; its slot is already cleared, so re-claim
                            // and fetch.
                            Some(Err(err)) if err.is_cancelled() => continue,
                            Some(outcome) => return outcome,
                            None => continue,
                        },
                        // The leader went away without publishing; re-claim.
                        Err(_) => continue,
                    }
                }
                Role::Leader { tx, leader_id } => {
                    let outcome: Outcome<T> = match fetch().await {
                        Ok(value) => Ok(Arc::new(value)),
                        Err(err) => Err(Arc::new(err)),
                    };
                    self.settle(key, leader_id, &outcome).await;
                    let _ = tx.send(Some(outcome.clone()));
                    return outcome;
                }
            }
        }
    }

    /// Drop any cached value for `key`. In-flight fetches are untouched.
    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        if matches!(entries.get(key), Some(Slot::Ready { .. })) {
            entries.remove(key);
        }
    }

    /// Single atomic check-then-fetch step.
    async fn claim(&self, key: &str) -> Role<T> {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(Slot::Ready { value, fetched_at }) if fetched_at.elapsed() < self.ttl => {
                return Role::Hit(Arc::clone(value));
            }
            Some(Slot::InFlight { rx, .. }) => {
                // A leader whose future was dropped mid-fetch never settles
                // its slot; its sender side is gone with no published
                // outcome. Treat that slot as vacant and take leadership
                // instead of attaching to a dead channel.
                let leader_gone = rx.has_changed().is_err() && rx.borrow().is_none();
                if !leader_gone {
                    return Role::Follower(rx.clone());
                }
            }
            _ => {}
        }

        let (tx, rx) = watch::channel(None);
        let leader_id = self.next_leader_id.fetch_add(1, Ordering::Relaxed);
        entries.insert(key.to_string(), Slot::InFlight { rx, leader_id });
        Role::Leader { tx, leader_id }
    }

    /// Replace this leader's in-flight slot with the outcome.
    async fn settle(&self, key: &str, leader_id: u64, outcome: &Outcome<T>) {
        let mut entries = self.entries.lock().await;

        // Only touch the slot if it is still ours.
        let ours = matches!(
            entries.get(key),
            Some(Slot::InFlight { leader_id: id, .. }) if *id == leader_id
        );
        if !ours {
            return;
        }

        match outcome {
            Ok(value) => {
                entries.insert(
                    key.to_string(),
                    Slot::Ready {
                        value: Arc::clone(value),
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(_) => {
                entries.remove(key);
            }
        }
    }
}

impl<T: Send + Sync + 'static> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
