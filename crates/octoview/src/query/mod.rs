//! Fetch coordination: caching, deduplication, and subscriptions.
//!
//! The coordinator sits between the remote data client and the presentation
//! layer. It guarantees at most one in-flight fetch per key, serves fresh
//! results from cache, gates requests on a non-blank handle, and cancels
//! superseded requests.

pub mod cache;
pub mod subscription;

use std::sync::Arc;

pub use cache::{QueryCache, FRESHNESS_WINDOW};
pub use subscription::{FetchFn, QueryStatus, Subscription};

use crate::cancel::CancelToken;
use crate::error::FetchError;
use crate::github::GitHubClient;
use crate::model::{Repository, UserProfile};

/// Coordinated access to a profile's user and repository data.
///
/// One cache per resource kind over a shared client, so the cache key is
/// effectively `(resource kind, handle)`.
pub struct ProfileStore {
    client: GitHubClient,
    users: Arc<QueryCache<UserProfile>>,
    repos: Arc<QueryCache<Vec<Repository>>>,
}

impl ProfileStore {
    pub fn new(client: GitHubClient) -> Self {
        Self {
            client,
            users: Arc::new(QueryCache::new()),
            repos: Arc::new(QueryCache::new()),
        }
    }

    /// Fetch (or serve from cache) the user profile for `handle`.
    ///
    /// A blank handle is disabled: `Ok(None)` with no network activity.
    pub async fn user(
        &self,
        handle: &str,
        cancel: &CancelToken,
    ) -> Result<Option<Arc<UserProfile>>, Arc<FetchError>> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Ok(None);
        }

        self.users
            .get_or_fetch(handle, || self.client.fetch_user(handle, cancel))
            .await
            .map(Some)
    }

    /// Fetch (or serve from cache) the repositories for `handle`.
    ///
    /// A blank handle is disabled: `Ok(None)` with no network activity.
    pub async fn repositories(
        &self,
        handle: &str,
        cancel: &CancelToken,
    ) -> Result<Option<Arc<Vec<Repository>>>, Arc<FetchError>> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Ok(None);
        }

        self.repos
            .get_or_fetch(handle, || self.client.fetch_repositories(handle, cancel))
            .await
            .map(Some)
    }

    /// A key-switchable subscription to user profiles.
    pub fn user_subscription(&self) -> Subscription<UserProfile> {
        let client = self.client.clone();
        let fetch: FetchFn<UserProfile> = Arc::new(move |handle, token| {
            let client = client.clone();
            Box::pin(async move { client.fetch_user(&handle, &token).await })
        });
        Subscription::new(Arc::clone(&self.users), fetch)
    }

    /// A key-switchable subscription to repository lists.
    pub fn repository_subscription(&self) -> Subscription<Vec<Repository>> {
        let client = self.client.clone();
        let fetch: FetchFn<Vec<Repository>> = Arc::new(move |handle, token| {
            let client = client.clone();
            Box::pin(async move { client.fetch_repositories(&handle, &token).await })
        });
        Subscription::new(Arc::clone(&self.repos), fetch)
    }
}
