//! Remote data client for the GitHub REST API.

use std::sync::Arc;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};

use super::convert::{to_repository, to_user_profile};
use super::types::{ApiRepo, ApiUser, RateLimitHeaders};
use crate::cancel::CancelToken;
use crate::error::{FetchError, Result};
use crate::http::{header_get, HttpError, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::model::{Repository, UserProfile};

/// Base endpoint for the public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Total attempts per request, including the first.
pub const MAX_ATTEMPTS: usize = 3;

/// Fixed delay between attempts. Constant rather than exponential: the retry
/// volume is tiny and the dominant failure mode (rate limiting) is never
/// retried at all.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Transport-level request deadline for the default reqwest transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "octoview";

/// Client for the two profile endpoints.
///
/// All I/O goes through an [`HttpTransport`], which tests replace with an
/// in-memory mock. The client owns the retry policy, rate-limit detection
/// and payload normalization; caching and deduplication live in
/// [`crate::query`].
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client backed by a real reqwest transport.
    pub fn new(token: Option<String>) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)
            .map_err(|e| FetchError::unknown(e.to_string()))?;
        Ok(Self::with_transport(
            Arc::new(transport),
            DEFAULT_API_URL,
            token,
        ))
    }

    /// Override the API base URL, e.g. for a GitHub Enterprise host.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a client over an arbitrary transport and base URL.
    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        api_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            transport,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Fetch a user's identity data.
    ///
    /// `GET /users/{handle}`. A 404 maps to [`FetchError::UserNotFound`].
    pub async fn fetch_user(&self, handle: &str, cancel: &CancelToken) -> Result<UserProfile> {
        let route = format!("/users/{handle}");
        let not_found = FetchError::UserNotFound(handle.to_string());
        let resp = self.get_with_retry(&route, not_found, cancel).await?;

        let raw: ApiUser = serde_json::from_slice(&resp.body)
            .map_err(|e| FetchError::unknown(format!("user payload parse error: {e}")))?;
        Ok(to_user_profile(raw))
    }

    /// Fetch a user's public repositories.
    ///
    /// Requests the maximum page size, pre-sorted by recency descending so
    /// the default view order needs no client-side work. A 404 maps to
    /// [`FetchError::RepositoriesNotFound`].
    pub async fn fetch_repositories(
        &self,
        handle: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Repository>> {
        let route = format!("/users/{handle}/repos?per_page=100&sort=updated&direction=desc");
        let not_found = FetchError::RepositoriesNotFound(handle.to_string());
        let resp = self.get_with_retry(&route, not_found, cancel).await?;

        let raw: Vec<ApiRepo> = serde_json::from_slice(&resp.body)
            .map_err(|e| FetchError::unknown(format!("repo payload parse error: {e}")))?;
        Ok(raw.into_iter().map(to_repository).collect())
    }

    /// Issue a GET with the fixed retry budget, racing the caller's
    /// cancellation token.
    ///
    /// Cancellation drops the in-flight attempt (aborting the connection for
    /// the reqwest transport) and is never retried or re-classified.
    async fn get_with_retry(
        &self,
        route: &str,
        not_found: FetchError,
        cancel: &CancelToken,
    ) -> Result<HttpResponse> {
        let backoff = ConstantBuilder::default()
            .with_delay(RETRY_DELAY)
            .with_max_times(MAX_ATTEMPTS - 1);

        let attempt = || self.attempt(route, not_found.clone());
        let retried = attempt
            .retry(backoff)
            .when(FetchError::is_retryable)
            .notify(|err, dur| {
                tracing::debug!("transient failure on {route}, retrying in {dur:?}: {err}");
            });

        tokio::select! {
            // Biased so a token that fired before the call never issues I/O.
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = retried => result,
        }
    }

    /// One attempt: send, inspect rate-limit headers, map the status code.
    async fn attempt(&self, route: &str, not_found: FetchError) -> Result<HttpResponse> {
        let resp = self
            .transport
            .get(self.request(route))
            .await
            .map_err(|e| match e {
                HttpError::Timeout(msg) => FetchError::transient(format!("timeout: {msg}")),
                other => FetchError::unknown(other.to_string()),
            })?;

        // Quota exhaustion wins over everything else, success included.
        if let Some(limits) = parse_rate_limit(&resp) {
            if limits.remaining == 0 {
                return Err(FetchError::RateLimited {
                    reset_at: limits.reset_at(),
                });
            }
        }

        match resp.status {
            200 => Ok(resp),
            404 => Err(not_found),
            status if status >= 500 => Err(FetchError::transient(format!("HTTP {status}"))),
            status => Err(FetchError::unknown(format!("unexpected HTTP {status}"))),
        }
    }

    fn request(&self, route: &str) -> HttpRequest {
        let mut headers = vec![
            (
                "Accept".to_string(),
                "application/vnd.github.v3+json".to_string(),
            ),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        HttpRequest {
            url: format!("{}{}", self.api_url, route),
            headers,
        }
    }
}

/// Extract rate-limit signals from response headers, if present.
fn parse_rate_limit(resp: &HttpResponse) -> Option<RateLimitHeaders> {
    let remaining = header_get(&resp.headers, "x-ratelimit-remaining")?
        .parse::<u64>()
        .ok()?;
    let reset_epoch = header_get(&resp.headers, "x-ratelimit-reset")?
        .parse::<i64>()
        .ok()?;
    Some(RateLimitHeaders {
        remaining,
        reset_epoch,
    })
}
