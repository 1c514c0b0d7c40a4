//! Raw GitHub API payloads.
//!
//! These mirror the upstream field names exactly; normalization into the
//! internal model happens in [`super::convert`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /users/{handle}` response body, limited to the fields we consume.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

/// One element of the `GET /users/{handle}/repos` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
    /// Absent when the token scope does not include topics.
    pub topics: Option<Vec<String>>,
}

/// Rate limit signals parsed from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Remaining requests in the current window.
    pub remaining: u64,
    /// Unix epoch seconds at which the window resets.
    pub reset_epoch: i64,
}

impl RateLimitHeaders {
    /// The reset instant, falling back to "now" on a malformed epoch.
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset_epoch, 0).unwrap_or_else(Utc::now)
    }
}
