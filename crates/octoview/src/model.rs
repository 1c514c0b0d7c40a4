//! Normalized domain types for a viewed profile.
//!
//! These are the internal representations produced by the remote data client.
//! They are immutable once fetched; a refetch replaces a value wholesale.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identity data for a GitHub user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    /// Unique username (handle).
    pub login: String,
    /// Display name. Falls back to the login when GitHub has none.
    pub name: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// User bio, if set.
    pub bio: Option<String>,
    /// Location, if set.
    pub location: Option<String>,
    /// Company, if set.
    pub company: Option<String>,
    /// Website / blog URL, if set.
    pub blog: Option<String>,
    /// Twitter handle, if set.
    pub twitter: Option<String>,
    /// Number of public repositories.
    pub public_repos: u64,
    /// Follower count.
    pub followers: u64,
    /// Following count.
    pub following: u64,
    /// Profile page URL.
    pub html_url: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// A single repository owned by the viewed user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repository {
    /// Upstream-unique numeric id.
    pub id: i64,
    /// Repository name.
    pub name: String,
    /// Fully qualified `owner/name`.
    pub full_name: String,
    /// Description, if set.
    pub description: Option<String>,
    /// Repository page URL.
    pub html_url: String,
    /// Star count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
    /// Primary language, if GitHub detected one.
    pub language: Option<String>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Topic tags, possibly empty.
    pub topics: Vec<String>,
}
