//! Normalization from GitHub API payloads to the internal model.

use super::types::{ApiRepo, ApiUser};
use crate::model::{Repository, UserProfile};

/// Treat empty strings as absent.
///
/// GitHub sends `""` for unset profile fields such as `blog`; the model
/// keeps an explicit `None` instead.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Convert a raw API user into a [`UserProfile`].
///
/// A missing display name falls back to the login; all other absent
/// optionals stay absent.
pub fn to_user_profile(user: ApiUser) -> UserProfile {
    let name = non_empty(user.name).unwrap_or_else(|| user.login.clone());

    UserProfile {
        login: user.login,
        name,
        avatar_url: user.avatar_url,
        bio: non_empty(user.bio),
        location: non_empty(user.location),
        company: non_empty(user.company),
        blog: non_empty(user.blog),
        twitter: non_empty(user.twitter_username),
        public_repos: user.public_repos,
        followers: user.followers,
        following: user.following,
        html_url: user.html_url,
        created_at: user.created_at,
    }
}

/// Convert a raw API repository into a [`Repository`].
///
/// A missing topics list becomes an empty vec.
pub fn to_repository(repo: ApiRepo) -> Repository {
    Repository {
        id: repo.id,
        name: repo.name,
        full_name: repo.full_name,
        description: non_empty(repo.description),
        html_url: repo.html_url,
        stars: repo.stargazers_count,
        forks: repo.forks_count,
        language: non_empty(repo.language),
        updated_at: repo.updated_at,
        topics: repo.topics.unwrap_or_default(),
    }
}
