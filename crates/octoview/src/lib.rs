//! Octoview - a GitHub profile and repository viewer.
//!
//! This library fetches a GitHub user's profile and repositories, coordinates
//! the fetches through a deduplicating cache with a freshness window, and
//! turns the repository list into filtered, sorted, paginated views.
//!
//! # Example
//!
//! ```ignore
//! use octoview::{CancelToken, FilterCriteria, GitHubClient, ProfileStore};
//!
//! let store = ProfileStore::new(GitHubClient::new(None)?);
//! let cancel = CancelToken::never();
//!
//! let profile = store.user("octocat", &cancel).await?;
//! let repos = store.repositories("octocat", &cancel).await?;
//!
//! if let Some(repos) = repos {
//!     let page = octoview::view(&repos, &FilterCriteria::default());
//!     println!("{} repositories", page.total_count);
//! }
//! ```

pub mod cancel;
pub mod error;
pub mod github;
pub mod http;
pub mod model;
pub mod query;
pub mod view;

pub use cancel::{CancelScope, CancelToken};
pub use error::{FetchError, Result};
pub use github::{GitHubClient, DEFAULT_API_URL};
pub use model::{Repository, UserProfile};
pub use query::{ProfileStore, QueryStatus, Subscription};
pub use view::{view, FilterCriteria, LanguageFilter, RepoView, SortKey, PAGE_SIZE};
