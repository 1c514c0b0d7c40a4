//! GitHub REST API integration.
//!
//! [`client::GitHubClient`] is the remote data client: it issues the HTTP
//! calls, applies the retry policy, detects rate limiting from response
//! headers, and normalizes raw payloads into the [`crate::model`] types.

pub mod client;
pub mod convert;
pub mod types;

pub use client::{GitHubClient, DEFAULT_API_URL};
