//! Error taxonomy for remote fetches.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Errors produced by the remote data client and surfaced through the
/// coordinator.
///
/// Display strings are the user-facing messages; the presentation layer
/// renders them verbatim and never inspects variants beyond that.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The user lookup returned 404.
    #[error("User '{0}' not found. Please check the username and try again.")]
    UserNotFound(String),

    /// The repository listing returned 404.
    #[error("Repositories for '{0}' not found.")]
    RepositoriesNotFound(String),

    /// The API quota is exhausted. Never retried automatically.
    #[error("Rate limit exceeded. Resets at {reset_at}.")]
    RateLimited { reset_at: DateTime<Utc> },

    /// A 5xx response or a network timeout. Retried up to the budget.
    #[error("Failed to fetch data. Please try again. ({message})")]
    Transient { message: String },

    /// The request was superseded or aborted. Swallowed by the coordinator,
    /// never shown to the user.
    #[error("Request cancelled")]
    Cancelled,

    /// Anything else. Surfaced as a generic message.
    #[error("Unexpected error: {message}")]
    Unknown { message: String },
}

impl FetchError {
    /// Create a transient error.
    #[inline]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Create an unknown error.
    #[inline]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Whether the retry loop may re-issue the request.
    ///
    /// Only transient failures qualify; rate limiting, 404s and cancellation
    /// are terminal.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Whether this is a cancellation.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Time left until the quota resets, clamped to zero.
    ///
    /// Returns `None` for non-rate-limit errors.
    pub fn wait_until_reset(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Self::RateLimited { reset_at } => Some((*reset_at - now).max(Duration::zero())),
            _ => None,
        }
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(FetchError::transient("503").is_retryable());
        assert!(!FetchError::UserNotFound("octocat".into()).is_retryable());
        assert!(!FetchError::Cancelled.is_retryable());
        assert!(
            !FetchError::RateLimited {
                reset_at: Utc::now()
            }
            .is_retryable()
        );
        assert!(!FetchError::unknown("boom").is_retryable());
    }

    #[test]
    fn wait_until_reset_clamps_to_zero() {
        let now = Utc::now();

        let future = FetchError::RateLimited {
            reset_at: now + Duration::seconds(90),
        };
        assert_eq!(future.wait_until_reset(now), Some(Duration::seconds(90)));

        let past = FetchError::RateLimited {
            reset_at: now - Duration::seconds(5),
        };
        assert_eq!(past.wait_until_reset(now), Some(Duration::zero()));

        assert_eq!(FetchError::Cancelled.wait_until_reset(now), None);
    }

    #[test]
    fn display_messages_are_user_facing() {
        let err = FetchError::UserNotFound("octocat".into());
        assert!(err.to_string().contains("octocat"));

        let err = FetchError::transient("connection reset");
        assert!(err.to_string().contains("try again"));
    }
}
