//! Cooperative cancellation for in-flight fetches.
//!
//! A [`CancelScope`] is held by whoever owns a request's lifetime (a
//! subscription, or the CLI's Ctrl+C handler). Dropping the scope or calling
//! [`CancelScope::cancel`] fires every [`CancelToken`] derived from it.
//! Cancellation is advisory to the transport (the request future is dropped,
//! aborting the connection) and mandatory at the application layer: a result
//! that arrives after cancellation is discarded.

use tokio::sync::watch;

/// Owning side of a cancellation pair.
///
/// Cancels on drop, so tying a scope to a subscription's current key gives
/// cancel-on-key-change for free.
#[derive(Debug)]
pub struct CancelScope {
    tx: watch::Sender<bool>,
}

impl CancelScope {
    /// Create a new, un-cancelled scope.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Derive a token observing this scope.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Fire the scope explicitly.
    pub fn cancel(&self) {
        let _ = self.tx.send_replace(true);
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        let _ = self.tx.send_replace(true);
    }
}

/// Observing side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct CancelToken {
    /// `None` means the token can never fire.
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that never cancels, for call sites without a lifetime owner.
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Whether the scope has fired (or was dropped).
    pub fn is_cancelled(&self) -> bool {
        match &self.rx {
            // The scope's Drop impl sends `true` before the channel closes,
            // so the last observed value is authoritative.
            Some(rx) => *rx.borrow(),
            None => false,
        }
    }

    /// Resolves once the scope fires or is dropped. Pends forever for
    /// [`CancelToken::never`].
    pub async fn cancelled(&self) {
        match self.rx.clone() {
            Some(mut rx) => {
                // A closed channel means the scope was dropped, which counts
                // as cancellation.
                let _ = rx.wait_for(|cancelled| *cancelled).await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
