//! Cancellation and deadlines for token acquisition.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AuthError, AuthResult};

/// Cancellation token plus optional deadline.
///
/// There is no implicit default: callers that never want to cancel pass
/// [`AuthContext::background`] explicitly.
#[derive(Debug, Clone)]
pub struct AuthContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl AuthContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::new(CancellationToken::new())
    }

    /// A context driven by the given cancellation token.
    #[must_use]
    pub const fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            deadline: None,
        }
    }

    /// Sets a deadline, keeping the earlier one if a deadline is already set.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once the context has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Runs `operation` until it completes, the context is cancelled or the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Cancelled`] or [`AuthError::Timeout`], or the operation's own error.
    pub async fn run<T, F>(&self, operation: F) -> AuthResult<T>
    where
        F: Future<Output = AuthResult<T>>,
    {
        if self.is_cancelled() {
            return Err(AuthError::Cancelled);
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(AuthError::Cancelled),
            () = deadline => Err(AuthError::Timeout),
            result = operation => result,
        }
    }
}
