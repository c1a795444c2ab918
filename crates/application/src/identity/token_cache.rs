//! Single-slot token cache with expiry tracking.

use std::future::Future;
use std::sync::Arc;

use azauth_domain::{AccessToken, TokenStatus};
use tokio::sync::RwLock;

use crate::error::AuthResult;

/// Seconds before expiry at which a cached token is considered stale.
pub const DEFAULT_REFRESH_BUFFER_SECONDS: i64 = 300;

/// Thread-safe holder for one cached token.
#[derive(Debug, Clone)]
pub struct TokenCache {
    token: Arc<RwLock<Option<AccessToken>>>,
    refresh_buffer_seconds: i64,
}

impl TokenCache {
    /// Create an empty cache with the default refresh buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_refresh_buffer(DEFAULT_REFRESH_BUFFER_SECONDS)
    }

    /// Create an empty cache with a custom refresh buffer.
    #[must_use]
    pub fn with_refresh_buffer(refresh_buffer_seconds: i64) -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            refresh_buffer_seconds,
        }
    }

    /// The cached token, whatever its state.
    pub async fn get(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }

    /// The cached token unless it is inside the refresh window.
    pub async fn get_fresh(&self) -> Option<AccessToken> {
        let token = self.token.read().await;
        token
            .as_ref()
            .filter(|t| !t.is_expired_or_expiring(self.refresh_buffer_seconds))
            .cloned()
    }

    /// Replace the cached token.
    pub async fn store(&self, token: AccessToken) {
        *self.token.write().await = Some(token);
    }

    /// Drop the cached token.
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    /// Returns the fresh cached token, or runs `refresh` and caches its result.
    ///
    /// Concurrent callers serialize on the write lock; whoever gets it second
    /// sees the token the first one stored and does not refresh again.
    ///
    /// # Errors
    ///
    /// Propagates the refresh error; the cache is left untouched.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> AuthResult<AccessToken>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AuthResult<AccessToken>>,
    {
        if let Some(token) = self.get_fresh().await {
            return Ok(token);
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot
            .as_ref()
            .filter(|t| !t.is_expired_or_expiring(self.refresh_buffer_seconds))
        {
            return Ok(token.clone());
        }

        let token = refresh().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Status of the cached token, or None when nothing is cached.
    pub async fn status(&self) -> Option<TokenStatus> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| t.status(self.refresh_buffer_seconds))
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}
