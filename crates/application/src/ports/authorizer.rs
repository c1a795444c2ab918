//! Authorizer and token source ports.
//!
//! An [`Authorizer`] is what callers receive from an auth method: it produces
//! the headers for the next outbound request and owns token refresh.
//! A [`TokenSource`] is the lower-level handle returned by the client-credentials
//! identity path; it may or may not be usable as an authorizer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use azauth_domain::{AccessToken, AuthHeader, TokenStatus};

use crate::context::AuthContext;
use crate::error::AuthResult;

/// Boxed future used by the authentication ports.
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = AuthResult<T>> + Send + 'a>>;

/// Trait for objects that attach credentials to outbound requests.
pub trait Authorizer: Send + Sync {
    /// Headers to attach to the next request.
    ///
    /// Implementations refresh their tokens when needed. The context bounds any
    /// network activity this triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if a token cannot be obtained.
    fn authorization_headers<'a>(&'a self, ctx: &'a AuthContext) -> AuthFuture<'a, Vec<AuthHeader>>;

    /// Status of the primary cached token, or `None` before the first fetch.
    fn token_status(&self) -> Pin<Box<dyn Future<Output = Option<TokenStatus>> + Send + '_>> {
        Box::pin(std::future::ready(None))
    }
}

/// Trait for sources of access tokens.
pub trait TokenSource: Send + Sync {
    /// Returns a valid token, fetching a new one when the cached one is expiring.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint cannot be reached or rejects the request.
    fn token(&self) -> AuthFuture<'_, AccessToken>;

    /// Exposes this source as an [`Authorizer`] when it supports that capability.
    fn as_authorizer(self: Arc<Self>) -> Option<Arc<dyn Authorizer>> {
        None
    }
}
