//! Service principal tokens for the v1 token endpoint.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use azauth_domain::{AccessToken, DomainError, MultiTenantOAuthEndpoints, OAuthEndpoints, TokenStatus};

use super::exchange::request_token;
use super::token_cache::TokenCache;
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::ports::Sender;

/// A client-secret service principal token for one tenant and one resource.
pub struct ServicePrincipalToken {
    endpoints: OAuthEndpoints,
    client_id: String,
    secret: String,
    resource: String,
    sender: RwLock<Option<Arc<dyn Sender>>>,
    cache: TokenCache,
}

impl ServicePrincipalToken {
    /// Creates a token that will authenticate `client_id` with `secret` for `resource`.
    ///
    /// # Errors
    ///
    /// Fails when the client id, secret or resource is empty.
    pub fn new(
        endpoints: OAuthEndpoints,
        client_id: impl Into<String>,
        secret: impl Into<String>,
        resource: impl Into<String>,
    ) -> AuthResult<Self> {
        let client_id = client_id.into();
        let secret = secret.into();
        let resource = resource.into();

        if client_id.is_empty() {
            return Err(DomainError::EmptyParameter("clientID").into());
        }
        if secret.is_empty() {
            return Err(DomainError::EmptyParameter("secret").into());
        }
        if resource.is_empty() {
            return Err(DomainError::EmptyParameter("resource").into());
        }

        Ok(Self {
            endpoints,
            client_id,
            secret,
            resource,
            sender: RwLock::new(None),
            cache: TokenCache::new(),
        })
    }

    /// Binds the transport used for every token request.
    pub fn set_sender(&self, sender: Arc<dyn Sender>) {
        *self.sender.write().unwrap_or_else(PoisonError::into_inner) = Some(sender);
    }

    /// Resource the token is issued for.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Token endpoints in use.
    #[must_use]
    pub const fn endpoints(&self) -> &OAuthEndpoints {
        &self.endpoints
    }

    /// The cached token, if one was acquired.
    pub async fn cached(&self) -> Option<AccessToken> {
        self.cache.get().await
    }

    /// Status of the cached token, if one was acquired.
    pub async fn status(&self) -> Option<TokenStatus> {
        self.cache.status().await
    }

    /// Returns the cached token or fetches a new one when it is inside the refresh window.
    ///
    /// `ctx` bounds the whole call, including the wait for a refresh started
    /// by another caller.
    ///
    /// # Errors
    ///
    /// Fails when no sender is bound, the context is cancelled or expires,
    /// or the token endpoint rejects the request.
    pub async fn ensure_fresh(&self, ctx: &AuthContext) -> AuthResult<AccessToken> {
        ctx.run(self.cache.get_or_refresh(|| self.refresh())).await
    }

    async fn refresh(&self) -> AuthResult<AccessToken> {
        let sender = self
            .sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                AuthError::Integration(
                    "no sender bound to the service principal token".to_string(),
                )
            })?;

        request_token(
            sender.as_ref(),
            self.endpoints.token.clone(),
            &[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", &self.secret),
                ("resource", &self.resource),
            ],
            &self.resource,
        )
        .await
    }
}

impl fmt::Debug for ServicePrincipalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipalToken")
            .field("token_endpoint", &self.endpoints.token.as_str())
            .field("client_id", &self.client_id)
            .field("secret", &"[REDACTED]")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

/// Tokens for a primary tenant and each auxiliary tenant, all for the same resource.
#[derive(Debug)]
pub struct MultiTenantServicePrincipalToken {
    /// Token for the tenant the principal lives in.
    pub primary_token: ServicePrincipalToken,
    /// One token per auxiliary tenant, in declaration order.
    pub auxiliary_tokens: Vec<ServicePrincipalToken>,
}

impl MultiTenantServicePrincipalToken {
    /// Creates one token per tenant in `endpoints`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ServicePrincipalToken::new`].
    pub fn new(
        endpoints: MultiTenantOAuthEndpoints,
        client_id: &str,
        secret: &str,
        resource: &str,
    ) -> AuthResult<Self> {
        let primary_token = ServicePrincipalToken::new(endpoints.primary, client_id, secret, resource)?;
        let auxiliary_tokens = endpoints
            .auxiliary
            .into_iter()
            .map(|aux| ServicePrincipalToken::new(aux, client_id, secret, resource))
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(Self {
            primary_token,
            auxiliary_tokens,
        })
    }

    /// Binds `sender` to the primary and every auxiliary token.
    pub fn set_sender(&self, sender: &Arc<dyn Sender>) {
        self.primary_token.set_sender(Arc::clone(sender));
        for token in &self.auxiliary_tokens {
            token.set_sender(Arc::clone(sender));
        }
    }
}
