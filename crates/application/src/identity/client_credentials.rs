//! Client-credentials token sources for the Microsoft identity platform.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use azauth_domain::{
    AUTHORIZATION_HEADER, AccessToken, AuthHeader, DomainError, Environment, TokenStatus,
};
use url::Url;

use super::exchange::request_token;
use super::token_cache::TokenCache;
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::ports::{AuthFuture, Authorizer, Sender, TokenSource};

const DEFAULT_SCOPE_SUFFIX: &str = "/.default";

/// Which token endpoint generation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenVersion {
    /// `oauth2/token`, which takes a `resource`.
    V1,
    /// `oauth2/v2.0/token`, which takes a `scope`.
    #[default]
    V2,
}

/// Everything needed to run a client-credentials grant.
#[derive(Clone)]
pub struct ClientCredentialsConfig {
    /// Cloud to authenticate against.
    pub environment: Environment,
    /// Tenant the service principal is registered in.
    pub tenant_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Requested scopes, e.g. `https://management.azure.com/.default`.
    pub scopes: Vec<String>,
    /// Token endpoint generation.
    pub token_version: TokenVersion,
    /// Transport for token requests.
    pub sender: Option<Arc<dyn Sender>>,
}

impl ClientCredentialsConfig {
    /// Builds a token source bound to `ctx`.
    ///
    /// The returned source fetches lazily; no request is made here.
    ///
    /// # Errors
    ///
    /// Fails when a required field is empty, no scope was given, no sender is
    /// set or the token endpoint URL cannot be built.
    pub fn token_source(self, ctx: &AuthContext) -> AuthResult<Arc<dyn TokenSource>> {
        if self.tenant_id.is_empty() {
            return Err(DomainError::EmptyParameter("tenantID").into());
        }
        if self.client_id.is_empty() {
            return Err(DomainError::EmptyParameter("clientID").into());
        }
        if self.client_secret.is_empty() {
            return Err(DomainError::EmptyParameter("secret").into());
        }
        let scope = self
            .scopes
            .first()
            .filter(|s| !s.is_empty())
            .ok_or(DomainError::EmptyParameter("scopes"))?;

        let (path, audience) = match self.token_version {
            TokenVersion::V1 => (
                format!("{}/oauth2/token", self.tenant_id),
                scope
                    .strip_suffix(DEFAULT_SCOPE_SUFFIX)
                    .unwrap_or(scope)
                    .to_string(),
            ),
            TokenVersion::V2 => (
                format!("{}/oauth2/v2.0/token", self.tenant_id),
                self.scopes.join(" "),
            ),
        };

        let token_url = Url::parse(&self.environment.active_directory)
            .and_then(|base| base.join(&path))
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {path}")))?;

        let sender = self.sender.ok_or_else(|| {
            AuthError::Integration("no sender configured for client credentials".to_string())
        })?;

        Ok(Arc::new(ClientCredentialsTokenSource {
            token_url,
            client_id: self.client_id,
            client_secret: self.client_secret,
            audience,
            token_version: self.token_version,
            sender,
            context: ctx.clone(),
            cache: TokenCache::new(),
        }))
    }
}

impl fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("environment", &self.environment.cloud)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("token_version", &self.token_version)
            .field("sender", &self.sender.is_some())
            .finish()
    }
}

/// Token source produced by [`ClientCredentialsConfig::token_source`].
///
/// It is also an [`Authorizer`].
pub struct ClientCredentialsTokenSource {
    token_url: Url,
    client_id: String,
    client_secret: String,
    audience: String,
    token_version: TokenVersion,
    sender: Arc<dyn Sender>,
    context: AuthContext,
    cache: TokenCache,
}

impl ClientCredentialsTokenSource {
    /// Token endpoint in use.
    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }

    async fn fetch(&self, ctx: &AuthContext) -> AuthResult<AccessToken> {
        ctx.run(self.cache.get_or_refresh(|| self.refresh())).await
    }

    async fn refresh(&self) -> AuthResult<AccessToken> {
        let audience_key = match self.token_version {
            TokenVersion::V1 => "resource",
            TokenVersion::V2 => "scope",
        };

        request_token(
            self.sender.as_ref(),
            self.token_url.clone(),
            &[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                (audience_key, &self.audience),
            ],
            &self.audience,
        )
        .await
    }
}

impl TokenSource for ClientCredentialsTokenSource {
    fn token(&self) -> AuthFuture<'_, AccessToken> {
        Box::pin(self.fetch(&self.context))
    }

    fn as_authorizer(self: Arc<Self>) -> Option<Arc<dyn Authorizer>> {
        Some(self)
    }
}

impl Authorizer for ClientCredentialsTokenSource {
    fn authorization_headers<'a>(&'a self, ctx: &'a AuthContext) -> AuthFuture<'a, Vec<AuthHeader>> {
        Box::pin(async move {
            let token = self.fetch(ctx).await?;
            Ok(vec![AuthHeader::new(
                AUTHORIZATION_HEADER,
                token.authorization_header(),
            )])
        })
    }

    fn token_status(&self) -> Pin<Box<dyn Future<Output = Option<TokenStatus>> + Send + '_>> {
        Box::pin(self.cache.status())
    }
}

impl fmt::Debug for ClientCredentialsTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsTokenSource")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("audience", &self.audience)
            .field("token_version", &self.token_version)
            .finish_non_exhaustive()
    }
}
