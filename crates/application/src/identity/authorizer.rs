//! Bearer authorizers over service principal tokens.

use std::future::Future;
use std::pin::Pin;

use azauth_domain::{AUTHORIZATION_HEADER, AUXILIARY_AUTHORIZATION_HEADER, AuthHeader, TokenStatus};

use super::service_principal::{MultiTenantServicePrincipalToken, ServicePrincipalToken};
use crate::context::AuthContext;
use crate::ports::{AuthFuture, Authorizer};

/// Adds `Authorization: Bearer <token>` to requests.
#[derive(Debug)]
pub struct BearerAuthorizer {
    token: ServicePrincipalToken,
}

impl BearerAuthorizer {
    /// Wraps a token.
    #[must_use]
    pub const fn new(token: ServicePrincipalToken) -> Self {
        Self { token }
    }

    /// The wrapped token.
    #[must_use]
    pub const fn token(&self) -> &ServicePrincipalToken {
        &self.token
    }
}

impl Authorizer for BearerAuthorizer {
    fn authorization_headers<'a>(&'a self, ctx: &'a AuthContext) -> AuthFuture<'a, Vec<AuthHeader>> {
        Box::pin(async move {
            let token = self.token.ensure_fresh(ctx).await?;
            Ok(vec![AuthHeader::new(
                AUTHORIZATION_HEADER,
                token.authorization_header(),
            )])
        })
    }

    fn token_status(&self) -> Pin<Box<dyn Future<Output = Option<TokenStatus>> + Send + '_>> {
        Box::pin(self.token.status())
    }
}

/// Adds the primary tenant's bearer token plus `x-ms-authorization-auxiliary`
/// carrying one bearer token per auxiliary tenant.
#[derive(Debug)]
pub struct MultiTenantBearerAuthorizer {
    token: MultiTenantServicePrincipalToken,
}

impl MultiTenantBearerAuthorizer {
    /// Wraps a multi-tenant token.
    #[must_use]
    pub const fn new(token: MultiTenantServicePrincipalToken) -> Self {
        Self { token }
    }

    /// The wrapped token.
    #[must_use]
    pub const fn token(&self) -> &MultiTenantServicePrincipalToken {
        &self.token
    }
}

impl Authorizer for MultiTenantBearerAuthorizer {
    fn authorization_headers<'a>(&'a self, ctx: &'a AuthContext) -> AuthFuture<'a, Vec<AuthHeader>> {
        Box::pin(async move {
            let primary = self.token.primary_token.ensure_fresh(ctx).await?;

            let mut auxiliary = Vec::with_capacity(self.token.auxiliary_tokens.len());
            for token in &self.token.auxiliary_tokens {
                auxiliary.push(token.ensure_fresh(ctx).await?.authorization_header());
            }

            Ok(vec![
                AuthHeader::new(AUTHORIZATION_HEADER, primary.authorization_header()),
                AuthHeader::new(AUXILIARY_AUTHORIZATION_HEADER, auxiliary.join(", ")),
            ])
        })
    }

    fn token_status(&self) -> Pin<Box<dyn Future<Output = Option<TokenStatus>> + Send + '_>> {
        Box::pin(self.token.primary_token.status())
    }
}
