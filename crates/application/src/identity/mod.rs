//! Minimal client-credentials identity layer.
//!
//! Two generations of token acquisition live here:
//! - the legacy path: [`ServicePrincipalToken`] against the v1 token endpoint,
//!   wrapped by [`BearerAuthorizer`] / [`MultiTenantBearerAuthorizer`];
//! - the v2 path: [`ClientCredentialsConfig`] producing a [`TokenSource`](crate::ports::TokenSource).
//!
//! Each token object caches exactly one token and refreshes it lazily.

mod authorizer;
mod client_credentials;
mod exchange;
mod service_principal;
mod token_cache;

pub use authorizer::{BearerAuthorizer, MultiTenantBearerAuthorizer};
pub use client_credentials::{ClientCredentialsConfig, ClientCredentialsTokenSource, TokenVersion};
pub use service_principal::{MultiTenantServicePrincipalToken, ServicePrincipalToken};
pub use token_cache::{DEFAULT_REFRESH_BUFFER_SECONDS, TokenCache};
