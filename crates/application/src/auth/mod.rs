//! Authentication methods and their selection.
//!
//! Each method is an immutable value built from a [`Builder`]. Selection walks
//! [`AuthMethodKind::PRIORITY`] and builds the first applicable method.

mod client_secret;
mod client_secret_multi_tenant;

pub use client_secret::ClientSecretAuth;
pub use client_secret_multi_tenant::ClientSecretMultiTenantAuth;

use std::sync::Arc;

use azauth_domain::{Environment, OAuthConfig, ValidationErrors};

use crate::builder::Builder;
use crate::config::Config;
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::identity::{ClientCredentialsConfig, TokenVersion};
use crate::object_id::service_principal_object_id_fn;
use crate::ports::{Authorizer, Sender, TokenSource};

/// The kinds of authentication method, without their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethodKind {
    /// [`ClientSecretAuth`]
    ClientSecret,
    /// [`ClientSecretMultiTenantAuth`]
    ClientSecretMultiTenant,
}

impl AuthMethodKind {
    /// Order in which methods are tried; the first applicable one wins.
    pub const PRIORITY: [Self; 2] = [Self::ClientSecretMultiTenant, Self::ClientSecret];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClientSecret => ClientSecretAuth::NAME,
            Self::ClientSecretMultiTenant => ClientSecretMultiTenantAuth::NAME,
        }
    }

    /// Whether this kind accepts the builder input.
    #[must_use]
    pub fn is_applicable(self, builder: &Builder) -> bool {
        match self {
            Self::ClientSecret => ClientSecretAuth::is_applicable(builder),
            Self::ClientSecretMultiTenant => ClientSecretMultiTenantAuth::is_applicable(builder),
        }
    }

    /// Builds a method of this kind.
    ///
    /// # Errors
    ///
    /// Propagates the variant's build error.
    pub fn build(self, builder: &Builder) -> AuthResult<AuthMethod> {
        Ok(match self {
            Self::ClientSecret => AuthMethod::ClientSecret(ClientSecretAuth::build(builder)?),
            Self::ClientSecretMultiTenant => {
                AuthMethod::ClientSecretMultiTenant(ClientSecretMultiTenantAuth::build(builder)?)
            }
        })
    }
}

/// A built authentication method.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Client secret in a single tenant.
    ClientSecret(ClientSecretAuth),
    /// Client secret across a primary and auxiliary tenants.
    ClientSecretMultiTenant(ClientSecretMultiTenantAuth),
}

impl AuthMethod {
    /// Builds the first applicable method in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoApplicableMethod`] when nothing applies, or the
    /// chosen method's build error.
    pub fn select(builder: &Builder) -> AuthResult<Self> {
        for kind in AuthMethodKind::PRIORITY {
            let applicable = kind.is_applicable(builder);
            tracing::debug!(method = kind.name(), applicable, "testing auth method");
            if applicable {
                tracing::info!(method = kind.name(), "using auth method");
                return kind.build(builder);
            }
        }
        Err(AuthError::NoApplicableMethod)
    }

    /// Kind of this method.
    #[must_use]
    pub const fn kind(&self) -> AuthMethodKind {
        match self {
            Self::ClientSecret(_) => AuthMethodKind::ClientSecret,
            Self::ClientSecretMultiTenant(_) => AuthMethodKind::ClientSecretMultiTenant,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Legacy token acquisition through the v1 endpoints in `oauth`.
    ///
    /// # Errors
    ///
    /// See the variant's `get_authorization_token`.
    pub fn get_authorization_token(
        &self,
        sender: Arc<dyn Sender>,
        oauth: &OAuthConfig,
        endpoint: &str,
    ) -> AuthResult<Arc<dyn Authorizer>> {
        match self {
            Self::ClientSecret(m) => m.get_authorization_token(sender, oauth, endpoint),
            Self::ClientSecretMultiTenant(m) => m.get_authorization_token(sender, oauth, endpoint),
        }
    }

    /// Token acquisition through the client credentials token source.
    ///
    /// # Errors
    ///
    /// See the variant's `get_authorization_token_v2`.
    pub fn get_authorization_token_v2(
        &self,
        sender: Arc<dyn Sender>,
        oauth: &OAuthConfig,
        endpoint: &str,
    ) -> AuthResult<Arc<dyn Authorizer>> {
        match self {
            Self::ClientSecret(m) => m.get_authorization_token_v2(sender, oauth, endpoint),
            Self::ClientSecretMultiTenant(m) => {
                m.get_authorization_token_v2(sender, oauth, endpoint)
            }
        }
    }

    /// Marks the config as service-principal authenticated and installs the
    /// object id lookup.
    ///
    /// # Errors
    ///
    /// Never fails for the client secret methods.
    pub fn populate_config(&self, config: &mut Config) -> AuthResult<()> {
        config.authenticated_as_a_service_principal = true;
        config.get_authenticated_object_id = Some(service_principal_object_id_fn(
            self.clone(),
            config.use_microsoft_graph,
        ));
        Ok(())
    }

    /// Reports every missing field.
    ///
    /// # Errors
    ///
    /// Returns all violations at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::ClientSecret(m) => m.validate(),
            Self::ClientSecretMultiTenant(m) => m.validate(),
        }
    }

    /// Context captured at build time.
    #[must_use]
    pub const fn context(&self) -> &AuthContext {
        match self {
            Self::ClientSecret(m) => m.context(),
            Self::ClientSecretMultiTenant(m) => m.context(),
        }
    }

    /// Application (client) id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        match self {
            Self::ClientSecret(m) => m.client_id(),
            Self::ClientSecretMultiTenant(m) => m.client_id(),
        }
    }

    /// Environment name as supplied.
    #[must_use]
    pub fn environment(&self) -> &str {
        match self {
            Self::ClientSecret(m) => m.environment(),
            Self::ClientSecretMultiTenant(m) => m.environment(),
        }
    }

    /// Primary tenant id.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        match self {
            Self::ClientSecret(m) => m.tenant_id(),
            Self::ClientSecretMultiTenant(m) => m.tenant_id(),
        }
    }

    /// Auxiliary tenant ids; empty for single-tenant methods.
    #[must_use]
    pub fn auxiliary_tenant_ids(&self) -> &[String] {
        match self {
            Self::ClientSecret(_) => &[],
            Self::ClientSecretMultiTenant(m) => m.auxiliary_tenant_ids(),
        }
    }
}

/// `<endpoint>/.default` with trailing slashes removed from the endpoint.
#[must_use]
pub fn scope_for_endpoint(endpoint: &str) -> String {
    format!("{}/.default", endpoint.trim_end_matches('/'))
}

/// Shared v2 path: client credentials token source exposed as an authorizer.
fn client_credentials_authorizer(
    ctx: &AuthContext,
    environment: &str,
    tenant_id: &str,
    client_id: &str,
    client_secret: &str,
    sender: Arc<dyn Sender>,
    endpoint: &str,
) -> AuthResult<Arc<dyn Authorizer>> {
    let environment = Environment::from_name(environment).map_err(AuthError::EnvironmentConfig)?;

    let config = ClientCredentialsConfig {
        environment,
        tenant_id: tenant_id.to_string(),
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        scopes: vec![scope_for_endpoint(endpoint)],
        token_version: TokenVersion::V2,
        sender: Some(sender),
    };

    authorizer_from_token_source(config.token_source(ctx)?)
}

/// Exposes `source` as an authorizer, or fails if it cannot act as one.
fn authorizer_from_token_source(source: Arc<dyn TokenSource>) -> AuthResult<Arc<dyn Authorizer>> {
    source.as_authorizer().ok_or_else(|| {
        AuthError::Integration("returned token source does not implement Authorizer".to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::{AuthFuture, HttpResponse};
    use crate::test_support::{RecordingSender, token_body};
    use azauth_domain::AccessToken;
    use pretty_assertions::assert_eq;

    /// Hands out a fixed token but cannot authorize requests.
    struct TokenOnlySource;

    impl TokenSource for TokenOnlySource {
        fn token(&self) -> AuthFuture<'_, AccessToken> {
            Box::pin(async {
                Ok(AccessToken::new("t".to_string(), String::new(), Some(3600), "r".to_string()))
            })
        }
    }

    fn builder() -> Builder {
        let mut builder = Builder::new(AuthContext::background());
        builder.client_id = "client".to_string();
        builder.client_secret = "secret".to_string();
        builder.subscription_id = "sub".to_string();
        builder.tenant_id = "tenant".to_string();
        builder.supports_client_secret_auth = true;
        builder
    }

    #[test]
    fn test_scope_for_endpoint() {
        assert_eq!(
            scope_for_endpoint("https://management.azure.com/"),
            "https://management.azure.com/.default"
        );
        assert_eq!(
            scope_for_endpoint("https://graph.microsoft.com"),
            "https://graph.microsoft.com/.default"
        );
        assert_eq!(
            scope_for_endpoint("https://management.azure.com///"),
            "https://management.azure.com/.default"
        );
    }

    #[test]
    fn test_select_single_tenant() {
        let method = AuthMethod::select(&builder()).unwrap();
        assert_eq!(method.kind(), AuthMethodKind::ClientSecret);
        assert_eq!(method.name(), "Service Principal / Client Secret");
        assert!(method.auxiliary_tenant_ids().is_empty());
    }

    #[test]
    fn test_select_prefers_multi_tenant() {
        let mut b = builder();
        b.supports_auxiliary_tenants = true;
        b.auxiliary_tenant_ids = vec!["aux".to_string()];

        let method = AuthMethod::select(&b).unwrap();
        assert_eq!(method.kind(), AuthMethodKind::ClientSecretMultiTenant);
        assert_eq!(method.auxiliary_tenant_ids(), ["aux"]);
    }

    #[test]
    fn test_select_fails_when_nothing_applies() {
        let mut b = builder();
        b.client_secret.clear();

        let err = AuthMethod::select(&b).unwrap_err();
        assert!(matches!(err, AuthError::NoApplicableMethod));
        assert_eq!(err.to_string(), "No supported authentication methods were found!");
    }

    #[test]
    fn test_populate_config_installs_object_id_lookup() {
        let method = AuthMethod::select(&builder()).unwrap();
        let mut config = Config::default();
        method.populate_config(&mut config).unwrap();

        assert!(config.authenticated_as_a_service_principal);
        assert!(config.get_authenticated_object_id.is_some());
    }

    #[test]
    fn test_token_source_without_authorizer_is_an_integration_error() {
        let err = authorizer_from_token_source(Arc::new(TokenOnlySource)).err().unwrap();
        assert!(matches!(err, AuthError::Integration(_)));
        assert_eq!(err.to_string(), "returned token source does not implement Authorizer");
    }

    #[tokio::test]
    async fn test_client_credentials_source_is_accepted_as_authorizer() {
        let sender = Arc::new(RecordingSender::with_responses(vec![HttpResponse::new(
            200,
            token_body("v2"),
        )]));
        let authorizer = client_credentials_authorizer(
            &AuthContext::background(),
            "public",
            "tenant",
            "client",
            "secret",
            sender.clone(),
            "https://management.azure.com/",
        )
        .unwrap();

        authorizer
            .authorization_headers(&AuthContext::background())
            .await
            .unwrap();
        let body = sender.requests()[0].body.clone().unwrap();
        assert!(body.contains("scope=https%3A%2F%2Fmanagement.azure.com%2F.default"));
    }
}
