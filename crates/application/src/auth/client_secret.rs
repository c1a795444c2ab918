//! Service principal authentication with a client secret in a single tenant.

use std::fmt;
use std::sync::Arc;

use azauth_domain::{OAuthConfig, ValidationErrors};

use super::client_credentials_authorizer;
use crate::builder::Builder;
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::identity::{BearerAuthorizer, ServicePrincipalToken};
use crate::ports::{Authorizer, Sender};

/// Client secret credentials for one tenant.
#[derive(Clone)]
pub struct ClientSecretAuth {
    context: AuthContext,
    client_id: String,
    client_secret: String,
    environment: String,
    subscription_id: String,
    tenant_id: String,
    tenant_only: bool,
}

impl ClientSecretAuth {
    /// Display name of this method.
    pub const NAME: &'static str = "Service Principal / Client Secret";

    /// True when client secret auth is enabled and a secret was supplied.
    #[must_use]
    pub fn is_applicable(builder: &Builder) -> bool {
        builder.supports_client_secret_auth && !builder.client_secret.is_empty()
    }

    /// Copies the relevant builder fields.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn build(builder: &Builder) -> AuthResult<Self> {
        Ok(Self {
            context: builder.context.clone(),
            client_id: builder.client_id.clone(),
            client_secret: builder.client_secret.clone(),
            environment: builder.environment.clone(),
            subscription_id: builder.subscription_id.clone(),
            tenant_id: builder.tenant_id.clone(),
            tenant_only: builder.tenant_only,
        })
    }

    /// Display name of this method.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Builds a bearer authorizer against the v1 token endpoint.
    ///
    /// # Errors
    ///
    /// Fails when `oauth` carries no single-tenant endpoints, or when the token
    /// cannot be constructed.
    pub fn get_authorization_token(
        &self,
        sender: Arc<dyn Sender>,
        oauth: &OAuthConfig,
        endpoint: &str,
    ) -> AuthResult<Arc<dyn Authorizer>> {
        let Some(endpoints) = &oauth.oauth else {
            return Err(AuthError::Integration(
                "getting Authorization Token for client secret auth: an OAuth token wasn't configured correctly; please file a bug with more details".to_string(),
            ));
        };

        let token = ServicePrincipalToken::new(
            endpoints.clone(),
            self.client_id.as_str(),
            self.client_secret.as_str(),
            endpoint,
        )?;
        token.set_sender(sender);

        Ok(Arc::new(BearerAuthorizer::new(token)))
    }

    /// Builds an authorizer through the client credentials token source.
    ///
    /// `oauth` is ignored.
    ///
    /// # Errors
    ///
    /// Fails when the environment name is unknown or the token source cannot be built.
    pub fn get_authorization_token_v2(
        &self,
        sender: Arc<dyn Sender>,
        _oauth: &OAuthConfig,
        endpoint: &str,
    ) -> AuthResult<Arc<dyn Authorizer>> {
        client_credentials_authorizer(
            &self.context,
            &self.environment,
            &self.tenant_id,
            &self.client_id,
            &self.client_secret,
            sender,
            endpoint,
        )
    }

    /// Reports every missing field.
    ///
    /// # Errors
    ///
    /// Returns all violations at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut require = |missing: bool, field: &'static str| {
            if missing {
                errors.push(
                    field,
                    format!("A {field} must be configured when authenticating as a Service Principal using a Client Secret."),
                );
            }
        };

        require(!self.tenant_only && self.subscription_id.is_empty(), "Subscription ID");
        require(self.client_id.is_empty(), "Client ID");
        require(self.client_secret.is_empty(), "Client Secret");
        require(self.tenant_id.is_empty(), "Tenant ID");

        errors.into_result()
    }

    /// Cancellation context captured at build time.
    #[must_use]
    pub const fn context(&self) -> &AuthContext {
        &self.context
    }

    /// Application (client) id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Environment name as supplied.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Subscription id.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Tenant id.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Whether only tenant-level access is needed.
    #[must_use]
    pub const fn tenant_only(&self) -> bool {
        self.tenant_only
    }

    /// Client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ClientSecretAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("tenant_only", &self.tenant_only)
            .finish_non_exhaustive()
    }
}
