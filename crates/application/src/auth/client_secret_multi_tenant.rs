//! Service principal authentication with a client secret across a primary
//! tenant and up to three auxiliary tenants.

use std::fmt;
use std::sync::Arc;

use azauth_domain::{OAuthConfig, ValidationErrors};

use super::client_credentials_authorizer;
use crate::builder::Builder;
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::identity::{MultiTenantBearerAuthorizer, MultiTenantServicePrincipalToken};
use crate::ports::{Authorizer, Sender};

/// Client secret credentials for a primary tenant plus auxiliary tenants.
#[derive(Clone)]
pub struct ClientSecretMultiTenantAuth {
    context: AuthContext,
    client_id: String,
    client_secret: String,
    environment: String,
    subscription_id: String,
    tenant_id: String,
    auxiliary_tenant_ids: Vec<String>,
    tenant_only: bool,
}

impl ClientSecretMultiTenantAuth {
    /// Display name of this method.
    pub const NAME: &'static str = "Multi Tenant Service Principal / Client Secret";

    /// True when client secret and auxiliary tenant support are both enabled,
    /// a secret was supplied and at least one auxiliary tenant is listed.
    #[must_use]
    pub fn is_applicable(builder: &Builder) -> bool {
        builder.supports_client_secret_auth
            && !builder.client_secret.is_empty()
            && builder.supports_auxiliary_tenants
            && !builder.auxiliary_tenant_ids.is_empty()
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
            auxiliary_tenant_ids: builder.auxiliary_tenant_ids.clone(),
            tenant_only: builder.tenant_only,
        })
    }

    /// Display name of this method.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Builds a multi-tenant bearer authorizer against the v1 token endpoints.
    ///
    /// The sender is bound to the primary token and to every auxiliary token.
    ///
    /// # Errors
    ///
    /// Fails when `oauth` carries no multi-tenant endpoints, or when a token
    /// cannot be constructed.
    pub fn get_authorization_token(
        &self,
        sender: Arc<dyn Sender>,
        oauth: &OAuthConfig,
        endpoint: &str,
    ) -> AuthResult<Arc<dyn Authorizer>> {
        let Some(endpoints) = &oauth.multi_tenant_oauth else {
            return Err(AuthError::Integration(
                "getting Authorization Token for multi tenant client secret auth: a MultiTenantOauth token wasn't configured correctly; please file a bug with more details".to_string(),
            ));
        };

        let token = MultiTenantServicePrincipalToken::new(
            endpoints.clone(),
            &self.client_id,
            &self.client_secret,
            endpoint,
        )?;
        token.set_sender(&sender);

        Ok(Arc::new(MultiTenantBearerAuthorizer::new(token)))
    }

    /// Builds an authorizer through the client credentials token source for
    /// the primary tenant.
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

    /// Reports every missing field, including an empty auxiliary tenant list.
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
                    format!("{field} must be configured when authenticating as a Service Principal using a Multi Tenant Client Secret."),
                );
            }
        };

        require(!self.tenant_only && self.subscription_id.is_empty(), "Subscription ID");
        require(self.client_id.is_empty(), "Client ID");
        require(self.client_secret.is_empty(), "Client Secret");
        require(self.tenant_id.is_empty(), "Tenant ID");
        require(self.auxiliary_tenant_ids.is_empty(), "Auxiliary Tenant IDs");

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

    /// Client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
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

    /// Primary tenant id.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Auxiliary tenant ids in declaration order.
    #[must_use]
    pub fn auxiliary_tenant_ids(&self) -> &[String] {
        &self.auxiliary_tenant_ids
    }

    /// Whether only tenant-level access is needed.
    #[must_use]
    pub const fn tenant_only(&self) -> bool {
        self.tenant_only
    }
}

impl fmt::Debug for ClientSecretMultiTenantAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretMultiTenantAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("auxiliary_tenant_ids", &self.auxiliary_tenant_ids)
            .field("tenant_only", &self.tenant_only)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::HttpResponse;
    use crate::test_support::{RecordingSender, token_body};
    use azauth_domain::AuthHeader;
    use pretty_assertions::assert_eq;

    fn builder() -> Builder {
        let mut builder = Builder::new(AuthContext::background());
        builder.client_id = "client".to_string();
        builder.client_secret = "secret".to_string();
        builder.subscription_id = "sub".to_string();
        builder.tenant_id = "primary".to_string();
        builder.auxiliary_tenant_ids = vec!["aux-1".to_string(), "aux-2".to_string()];
        builder.supports_client_secret_auth = true;
        builder.supports_auxiliary_tenants = true;
        builder
    }

    #[test]
    fn test_is_applicable_needs_every_condition() {
        assert!(ClientSecretMultiTenantAuth::is_applicable(&builder()));

        let mut b = builder();
        b.supports_auxiliary_tenants = false;
        assert!(!ClientSecretMultiTenantAuth::is_applicable(&b));

        let mut b = builder();
        b.auxiliary_tenant_ids.clear();
        assert!(!ClientSecretMultiTenantAuth::is_applicable(&b));

        let mut b = builder();
        b.client_secret.clear();
        assert!(!ClientSecretMultiTenantAuth::is_applicable(&b));

        let mut b = builder();
        b.supports_client_secret_auth = false;
        assert!(!ClientSecretMultiTenantAuth::is_applicable(&b));
    }

    #[test]
    fn test_build_copies_fields() {
        let auth = ClientSecretMultiTenantAuth::build(&builder()).unwrap();
        assert_eq!(auth.client_id(), "client");
        assert_eq!(auth.client_secret(), "secret");
        assert_eq!(auth.environment(), "public");
        assert_eq!(auth.subscription_id(), "sub");
        assert_eq!(auth.tenant_id(), "primary");
        assert_eq!(auth.auxiliary_tenant_ids(), ["aux-1", "aux-2"]);
        assert!(!auth.tenant_only());
        assert_eq!(auth.name(), "Multi Tenant Service Principal / Client Secret");
    }

    #[test]
    fn test_validate_empty_auxiliary_list_always_fails() {
        let mut b = builder();
        b.auxiliary_tenant_ids.clear();
        let errors = ClientSecretMultiTenantAuth::build(&b)
            .unwrap()
            .validate()
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.violations()[0].message,
            "Auxiliary Tenant IDs must be configured when authenticating as a Service Principal using a Multi Tenant Client Secret."
        );
    }

    #[test]
    fn test_validate_collects_everything() {
        let mut b = Builder::new(AuthContext::background());
        b.tenant_only = true;
        let errors = ClientSecretMultiTenantAuth::build(&b)
            .unwrap()
            .validate()
            .unwrap_err();

        let fields: Vec<&str> = errors.violations().iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec!["Client ID", "Client Secret", "Tenant ID", "Auxiliary Tenant IDs"]
        );
    }

    #[test]
    fn test_legacy_path_requires_multi_tenant_endpoints() {
        let auth = ClientSecretMultiTenantAuth::build(&builder()).unwrap();
        let oauth = OAuthConfig::build("https://login.microsoftonline.com/", "primary", &[]).unwrap();

        let err = auth
            .get_authorization_token(
                Arc::new(RecordingSender::default()),
                &oauth,
                "https://management.azure.com/",
            )
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::Integration(_)));
        assert!(err.to_string().contains("MultiTenantOauth"));
    }

    #[tokio::test]
    async fn test_legacy_path_sends_every_token_request_through_sender() {
        let auth = ClientSecretMultiTenantAuth::build(&builder()).unwrap();
        let recording = Arc::new(RecordingSender::with_responses(vec![
            HttpResponse::new(200, token_body("p")),
            HttpResponse::new(200, token_body("x")),
            HttpResponse::new(200, token_body("y")),
        ]));
        let oauth = OAuthConfig::build(
            "https://login.microsoftonline.com/",
            "primary",
            auth.auxiliary_tenant_ids(),
        )
        .unwrap();

        let authorizer = auth
            .get_authorization_token(recording.clone(), &oauth, "https://management.azure.com/")
            .unwrap();
        let headers = authorizer
            .authorization_headers(&AuthContext::background())
            .await
            .unwrap();

        assert_eq!(
            headers,
            vec![
                AuthHeader::new("Authorization", "Bearer p"),
                AuthHeader::new("x-ms-authorization-auxiliary", "Bearer x, Bearer y"),
            ]
        );

        let urls: Vec<String> = recording
            .requests()
            .iter()
            .map(|r| r.url.to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://login.microsoftonline.com/primary/oauth2/token?api-version=1.0",
                "https://login.microsoftonline.com/aux-1/oauth2/token?api-version=1.0",
                "https://login.microsoftonline.com/aux-2/oauth2/token?api-version=1.0",
            ]
        );
    }

    #[test]
    fn test_v2_path_rejects_unknown_environment() {
        let mut b = builder();
        b.environment = "atlantis".to_string();
        let err = ClientSecretMultiTenantAuth::build(&b)
            .unwrap()
            .get_authorization_token_v2(
                Arc::new(RecordingSender::default()),
                &OAuthConfig::default(),
                "https://management.azure.com/",
            )
            .err()
            .unwrap();

        assert_eq!(
            err.to_string(),
            "environment config error: invalid environment specified: atlantis"
        );
    }
}
