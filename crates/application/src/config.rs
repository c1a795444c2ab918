//! The result of a successful build: identity fields plus the chosen method.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use azauth_domain::OAuthConfig;

use crate::auth::AuthMethod;
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::ports::{Authorizer, Sender};

/// Future returned by an [`ObjectIdFn`].
pub type ObjectIdFuture = Pin<Box<dyn Future<Output = AuthResult<Option<String>>> + Send>>;

/// Resolves the object id of the authenticated principal.
pub type ObjectIdFn = Arc<dyn Fn(AuthContext, Arc<dyn Sender>) -> ObjectIdFuture + Send + Sync>;

/// Authentication configuration produced by [`Builder::build`](crate::Builder::build).
#[derive(Clone, Default)]
pub struct Config {
    /// Application (client) id.
    pub client_id: String,
    /// Subscription id.
    pub subscription_id: String,
    /// Primary tenant id.
    pub tenant_id: String,
    /// Cloud environment name.
    pub environment: String,
    /// Auxiliary tenant ids.
    pub auxiliary_tenant_ids: Vec<String>,
    /// Use the Microsoft Graph token path.
    pub use_microsoft_graph: bool,
    /// Set by the chosen method when it authenticates as a service principal.
    pub authenticated_as_a_service_principal: bool,
    /// Installed by the chosen method.
    pub get_authenticated_object_id: Option<ObjectIdFn>,
    auth_method: Option<AuthMethod>,
}

impl Config {
    /// The selected method, if the config came out of a build.
    #[must_use]
    pub const fn auth_method(&self) -> Option<&AuthMethod> {
        self.auth_method.as_ref()
    }

    pub(crate) fn set_auth_method(&mut self, method: AuthMethod) {
        self.auth_method = Some(method);
    }

    /// OAuth endpoints for this config's tenant and auxiliary tenants.
    ///
    /// # Errors
    ///
    /// Fails on an empty tenant id, an invalid endpoint or an auxiliary tenant
    /// count outside one to three.
    pub fn build_oauth_config(&self, active_directory_endpoint: &str) -> AuthResult<OAuthConfig> {
        tracing::debug!(
            endpoint = active_directory_endpoint,
            auxiliary_tenants = self.auxiliary_tenant_ids.len(),
            "building OAuth config"
        );
        Ok(OAuthConfig::build(
            active_directory_endpoint,
            &self.tenant_id,
            &self.auxiliary_tenant_ids,
        )?)
    }

    /// Authorizer for `endpoint` through the selected method.
    ///
    /// Uses the v2 path when [`Config::use_microsoft_graph`] is set.
    ///
    /// # Errors
    ///
    /// Fails when no method was selected or when the method fails.
    pub fn get_authorization_token(
        &self,
        sender: Arc<dyn Sender>,
        oauth: &OAuthConfig,
        endpoint: &str,
    ) -> AuthResult<Arc<dyn Authorizer>> {
        let method = self.auth_method.as_ref().ok_or_else(|| {
            AuthError::Integration("no authentication method has been configured".to_string())
        })?;

        if self.use_microsoft_graph {
            tracing::debug!(method = method.name(), "acquiring authorizer via client credentials");
            method.get_authorization_token_v2(sender, oauth, endpoint)
        } else {
            tracing::debug!(method = method.name(), "acquiring authorizer via service principal token");
            method.get_authorization_token(sender, oauth, endpoint)
        }
    }

    /// Object id of the authenticated principal, or `None` when no lookup is installed.
    ///
    /// # Errors
    ///
    /// Propagates the lookup's error.
    pub async fn authenticated_object_id(
        &self,
        ctx: AuthContext,
        sender: Arc<dyn Sender>,
    ) -> AuthResult<Option<String>> {
        match &self.get_authenticated_object_id {
            Some(lookup) => lookup(ctx, sender).await,
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("environment", &self.environment)
            .field("auxiliary_tenant_ids", &self.auxiliary_tenant_ids)
            .field("use_microsoft_graph", &self.use_microsoft_graph)
            .field(
                "authenticated_as_a_service_principal",
                &self.authenticated_as_a_service_principal,
            )
            .field(
                "get_authenticated_object_id",
                &self.get_authenticated_object_id.is_some(),
            )
            .field("auth_method", &self.auth_method.as_ref().map(AuthMethod::name))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::ports::HttpResponse;
    use crate::test_support::{RecordingSender, token_body};
    use pretty_assertions::assert_eq;

    const AD: &str = "https://login.microsoftonline.com/";

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
    fn test_build_oauth_config_adds_multi_tenant_only_with_auxiliaries() {
        let config = builder().build().unwrap();
        let oauth = config.build_oauth_config(AD).unwrap();
        assert!(oauth.oauth.is_some());
        assert!(oauth.multi_tenant_oauth.is_none());

        let mut b = builder();
        b.supports_auxiliary_tenants = true;
        b.auxiliary_tenant_ids = vec!["a".to_string(), "b".to_string()];
        let oauth = b.build().unwrap().build_oauth_config(AD).unwrap();
        assert_eq!(oauth.multi_tenant_oauth.unwrap().auxiliary.len(), 2);
    }

    #[test]
    fn test_too_many_auxiliary_tenants() {
        let mut b = builder();
        b.supports_auxiliary_tenants = true;
        b.auxiliary_tenant_ids = (0..4).map(|i| format!("aux-{i}")).collect();

        let err = b.build().unwrap().build_oauth_config(AD).unwrap_err();
        assert_eq!(err.to_string(), "must specify one to three auxiliary tenants");
    }

    #[tokio::test]
    async fn test_dispatches_to_legacy_path() {
        let config = builder().build().unwrap();
        let oauth = config.build_oauth_config(AD).unwrap();
        let recording = Arc::new(RecordingSender::with_responses(vec![HttpResponse::new(
            200,
            token_body("t"),
        )]));

        config
            .get_authorization_token(recording.clone(), &oauth, "https://management.azure.com/")
            .unwrap()
            .authorization_headers(&AuthContext::background())
            .await
            .unwrap();

        assert_eq!(
            recording.requests()[0].url.as_str(),
            "https://login.microsoftonline.com/tenant/oauth2/token?api-version=1.0"
        );
    }

    #[tokio::test]
    async fn test_dispatches_to_v2_path() {
        let mut b = builder();
        b.use_microsoft_graph = true;
        let config = b.build().unwrap();
        let recording = Arc::new(RecordingSender::with_responses(vec![HttpResponse::new(
            200,
            token_body("t"),
        )]));

        config
            .get_authorization_token(
                recording.clone(),
                &OAuthConfig::default(),
                "https://graph.microsoft.com/",
            )
            .unwrap()
            .authorization_headers(&AuthContext::background())
            .await
            .unwrap();

        assert_eq!(
            recording.requests()[0].url.as_str(),
            "https://login.microsoftonline.com/tenant/oauth2/v2.0/token"
        );
    }

    #[tokio::test]
    async fn test_without_method_or_lookup() {
        let config = Config::default();
        let sender: Arc<dyn Sender> = Arc::new(RecordingSender::default());

        assert!(matches!(
            config.get_authorization_token(sender.clone(), &OAuthConfig::default(), "x"),
            Err(AuthError::Integration(_))
        ));
        assert_eq!(
            config
                .authenticated_object_id(AuthContext::background(), sender)
                .await
                .unwrap(),
            None
        );
    }
}
