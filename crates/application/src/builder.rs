//! Raw authentication input and the build pipeline.

use std::fmt;

use crate::auth::AuthMethod;
use crate::config::Config;
use crate::context::AuthContext;
use crate::error::AuthResult;

const DEFAULT_ENVIRONMENT: &str = "public";

/// User-supplied authentication settings.
///
/// Fields are public and filled in by the caller; [`Builder::build`] turns
/// them into a validated [`Config`].
#[derive(Clone)]
pub struct Builder {
    /// Cancellation and deadline for every token request made later.
    pub context: AuthContext,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Cloud environment name, e.g. `public` or `usgovernment`.
    pub environment: String,
    /// Subscription id.
    pub subscription_id: String,
    /// Primary tenant id.
    pub tenant_id: String,
    /// Only tenant-level access is needed; no subscription is required.
    pub tenant_only: bool,
    /// Auxiliary tenant ids, in order.
    pub auxiliary_tenant_ids: Vec<String>,
    /// Whether the caller allows client secret authentication.
    pub supports_client_secret_auth: bool,
    /// Whether the caller allows multi-tenant authentication.
    pub supports_auxiliary_tenants: bool,
    /// Use the Microsoft Graph token path.
    pub use_microsoft_graph: bool,
}

impl Builder {
    /// Creates an empty builder for the public cloud.
    #[must_use]
    pub fn new(context: AuthContext) -> Self {
        Self {
            context,
            client_id: String::new(),
            client_secret: String::new(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            subscription_id: String::new(),
            tenant_id: String::new(),
            tenant_only: false,
            auxiliary_tenant_ids: Vec::new(),
            supports_client_secret_auth: false,
            supports_auxiliary_tenants: false,
            use_microsoft_graph: false,
        }
    }

    /// Selects, builds, populates and validates an auth method.
    ///
    /// # Errors
    ///
    /// Any failure along the way; a config is never returned for a method that
    /// fails validation.
    pub fn build(&self) -> AuthResult<Config> {
        let mut config = Config::default();
        config.client_id.clone_from(&self.client_id);
        config.subscription_id.clone_from(&self.subscription_id);
        config.tenant_id.clone_from(&self.tenant_id);
        config.environment.clone_from(&self.environment);
        config.auxiliary_tenant_ids.clone_from(&self.auxiliary_tenant_ids);
        config.use_microsoft_graph = self.use_microsoft_graph;

        let method = AuthMethod::select(self)?;
        method.populate_config(&mut config)?;
        method.validate()?;
        config.set_auth_method(method);

        Ok(config)
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("tenant_only", &self.tenant_only)
            .field("auxiliary_tenant_ids", &self.auxiliary_tenant_ids)
            .field("supports_client_secret_auth", &self.supports_client_secret_auth)
            .field("supports_auxiliary_tenants", &self.supports_auxiliary_tenants)
            .field("use_microsoft_graph", &self.use_microsoft_graph)
            .finish_non_exhaustive()
    }
}
