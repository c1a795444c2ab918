//! Command line flags.

use std::time::Duration;

use azauth_application::{AuthContext, Builder};
use clap::Parser;

/// Acquire an Azure token with a service principal client secret.
#[derive(Debug, Parser)]
#[command(name = "azauth", version, about)]
pub struct Cli {
    /// Application (client) id.
    #[arg(long, env = "ARM_CLIENT_ID", default_value = "")]
    pub client_id: String,

    /// Client secret.
    #[arg(long, env = "ARM_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub client_secret: String,

    /// Tenant the service principal lives in.
    #[arg(long, env = "ARM_TENANT_ID", default_value = "")]
    pub tenant_id: String,

    /// Subscription id.
    #[arg(long, env = "ARM_SUBSCRIPTION_ID", default_value = "")]
    pub subscription_id: String,

    /// Cloud environment name.
    #[arg(long, env = "ARM_ENVIRONMENT", default_value = "public")]
    pub environment: String,

    /// Auxiliary tenant ids, separated by `;`.
    #[arg(long, env = "ARM_AUXILIARY_TENANT_IDS", value_delimiter = ';')]
    pub auxiliary_tenant_ids: Vec<String>,

    /// Only tenant-level access is needed.
    #[arg(long)]
    pub tenant_only: bool,

    /// Acquire tokens through the v2 client credentials endpoint.
    #[arg(long, env = "ARM_USE_MSGRAPH")]
    pub use_microsoft_graph: bool,

    /// Resource to request a token for [default: the environment's resource manager]
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Give up after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Also look up the service principal's object id.
    #[arg(long)]
    pub object_id: bool,
}

impl Cli {
    /// Context bounded by `--timeout-secs`, if given.
    #[must_use]
    pub fn context(&self) -> AuthContext {
        let ctx = AuthContext::background();
        match self.timeout_secs {
            Some(secs) => ctx.with_timeout(Duration::from_secs(secs)),
            None => ctx,
        }
    }

    /// Builder with both client secret methods enabled.
    #[must_use]
    pub fn to_builder(&self, context: AuthContext) -> Builder {
        let mut builder = Builder::new(context);
        builder.client_id.clone_from(&self.client_id);
        builder.client_secret.clone_from(&self.client_secret);
        builder.tenant_id.clone_from(&self.tenant_id);
        builder.subscription_id.clone_from(&self.subscription_id);
        builder.environment.clone_from(&self.environment);
        builder.auxiliary_tenant_ids = self
            .auxiliary_tenant_ids
            .iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();
        builder.tenant_only = self.tenant_only;
        builder.use_microsoft_graph = self.use_microsoft_graph;
        builder.supports_client_secret_auth = true;
        builder.supports_auxiliary_tenants = true;
        builder
    }
}
