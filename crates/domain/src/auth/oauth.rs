//! OAuth endpoint configuration for the Azure Active Directory v1 endpoints.

use url::Url;

use crate::error::{DomainError, DomainResult};

const API_VERSION_QUERY: &str = "?api-version=1.0";
const MAX_AUXILIARY_TENANTS: usize = 3;

/// Endpoints of a single tenant's authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    /// `<active directory>/<tenant>`
    pub authority: Url,
    /// Authorization endpoint.
    pub authorize: Url,
    /// Token endpoint.
    pub token: Url,
    /// Device code endpoint.
    pub device_code: Url,
}

impl OAuthEndpoints {
    /// Builds the endpoints of `tenant_id` below `active_directory_endpoint`.
    ///
    /// # Errors
    ///
    /// Fails if the tenant is empty or the endpoint is not a valid URL.
    pub fn new(active_directory_endpoint: &str, tenant_id: &str) -> DomainResult<Self> {
        if tenant_id.is_empty() {
            return Err(DomainError::EmptyParameter("tenantID"));
        }

        let mut base = active_directory_endpoint.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {active_directory_endpoint}")))?;

        let join = |path: &str| {
            base.join(path)
                .map_err(|e| DomainError::InvalidUrl(format!("{e}: {path}")))
        };
        let oauth2 =
            |kind: &str| join(&format!("{tenant_id}/oauth2/{kind}{API_VERSION_QUERY}"));

        Ok(Self {
            authority: join(tenant_id)?,
            authorize: oauth2("authorize")?,
            token: oauth2("token")?,
            device_code: oauth2("devicecode")?,
        })
    }
}

/// Endpoints for a primary tenant plus its auxiliary tenants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTenantOAuthEndpoints {
    /// The tenant the service principal is registered in.
    pub primary: OAuthEndpoints,
    /// Additional tenants, in declaration order.
    pub auxiliary: Vec<OAuthEndpoints>,
}

impl MultiTenantOAuthEndpoints {
    /// Builds the endpoints for a primary tenant and one to three auxiliary tenants.
    ///
    /// # Errors
    ///
    /// Fails when the auxiliary list is empty or longer than three, or when any
    /// tenant's endpoints cannot be built.
    pub fn new(
        active_directory_endpoint: &str,
        primary_tenant_id: &str,
        auxiliary_tenant_ids: &[String],
    ) -> DomainResult<Self> {
        let count = auxiliary_tenant_ids.len();
        if count == 0 || count > MAX_AUXILIARY_TENANTS {
            return Err(DomainError::AuxiliaryTenantCount(count));
        }

        let primary = OAuthEndpoints::new(active_directory_endpoint, primary_tenant_id)?;
        let auxiliary = auxiliary_tenant_ids
            .iter()
            .map(|tenant| OAuthEndpoints::new(active_directory_endpoint, tenant))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self { primary, auxiliary })
    }
}

/// OAuth configuration handed to the legacy token path.
///
/// `oauth` serves single-tenant methods, `multi_tenant_oauth` the multi-tenant one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthConfig {
    /// Single-tenant endpoints.
    pub oauth: Option<OAuthEndpoints>,
    /// Multi-tenant endpoints; only present when auxiliary tenants are configured.
    pub multi_tenant_oauth: Option<MultiTenantOAuthEndpoints>,
}

impl OAuthConfig {
    /// Builds the configuration for a tenant and its (possibly empty) auxiliary tenants.
    ///
    /// # Errors
    ///
    /// See [`OAuthEndpoints::new`] and [`MultiTenantOAuthEndpoints::new`].
    pub fn build(
        active_directory_endpoint: &str,
        tenant_id: &str,
        auxiliary_tenant_ids: &[String],
    ) -> DomainResult<Self> {
        let oauth = OAuthEndpoints::new(active_directory_endpoint, tenant_id)?;
        let multi_tenant_oauth = if auxiliary_tenant_ids.is_empty() {
            None
        } else {
            Some(MultiTenantOAuthEndpoints::new(
                active_directory_endpoint,
                tenant_id,
                auxiliary_tenant_ids,
            )?)
        };

        Ok(Self {
            oauth: Some(oauth),
            multi_tenant_oauth,
        })
    }
}
