//! National cloud endpoints.
//!
//! Each [`Environment`] bundles the endpoints needed to authenticate against a
//! cloud: the Azure Active Directory login authority, Microsoft Graph and Azure
//! Resource Manager.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Known national clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cloud {
    /// Azure public cloud.
    Global,
    /// Azure US Government (L4).
    UsGovernmentL4,
    /// Azure US Government for the Department of Defense (L5).
    UsGovernmentL5,
    /// Azure China (21Vianet).
    China,
    /// Azure Germany.
    Germany,
    /// Microsoft Graph canary ring on the public cloud.
    Canary,
    /// Endpoints supplied by the caller.
    Custom,
}

/// Endpoints of a cloud environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Which cloud this is.
    pub cloud: Cloud,
    /// Login authority, always with a trailing slash.
    pub active_directory: String,
    /// Microsoft Graph endpoint, without a trailing slash.
    pub microsoft_graph: String,
    /// Azure Resource Manager endpoint, always with a trailing slash.
    pub resource_manager: String,
}

impl Environment {
    /// Resolves an environment from its configuration name.
    ///
    /// Matching is case-insensitive. An empty name selects the public cloud.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownEnvironment`] for unrecognised names.
    pub fn from_name(name: &str) -> DomainResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "public" | "global" => Ok(Self::global()),
            "usgovernment" | "usgovernmentl4" => Ok(Self::us_government_l4()),
            "dod" | "usgovernmentl5" => Ok(Self::us_government_l5()),
            "china" => Ok(Self::china()),
            "german" | "germany" => Ok(Self::germany()),
            "canary" => Ok(Self::canary()),
            _ => Err(DomainError::UnknownEnvironment(name.to_string())),
        }
    }

    /// The Azure public cloud.
    #[must_use]
    pub fn global() -> Self {
        Self::known(
            Cloud::Global,
            "https://login.microsoftonline.com/",
            "https://graph.microsoft.com",
            "https://management.azure.com/",
        )
    }

    /// Azure US Government (L4).
    #[must_use]
    pub fn us_government_l4() -> Self {
        Self::known(
            Cloud::UsGovernmentL4,
            "https://login.microsoftonline.us/",
            "https://graph.microsoft.us",
            "https://management.usgovcloudapi.net/",
        )
    }

    /// Azure US Government for the Department of Defense (L5).
    #[must_use]
    pub fn us_government_l5() -> Self {
        Self::known(
            Cloud::UsGovernmentL5,
            "https://login.microsoftonline.us/",
            "https://dod-graph.microsoft.us",
            "https://management.usgovcloudapi.net/",
        )
    }

    /// Azure China.
    #[must_use]
    pub fn china() -> Self {
        Self::known(
            Cloud::China,
            "https://login.chinacloudapi.cn/",
            "https://microsoftgraph.chinacloudapi.cn",
            "https://management.chinacloudapi.cn/",
        )
    }

    /// Azure Germany.
    #[must_use]
    pub fn germany() -> Self {
        Self::known(
            Cloud::Germany,
            "https://login.microsoftonline.de/",
            "https://graph.microsoft.de",
            "https://management.microsoftazure.de/",
        )
    }

    /// Public cloud with the Microsoft Graph canary endpoint.
    #[must_use]
    pub fn canary() -> Self {
        Self::known(
            Cloud::Canary,
            "https://login.microsoftonline.com/",
            "https://canary.graph.microsoft.com",
            "https://management.azure.com/",
        )
    }

    /// Builds an environment from arbitrary endpoints (private clouds, tests).
    ///
    /// Trailing slashes are normalised the same way as for the known clouds.
    #[must_use]
    pub fn custom(
        active_directory: impl Into<String>,
        microsoft_graph: impl Into<String>,
        resource_manager: impl Into<String>,
    ) -> Self {
        Self {
            cloud: Cloud::Custom,
            active_directory: with_trailing_slash(active_directory.into()),
            microsoft_graph: microsoft_graph.into().trim_end_matches('/').to_string(),
            resource_manager: with_trailing_slash(resource_manager.into()),
        }
    }

    fn known(cloud: Cloud, active_directory: &str, graph: &str, resource_manager: &str) -> Self {
        Self {
            cloud,
            active_directory: active_directory.to_string(),
            microsoft_graph: graph.to_string(),
            resource_manager: resource_manager.to_string(),
        }
    }
}

fn with_trailing_slash(mut endpoint: String) -> String {
    if !endpoint.ends_with('/') {
        endpoint.push('/');
    }
    endpoint
}
