//! Authentication domain types

mod oauth;
mod types;
mod validation;

pub use oauth::{MultiTenantOAuthEndpoints, OAuthConfig, OAuthEndpoints};
pub use types::{
    AUTHORIZATION_HEADER, AUXILIARY_AUTHORIZATION_HEADER, AccessToken, AuthHeader, TokenStatus,
};
pub use validation::{ValidationErrors, Violation};
