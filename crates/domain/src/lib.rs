//! Azauth Domain - Core authentication types
//!
//! This crate defines the domain model for service principal authentication:
//! cloud environments, OAuth endpoints, access tokens and validation results.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod environment;
pub mod error;

pub use auth::{
    AUTHORIZATION_HEADER, AUXILIARY_AUTHORIZATION_HEADER, AccessToken, AuthHeader,
    MultiTenantOAuthEndpoints, OAuthConfig, OAuthEndpoints, TokenStatus, ValidationErrors,
    Violation,
};
pub use environment::{Cloud, Environment};
pub use error::{DomainError, DomainResult};
