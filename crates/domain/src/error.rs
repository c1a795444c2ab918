//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The environment name does not match any known cloud.
    #[error("invalid environment specified: {0}")]
    UnknownEnvironment(String),

    /// A required parameter was empty.
    #[error("parameter '{0}' cannot be empty")]
    EmptyParameter(&'static str),

    /// Multi-tenant configurations accept a bounded number of auxiliary tenants.
    #[error("must specify one to three auxiliary tenants")]
    AuxiliaryTenantCount(usize),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
