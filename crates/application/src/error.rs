//! Application error types

use azauth_domain::{DomainError, ValidationErrors};
use thiserror::Error;

use crate::ports::SenderError;

/// Errors surfaced while selecting, validating or running an auth method.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more required fields are missing.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// No auth method accepted the builder input.
    #[error("No supported authentication methods were found!")]
    NoApplicableMethod,

    /// The surrounding configuration does not match what the method expects.
    #[error("{0}")]
    Integration(String),

    /// The environment name could not be resolved.
    #[error("environment config error: {0}")]
    EnvironmentConfig(DomainError),

    /// A domain invariant was violated while building tokens or endpoints.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The outbound request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] SenderError),

    /// The token endpoint rejected the request.
    #[error("token request to {endpoint} failed with status {status}: {message}")]
    TokenRequest {
        /// Token endpoint URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Error description returned by the server.
        message: String,
    },

    /// A response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation timed out.
    #[error("operation timed out")]
    Timeout,
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
