//! Access tokens and the headers derived from them

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// Header carrying the primary bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Header carrying bearer tokens for auxiliary tenants.
pub const AUXILIARY_AUTHORIZATION_HEADER: &str = "x-ms-authorization-auxiliary";

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// An access token with metadata for expiry tracking.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The access token string
    pub access_token: String,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// When the token expires (if known)
    pub expires_at: Option<DateTime<Utc>>,
    /// Resource or scope the token was issued for
    pub audience: String,
    /// When this token was obtained
    pub obtained_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a new token with current timestamp.
    ///
    /// An empty token type is treated as `Bearer`.
    #[must_use]
    pub fn new(
        access_token: String,
        token_type: String,
        expires_in_secs: Option<u64>,
        audience: String,
    ) -> Self {
        let now = Utc::now();
        let expires_at = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(TimeDelta::try_seconds)
            .map(|delta| now + delta);
        let token_type = if token_type.is_empty() {
            DEFAULT_TOKEN_TYPE.to_string()
        } else {
            token_type
        };

        Self {
            access_token,
            token_type,
            expires_at,
            audience,
            obtained_at: now,
        }
    }

    /// Check if the token is expired or will expire within the given buffer.
    #[must_use]
    pub fn is_expired_or_expiring(&self, buffer_seconds: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            TimeDelta::try_seconds(buffer_seconds)
                .and_then(|buffer| Utc::now().checked_add_signed(buffer))
                .is_none_or(|horizon| horizon >= expires_at)
        })
    }

    /// Time until expiry in seconds, or None if no expiry.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|exp| (exp - Utc::now()).num_seconds())
    }

    /// Returns the Authorization header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// First characters of the token, safe to print.
    #[must_use]
    pub fn preview(&self) -> String {
        redact(&self.access_token)
    }

    /// Status of the token given a refresh buffer.
    #[must_use]
    pub fn status(&self, refresh_buffer_seconds: i64) -> TokenStatus {
        if self.is_expired_or_expiring(0) {
            TokenStatus::Expired
        } else if self.is_expired_or_expiring(refresh_buffer_seconds) {
            TokenStatus::Expiring {
                seconds_remaining: self.seconds_until_expiry().unwrap_or(0),
            }
        } else {
            TokenStatus::Valid {
                seconds_remaining: self.seconds_until_expiry(),
            }
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("audience", &self.audience)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// A header to attach to an outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
    /// Header name (e.g., "Authorization").
    pub name: String,
    /// Header value (e.g., "Bearer token123").
    pub value: String,
}

impl AuthHeader {
    /// Creates a header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The value with its credential shortened, safe to print.
    #[must_use]
    pub fn preview(&self) -> String {
        match self.value.split_once(' ') {
            Some((scheme, credential)) => format!("{scheme} {}", redact(credential)),
            None => redact(&self.value),
        }
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

fn redact(secret: &str) -> String {
    if secret.chars().count() > 12 {
        let head: String = secret.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

/// Status of a token for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Token is valid and not expiring soon.
    Valid {
        /// Seconds until expiry, or None if no expiry.
        seconds_remaining: Option<i64>,
    },
    /// Token is valid but inside the refresh window.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token has expired.
    Expired,
}

impl TokenStatus {
    /// Returns true if the token is valid (not expired).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Valid {
                seconds_remaining: Some(secs),
            } => {
                if *secs > 3600 {
                    format!("Valid for {} hours", secs / 3600)
                } else if *secs > 60 {
                    format!("Valid for {} minutes", secs / 60)
                } else {
                    format!("Valid for {secs} seconds")
                }
            }
            Self::Valid {
                seconds_remaining: None,
            } => "Valid (no expiry)".to_string(),
            Self::Expiring { seconds_remaining } => {
                format!("Expiring in {seconds_remaining} seconds (will refresh)")
            }
            Self::Expired => "Expired".to_string(),
        }
    }
}
