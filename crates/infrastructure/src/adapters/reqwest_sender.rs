//! HTTP transport using reqwest.
//!
//! This adapter implements the `Sender` port using the reqwest library.
//! Every token request and Graph lookup goes through it.

use std::sync::Arc;
use std::time::Duration;

use azauth_application::ports::{HttpMethod, HttpRequest, HttpResponse, SendFuture, Sender, SenderError};
use reqwest::{Client, Method};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("azauth/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 10;

/// `Sender` implementation backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: Client,
    timeout: Duration,
}

impl ReqwestSender {
    /// Creates a sender with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(user_agent: &str) -> Result<Self, SenderError> {
        Self::with_timeout(user_agent, DEFAULT_TIMEOUT)
    }

    /// Creates a sender with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_timeout(user_agent: &str, timeout: Duration) -> Result<Self, SenderError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| SenderError::Other(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> SenderError {
        if error.is_timeout() {
            return SenderError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return SenderError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return SenderError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(443),
                };
            }
            return SenderError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return SenderError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        SenderError::Other(error.to_string())
    }
}

impl Sender for ReqwestSender {
    fn send(&self, request: HttpRequest) -> SendFuture<'_> {
        Box::pin(async move {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;
            let timeout_ms = self.timeout_ms();

            tracing::trace!(method = ?method, url = %url, "sending request");

            let mut builder = self.client.request(Self::to_reqwest_method(method), url);
            for (name, value) in &headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body = response
                .bytes()
                .await
                .map_err(|e| SenderError::Other(format!("Failed to read body: {e}")))?
                .to_vec();

            tracing::trace!(status, "received response");

            Ok(HttpResponse {
                status,
                headers: response_headers,
                body,
            })
        })
    }
}

/// Builds the default transport as a shareable `Sender`.
///
/// # Errors
///
/// Returns an error if the underlying client cannot be created.
pub fn build_sender(user_agent: &str) -> Result<Arc<dyn Sender>, SenderError> {
    Ok(Arc::new(ReqwestSender::new(user_agent)?))
}
