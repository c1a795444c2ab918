//! Client-credentials token exchange over the [`Sender`] port.

use azauth_domain::AccessToken;
use serde::Deserialize;
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::ports::{HttpRequest, Sender};

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    expires_in: Option<ExpiresIn>,
}

/// The v1 endpoint returns `expires_in` as a string, v2 as a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<u64> {
        match self {
            Self::Seconds(secs) => Some(*secs),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Token endpoint error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Posts a client-credentials grant to `token_url` and parses the token.
///
/// `audience` is recorded on the returned token (the resource or scope asked for).
pub(crate) async fn request_token(
    sender: &dyn Sender,
    token_url: Url,
    params: &[(&str, &str)],
    audience: &str,
) -> AuthResult<AccessToken> {
    let body = serde_urlencoded::to_string(params)
        .map_err(|e| AuthError::InvalidRequest(format!("failed to encode form: {e}")))?;

    let endpoint = token_url.to_string();
    tracing::debug!(endpoint = %endpoint, audience, "requesting access token");

    let response = sender.send(HttpRequest::post_form(token_url, body)).await?;

    if !response.is_success() {
        let error_text = response.text();
        let message = serde_json::from_str::<TokenErrorResponse>(&error_text).map_or_else(
            |_| error_text.clone(),
            |e| e.error_description.unwrap_or(e.error),
        );
        tracing::debug!(endpoint = %endpoint, status = response.status, "token request rejected");
        return Err(AuthError::TokenRequest {
            endpoint,
            status: response.status,
            message,
        });
    }

    let token_response: TokenResponse = response
        .json()
        .map_err(|e| AuthError::InvalidResponse(format!("failed to parse token response: {e}")))?;

    // A token without a readable lifetime is stale as soon as it is issued.
    let expires_in = token_response
        .expires_in
        .as_ref()
        .and_then(ExpiresIn::seconds)
        .unwrap_or(0);
    let token = AccessToken::new(
        token_response.access_token,
        token_response.token_type,
        Some(expires_in),
        audience.to_string(),
    );
    tracing::debug!(endpoint = %endpoint, expires_at = ?token.expires_at, "access token acquired");
    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::HttpResponse;
    use crate::test_support::RecordingSender;
    use pretty_assertions::assert_eq;

    fn token_url() -> Url {
        Url::parse("https://login.example.com/tenant/oauth2/token?api-version=1.0").unwrap()
    }

    #[tokio::test]
    async fn test_string_expires_in_and_form_body() {
        let sender = RecordingSender::with_responses(vec![HttpResponse::new(
            200,
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":"3599"}"#,
        )]);

        let token = request_token(
            &sender,
            token_url(),
            &[("grant_type", "client_credentials"), ("resource", "https://management.azure.com/")],
            "https://management.azure.com/",
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "abc");
        assert!(token.seconds_until_expiry().unwrap() > 3500);

        let requests = sender.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].body.as_deref(),
            Some("grant_type=client_credentials&resource=https%3A%2F%2Fmanagement.azure.com%2F")
        );
    }

    #[tokio::test]
    async fn test_numeric_expires_in() {
        let sender = RecordingSender::with_responses(vec![HttpResponse::new(
            200,
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":3599}"#,
        )]);

        let token = request_token(&sender, token_url(), &[], "scope").await.unwrap();
        assert!(token.expires_at.is_some());
        assert_eq!(token.audience, "scope");
    }

    #[tokio::test]
    async fn test_missing_or_unreadable_expiry_is_stale() {
        let sender = RecordingSender::with_responses(vec![
            HttpResponse::new(200, r#"{"access_token":"abc","token_type":"Bearer"}"#),
            HttpResponse::new(
                200,
                r#"{"access_token":"def","token_type":"Bearer","expires_in":"soon"}"#,
            ),
        ]);

        for _ in 0..2 {
            let token = request_token(&sender, token_url(), &[], "r").await.unwrap();
            assert!(token.expires_at.is_some());
            assert!(token.is_expired_or_expiring(0));
        }
    }

    #[tokio::test]
    async fn test_error_description_is_surfaced() {
        let sender = RecordingSender::with_responses(vec![HttpResponse::new(
            401,
            r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided."}"#,
        )]);

        let err = request_token(&sender, token_url(), &[], "r").await.unwrap_err();
        match err {
            AuthError::TokenRequest { status, message, .. } => {
                assert_eq!(status, 401);
                assert!(message.starts_with("AADSTS7000215"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_raw_body_when_error_is_not_json() {
        let sender =
            RecordingSender::with_responses(vec![HttpResponse::new(503, "service unavailable")]);

        let err = request_token(&sender, token_url(), &[], "r").await.unwrap_err();
        assert!(err.to_string().contains("service unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let sender = RecordingSender::with_responses(vec![HttpResponse::new(200, "not json")]);

        let err = request_token(&sender, token_url(), &[], "r").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }
}
