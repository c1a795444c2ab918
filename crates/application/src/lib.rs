//! Azauth Application - Auth methods, selection and token acquisition
//!
//! This crate defines the application layer with:
//! - Port traits (transport, authorizers, token sources)
//! - The client secret auth methods and their selection from a [`Builder`]
//! - A minimal client-credentials identity layer
//! - Application-level error handling

pub mod auth;
pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod object_id;
pub mod ports;

pub use auth::{AuthMethod, AuthMethodKind, ClientSecretAuth, ClientSecretMultiTenantAuth, scope_for_endpoint};
pub use builder::Builder;
pub use config::{Config, ObjectIdFn, ObjectIdFuture};
pub use context::AuthContext;
pub use error::{AuthError, AuthResult};
pub use identity::{
    BearerAuthorizer, ClientCredentialsConfig, ClientCredentialsTokenSource,
    MultiTenantBearerAuthorizer, MultiTenantServicePrincipalToken, ServicePrincipalToken,
    TokenCache, TokenVersion,
};
pub use object_id::{find_service_principal_object_id, resolve_object_id};
pub use ports::{
    AuthFuture, Authorizer, HttpMethod, HttpRequest, HttpResponse, SendFuture, Sender, SenderError,
    TokenSource,
};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use azauth_domain::{AUTHORIZATION_HEADER, AuthHeader};

    use crate::context::AuthContext;
    use crate::ports::{AuthFuture, Authorizer, HttpRequest, HttpResponse, SendFuture, Sender, SenderError};

    /// Canned token endpoint body.
    pub fn token_body(access_token: &str) -> String {
        format!(
            r#"{{"access_token":"{access_token}","token_type":"Bearer","expires_in":"3599"}}"#
        )
    }

    /// Replays queued responses in order and records every request.
    #[derive(Default)]
    pub struct RecordingSender {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingSender {
        pub fn with_responses(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Sender for RecordingSender {
        fn send(&self, request: HttpRequest) -> SendFuture<'_> {
            self.requests.lock().unwrap().push(request);
            let next = self.responses.lock().unwrap().pop_front();
            Box::pin(async move {
                next.ok_or_else(|| SenderError::Other("no response queued".to_string()))
            })
        }
    }

    /// Never answers; stands in for a token endpoint that hangs.
    pub struct PendingSender;

    impl Sender for PendingSender {
        fn send(&self, _request: HttpRequest) -> SendFuture<'_> {
            Box::pin(std::future::pending::<Result<HttpResponse, SenderError>>())
        }
    }

    /// Always returns the same bearer header.
    pub struct StaticAuthorizer(String);

    impl StaticAuthorizer {
        pub fn bearer(token: &str) -> Self {
            Self(format!("Bearer {token}"))
        }
    }

    impl Authorizer for StaticAuthorizer {
        fn authorization_headers<'a>(&'a self, _ctx: &'a AuthContext) -> AuthFuture<'a, Vec<AuthHeader>> {
            Box::pin(async move { Ok(vec![AuthHeader::new(AUTHORIZATION_HEADER, self.0.clone())]) })
        }
    }
}
