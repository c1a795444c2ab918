//! Looks up the object id of the authenticated service principal in Microsoft Graph.

use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use azauth_domain::{Environment, OAuthConfig};

use crate::auth::AuthMethod;
use crate::config::{ObjectIdFn, ObjectIdFuture};
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::ports::{Authorizer, HttpRequest, Sender};

#[derive(Debug, Deserialize)]
struct ServicePrincipalList {
    #[serde(default)]
    value: Vec<ServicePrincipal>,
}

#[derive(Debug, Deserialize)]
struct ServicePrincipal {
    id: String,
}

/// Builds the lookup installed into [`Config`](crate::Config) by the client secret methods.
#[must_use]
pub fn service_principal_object_id_fn(method: AuthMethod, use_microsoft_graph: bool) -> ObjectIdFn {
    Arc::new(move |ctx: AuthContext, sender: Arc<dyn Sender>| -> ObjectIdFuture {
        let method = method.clone();
        Box::pin(async move {
            let environment =
                Environment::from_name(method.environment()).map_err(AuthError::EnvironmentConfig)?;
            resolve_object_id(&method, use_microsoft_graph, &environment, &ctx, sender)
                .await
                .map(Some)
        })
    })
}

/// Authenticates against Graph in `environment` with `method` and looks up its object id.
///
/// The legacy path builds its own OAuth endpoints from the environment.
///
/// # Errors
///
/// Fails when no authorizer can be obtained or the lookup fails.
pub async fn resolve_object_id(
    method: &AuthMethod,
    use_microsoft_graph: bool,
    environment: &Environment,
    ctx: &AuthContext,
    sender: Arc<dyn Sender>,
) -> AuthResult<String> {
    let graph = environment.microsoft_graph.as_str();
    let authorizer = if use_microsoft_graph {
        method.get_authorization_token_v2(Arc::clone(&sender), &OAuthConfig::default(), graph)?
    } else {
        let oauth = OAuthConfig::build(
            &environment.active_directory,
            method.tenant_id(),
            method.auxiliary_tenant_ids(),
        )?;
        method.get_authorization_token(Arc::clone(&sender), &oauth, graph)?
    };

    find_service_principal_object_id(
        ctx,
        sender.as_ref(),
        authorizer.as_ref(),
        graph,
        method.client_id(),
    )
    .await
}

/// Queries `servicePrincipals` filtered by application id and expects exactly one match.
///
/// # Errors
///
/// Fails on transport or HTTP errors, or when the query does not return exactly one result.
pub async fn find_service_principal_object_id(
    ctx: &AuthContext,
    sender: &dyn Sender,
    authorizer: &dyn Authorizer,
    graph_endpoint: &str,
    client_id: &str,
) -> AuthResult<String> {
    let base = format!("{}/v1.0/servicePrincipals", graph_endpoint.trim_end_matches('/'));
    let filter = format!("appId eq '{client_id}'");
    let url = Url::parse_with_params(&base, [("$filter", filter.as_str())])
        .map_err(|e| AuthError::InvalidRequest(format!("invalid Graph URL {base}: {e}")))?;

    let headers = authorizer.authorization_headers(ctx).await?;
    let request = headers
        .into_iter()
        .fold(HttpRequest::get(url), |request, header| {
            request.with_header(header.name, header.value)
        });

    tracing::debug!(endpoint = %base, "looking up service principal object id");
    let response = ctx.run(async { Ok(sender.send(request).await?) }).await?;

    if !response.is_success() {
        return Err(AuthError::InvalidResponse(format!(
            "listing Service Principals failed with status {}: {}",
            response.status,
            response.text()
        )));
    }

    let list: ServicePrincipalList = response
        .json()
        .map_err(|e| AuthError::InvalidResponse(format!("failed to parse Service Principals: {e}")))?;

    match list.value.as_slice() {
        [only] => Ok(only.id.clone()),
        other => Err(AuthError::InvalidResponse(format!(
            "Unexpected Service Principal query result: {} results",
            other.len()
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::ports::{HttpMethod, HttpResponse};
    use crate::test_support::{RecordingSender, StaticAuthorizer, token_body};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_single_match() {
        let sender = RecordingSender::with_responses(vec![HttpResponse::new(
            200,
            r#"{"value":[{"id":"00000000-0000-0000-0000-000000000001","appId":"client"}]}"#,
        )]);

        let id = find_service_principal_object_id(
            &AuthContext::background(),
            &sender,
            &StaticAuthorizer::bearer("graph-token"),
            "https://graph.microsoft.com",
            "client",
        )
        .await
        .unwrap();

        assert_eq!(id, "00000000-0000-0000-0000-000000000001");
        let request = &sender.requests()[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.path(), "/v1.0/servicePrincipals");
        assert_eq!(
            request.url.query_pairs().next().map(|(k, v)| (k.into_owned(), v.into_owned())),
            Some(("$filter".to_string(), "appId eq 'client'".to_string()))
        );
        assert_eq!(request.header("Authorization"), Some("Bearer graph-token"));
    }

    #[tokio::test]
    async fn test_rejects_zero_and_many() {
        for (body, count) in [
            (r#"{"value":[]}"#, 0),
            (r#"{"value":[{"id":"a"},{"id":"b"}]}"#, 2),
        ] {
            let sender = RecordingSender::with_responses(vec![HttpResponse::new(200, body)]);
            let err = find_service_principal_object_id(
                &AuthContext::background(),
                &sender,
                &StaticAuthorizer::bearer("t"),
                "https://graph.microsoft.com/",
                "client",
            )
            .await
            .unwrap_err();

            assert_eq!(
                err.to_string(),
                format!("invalid response: Unexpected Service Principal query result: {count} results")
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_through_legacy_path() {
        let mut b = Builder::new(AuthContext::background());
        b.client_id = "client".to_string();
        b.client_secret = "secret".to_string();
        b.tenant_id = "tenant".to_string();
        b.supports_client_secret_auth = true;
        let method = AuthMethod::select(&b).unwrap();

        let sender = Arc::new(RecordingSender::with_responses(vec![
            HttpResponse::new(200, token_body("graph")),
            HttpResponse::new(200, r#"{"value":[{"id":"object-1"}]}"#),
        ]));
        let environment = Environment::custom(
            "https://login.example.test/",
            "https://graph.example.test",
            "https://management.example.test/",
        );

        let id = resolve_object_id(
            &method,
            false,
            &environment,
            &AuthContext::background(),
            sender.clone(),
        )
        .await
        .unwrap();

        assert_eq!(id, "object-1");
        let requests = sender.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "https://login.example.test/tenant/oauth2/token?api-version=1.0"
        );
        assert!(
            requests[0]
                .body
                .as_deref()
                .unwrap()
                .contains("resource=https%3A%2F%2Fgraph.example.test")
        );
        assert_eq!(requests[1].header("Authorization"), Some("Bearer graph"));
    }
}
