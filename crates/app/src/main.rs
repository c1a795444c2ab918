//! Azauth - Main Entry Point
//!
//! Builds an auth method from flags and environment variables, acquires a
//! token for the requested endpoint and prints what it got.

mod cli;

use azauth_application::AuthError;
use azauth_domain::Environment;
use azauth_infrastructure::{DEFAULT_USER_AGENT, build_sender};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = cli.context();

    let config = cli.to_builder(ctx.clone()).build()?;
    let environment =
        Environment::from_name(&config.environment).map_err(AuthError::EnvironmentConfig)?;
    let endpoint = cli
        .endpoint
        .clone()
        .unwrap_or_else(|| environment.resource_manager.clone());

    tracing::info!(environment = %config.environment, endpoint = %endpoint, "acquiring token");

    let sender = build_sender(DEFAULT_USER_AGENT)?;
    let oauth = config.build_oauth_config(&environment.active_directory)?;
    let authorizer = config.get_authorization_token(sender.clone(), &oauth, &endpoint)?;
    let headers = authorizer.authorization_headers(&ctx).await?;

    if let Some(method) = config.auth_method() {
        println!("Method: {}", method.name());
    }
    for header in &headers {
        println!("{}: {}", header.name, header.preview());
    }
    if let Some(status) = authorizer.token_status().await {
        println!("Status: {}", status.display_message());
    }

    if cli.object_id {
        match config.authenticated_object_id(ctx, sender).await? {
            Some(object_id) => println!("Object ID: {object_id}"),
            None => println!("Object ID: unavailable"),
        }
    }

    Ok(())
}
