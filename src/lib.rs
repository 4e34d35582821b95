pub mod api;
pub mod config;
pub mod demo;
pub mod options;
pub mod registry;

pub use config::{ConfigError, PluginConfig};
pub use options::ServerOptions;
pub use registry::{GraphQLEngine, SchemaRegistry, SharedSchema};

use anyhow::{Context, Result};
use axum::{routing::get, Router, Server};
use serde_json::Value;
use std::net::SocketAddr;
use tracing::{error, info};

/// Default registration options when no config file is given
pub fn default_registration() -> Value {
    serde_json::json!({ "query": { "schema": "demo" } })
}

/// Health check plus the GraphQL routes built from `registration`
///
/// # Errors
/// Returns an error if `registration` is not valid endpoint configuration
pub async fn app(registration: Value, registry: &SchemaRegistry) -> Result<Router> {
    let graphql = api::register(registration, registry)
        .await
        .context("Failed to register GraphQL endpoint")?;

    Ok(Router::new()
        .route("/health", get(api::handlers::health_check))
        .merge(graphql))
}

pub struct GraphQLServer {
    options: ServerOptions,
    registry: SchemaRegistry,
}

impl GraphQLServer {
    pub fn new(options: ServerOptions, registry: SchemaRegistry) -> Self {
        Self { options, registry }
    }

    pub async fn run(&self, registration: Value) -> Result<()> {
        let router = app(registration, &self.registry).await?;

        let addr = format!("{}:{}", self.options.host, self.options.port)
            .parse::<SocketAddr>()
            .context("Invalid socket address")?;
        info!("Starting API server on {}", addr);

        let server = Server::try_bind(&addr)
            .with_context(|| format!("Failed to bind {}", addr))?
            .serve(router.into_make_service())
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {:?}", e);
                }
                info!("Shutting down API server");
            });

        server
            .await
            .map_err(|e| anyhow::anyhow!("API server error: {}", e))
    }
}
