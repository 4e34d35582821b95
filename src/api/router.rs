use axum::{extract::DefaultBodyLimit, extract::Extension, routing::get, Router};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::api::handlers::{graphiql, graphql_handler, GraphQLEndpoint};
use crate::config::{ConfigError, PluginConfig};
use crate::registry::{SchemaRegistry, SharedSchema};

/// Validate `options`, wait for the schema they name and build its routes.
///
/// # Errors
/// Returns an error if the options are invalid. Nothing is routed in that
/// case.
pub async fn register(options: Value, registry: &SchemaRegistry) -> Result<Router, ConfigError> {
    let config = PluginConfig::validate(options)?;

    info!(
        "Waiting for schema {:?} to mount GraphQL at {}",
        config.query.schema, config.route.path
    );
    let schema = registry.wait_for(&config.query.schema).await;

    Ok(graphql_routes(&config, schema))
}

/// GET and POST routes for `schema` at the configured path, plus GraphiQL
/// under `<path>/graphiql`.
pub fn graphql_routes(config: &PluginConfig, schema: SharedSchema) -> Router {
    let path = config.route.path.as_str();
    let endpoint = Arc::new(GraphQLEndpoint::new(schema, &config.query, path));

    let mut router = Router::new()
        .route(path, get(graphql_handler).post(graphql_handler))
        .route(&format!("{}/graphiql", path.trim_end_matches('/')), get(graphiql))
        .layer(Extension(endpoint));

    if let Some(limit) = config.route.config.body_limit {
        router = router.layer(DefaultBodyLimit::max(limit));
    }
    if config.route.config.cors {
        router = router.layer(CorsLayer::permissive());
    }

    info!("Mounted GraphQL endpoint at {}", path);
    router
}
