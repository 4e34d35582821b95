use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use graphql_endpoint::{demo, GraphQLServer, SchemaRegistry, ServerOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = ServerOptions::parse();

    let registration = match &opts.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Config file {} is not valid JSON", path.display()))?
        }
        None => graphql_endpoint::default_registration(),
    };

    tracing::info!("Configuration:");
    tracing::info!("  Config file: {:?}", opts.config);
    tracing::info!("  Listen address: {}:{}", opts.host, opts.port);

    let registry = SchemaRegistry::new();
    registry.register("demo", demo::create_schema()).await;

    let server = GraphQLServer::new(opts, registry);
    server.run(registration).await?;

    Ok(())
}
