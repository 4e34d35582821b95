use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[command(version, about = "GraphQL over HTTP endpoint")]
pub struct ServerOptions {
    /// JSON file with the endpoint registration options
    #[arg(short = 'c', long, env = "GRAPHQL_ENDPOINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// The address to listen on
    #[arg(long, default_value = "0.0.0.0", env = "GRAPHQL_ENDPOINT_HOST")]
    pub host: String,

    /// The port to listen on
    #[arg(short = 'p', long, default_value = "8080", env = "PORT")]
    pub port: u16,
}
