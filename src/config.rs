use serde::Deserialize;
use serde_json::{Map, Value};

/// Route path used when the options do not name one
pub const DEFAULT_PATH: &str = "/graphql";

/// Errors raised while validating registration options
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid options: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("\"query\" is required")]
    MissingQuery,

    #[error("\"query.schema\" is required")]
    MissingSchema,

    #[error("\"query.schema\" is not allowed to be empty")]
    EmptySchema,

    #[error("\"route.path\" length must be at least 2 characters long")]
    PathTooShort,

    #[error("\"route.path\" must start with \"/\"")]
    PathNotAbsolute,
}

/// Validated endpoint configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PluginConfig {
    pub query: QueryConfig,
    pub route: RouteConfig,
}

/// How queries are executed against the bound schema
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Name the schema was registered under
    pub schema: String,
    /// Handed to resolvers as context data
    pub root_value: Map<String, Value>,
    /// Pretty-print response bodies
    pub pretty: bool,
}

/// Where and how the endpoint is mounted
#[derive(Debug, Clone, PartialEq)]
pub struct RouteConfig {
    pub path: String,
    pub config: RouteOptions,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteOptions {
    /// Answer cross-origin requests from any origin
    pub cors: bool,
    /// Maximum accepted request body size in bytes
    pub body_limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    query: Option<RawQueryOptions>,
    route: Option<RawRouteOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawQueryOptions {
    schema: Option<String>,
    root_value: Option<Map<String, Value>>,
    pretty: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRouteOptions {
    path: Option<String>,
    config: Option<RawRouteConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawRouteConfig {
    cors: Option<bool>,
    body_limit: Option<usize>,
}

impl PluginConfig {
    /// Validate raw registration options and fill in defaults.
    ///
    /// # Errors
    /// Returns an error if the options do not match the expected shape, if
    /// `query.schema` is missing or empty, or if `route.path` is not a usable
    /// route path.
    pub fn validate(options: Value) -> Result<Self, ConfigError> {
        let raw: RawOptions = serde_json::from_value(options)?;

        let query = raw.query.ok_or(ConfigError::MissingQuery)?;
        let schema = query.schema.ok_or(ConfigError::MissingSchema)?;
        if schema.is_empty() {
            return Err(ConfigError::EmptySchema);
        }

        let route = raw.route.unwrap_or(RawRouteOptions {
            path: None,
            config: None,
        });

        let path = route.path.unwrap_or_else(|| DEFAULT_PATH.to_string());
        if path.len() < 2 {
            return Err(ConfigError::PathTooShort);
        }
        if !path.starts_with('/') {
            return Err(ConfigError::PathNotAbsolute);
        }

        let config = route
            .config
            .map(|config| RouteOptions {
                cors: config.cors.unwrap_or(false),
                body_limit: config.body_limit,
            })
            .unwrap_or_default();

        Ok(Self {
            query: QueryConfig {
                schema,
                root_value: query.root_value.unwrap_or_default(),
                pretty: query.pretty.unwrap_or(false),
            },
            route: RouteConfig { path, config },
        })
    }
}
