use async_graphql::http::GraphiQLSource;
use async_graphql::parser::types::{
    DocumentOperations, ExecutableDocument, OperationDefinition, OperationType,
};
use async_graphql::{Request, ServerError, Variables};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Extension, Query},
    http::{header, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::api::error::{ErrorDetail, RequestError};
use crate::api::params::{extract_params, parse_body, Payload, QueryStringParams};
use crate::config::QueryConfig;
use crate::registry::SharedSchema;

const ENGINE_AMBIGUOUS_OPERATION: &str = "Operation name required in request.";
const ENGINE_UNKNOWN_OPERATION: &str = "Unknown operation named";

/// The configured root value, available to resolvers as context data
#[derive(Debug, Clone)]
pub struct RootValue(pub Value);

/// A schema bound to one route, with the options that apply to it
pub struct GraphQLEndpoint {
    schema: SharedSchema,
    root_value: RootValue,
    pretty: bool,
    path: String,
}

impl GraphQLEndpoint {
    pub fn new(schema: SharedSchema, query: &QueryConfig, path: impl Into<String>) -> Self {
        Self {
            schema,
            root_value: RootValue(Value::Object(query.root_value.clone())),
            pretty: query.pretty,
            path: path.into(),
        }
    }

    /// Run one request through extraction, parsing, the method check and
    /// the engine.
    ///
    /// # Errors
    /// Returns the first step that rejected the request, or the engine's
    /// errors if execution produced any.
    pub async fn execute(
        &self,
        method: &Method,
        content_type: Option<&str>,
        query_string: QueryStringParams,
        body: &[u8],
    ) -> Result<async_graphql::Response, RequestError> {
        let payload = if *method == Method::POST {
            parse_body(content_type, body)?
        } else {
            Payload::default()
        };

        let params = extract_params(query_string, payload)?;
        let query = params.query.ok_or(RequestError::MissingQuery)?;
        let operation_name = params.operation_name;

        let mut request = Request::new(query).data(self.root_value.clone());
        if let Some(variables) = params.variables {
            request = request.variables(Variables::from_json(variables));
        }
        if let Some(name) = &operation_name {
            request = request.operation_name(name.clone());
        }

        // The parsed document is cached on the request for the engine.
        let document = request
            .parsed_query()
            .map_err(|err| RequestError::Syntax(ErrorDetail::from(err)))?;

        // Only POST may run mutations and subscriptions. POST requests leave
        // validation and operation selection to the engine.
        if *method != Method::POST {
            let operation = select_operation(document, operation_name.as_deref())?;
            if operation.ty != OperationType::Query {
                return Err(RequestError::MethodNotAllowed(operation_kind(operation.ty)));
            }
        }

        debug!(method = %method, operation_name = ?operation_name, "Executing GraphQL request");

        let response = self.schema.execute(request).await;
        if response.is_err() {
            return Err(RequestError::Execution(
                response.errors.into_iter().map(engine_error).collect(),
            ));
        }

        Ok(response)
    }

    fn render<T: Serialize>(&self, status: StatusCode, body: &T) -> Response {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(body)
        } else {
            serde_json::to_vec(body)
        };

        match bytes {
            Ok(bytes) => (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                bytes,
            )
                .into_response(),
            Err(e) => {
                error!("Failed to serialize GraphQL response: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Pick the operation a request would run, the way the engine will.
fn select_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<&'a OperationDefinition, RequestError> {
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), None) => Ok(&operation.node),
        (DocumentOperations::Multiple(operations), None) => {
            if operations.len() == 1 {
                operations
                    .values()
                    .next()
                    .map(|operation| &operation.node)
                    .ok_or(RequestError::AmbiguousOperation)
            } else {
                Err(RequestError::AmbiguousOperation)
            }
        }
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .iter()
            .find(|(candidate, _)| candidate.as_str() == name)
            .map(|(_, operation)| &operation.node)
            .ok_or_else(|| RequestError::UnknownOperation(name.to_string())),
        (DocumentOperations::Single(_), Some(name)) => {
            Err(RequestError::UnknownOperation(name.to_string()))
        }
    }
}

/// Reduce an engine error, using the same wording as local operation
/// selection for the errors both can produce.
fn engine_error(err: ServerError) -> ErrorDetail {
    if err.message == ENGINE_AMBIGUOUS_OPERATION {
        return ErrorDetail::new(RequestError::AmbiguousOperation.to_string());
    }

    let mut detail = ErrorDetail::from(err);
    if detail.message.starts_with(ENGINE_UNKNOWN_OPERATION) && !detail.message.ends_with('.') {
        detail.message.push('.');
    }
    detail
}

fn operation_kind(ty: OperationType) -> &'static str {
    match ty {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}

/// Handler for GraphQL queries over GET and POST
pub async fn graphql_handler(
    Extension(endpoint): Extension<Arc<GraphQLEndpoint>>,
    method: Method,
    headers: HeaderMap,
    query_string: Result<Query<QueryStringParams>, QueryRejection>,
    body: Bytes,
) -> Response {
    let query_string = match query_string {
        Ok(Query(query_string)) => query_string,
        Err(rejection) => {
            let e = RequestError::InvalidQueryString;
            warn!("GraphQL request rejected: {} ({})", e, rejection);
            return endpoint.render(e.status(), &e.into_body());
        }
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match endpoint
        .execute(&method, content_type, query_string, &body)
        .await
    {
        Ok(response) => endpoint.render(StatusCode::OK, &response),
        Err(e) => {
            warn!("GraphQL request rejected: {}", e);
            endpoint.render(e.status(), &e.into_body())
        }
    }
}

/// Handler for the GraphiQL interface
pub async fn graphiql(Extension(endpoint): Extension<Arc<GraphQLEndpoint>>) -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(&endpoint.path).finish())
}

/// Simple health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
