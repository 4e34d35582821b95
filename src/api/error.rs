use async_graphql::ServerError;
use axum::http::StatusCode;
use serde::Serialize;

/// Source position of an error, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// A single entry of the `errors` array returned to clients.
///
/// Only the message and, when known, the source locations are exposed; paths,
/// extensions and error sources stay on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
        }
    }
}

impl From<ServerError> for ErrorDetail {
    fn from(err: ServerError) -> Self {
        Self {
            message: err.message,
            locations: err
                .locations
                .into_iter()
                .map(|pos| Location {
                    line: pos.line,
                    column: pos.column,
                })
                .collect(),
        }
    }
}

/// Response body for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub errors: Vec<ErrorDetail>,
}

/// Reasons a GraphQL request ends without data
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Must provide query string.")]
    MissingQuery,

    #[error("Variables are invalid JSON.")]
    InvalidVariables,

    #[error("Query string is invalid.")]
    InvalidQueryString,

    #[error("POST body sent invalid JSON.")]
    InvalidBody,

    #[error("{}", .0.message)]
    Syntax(ErrorDetail),

    #[error("Must provide operation name if query contains multiple operations.")]
    AmbiguousOperation,

    #[error("Unknown operation named \"{0}\".")]
    UnknownOperation(String),

    #[error("Can only perform a {0} operation from a POST request.")]
    MethodNotAllowed(&'static str),

    #[error("query produced {} error(s)", .0.len())]
    Execution(Vec<ErrorDetail>),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn into_body(self) -> ErrorBody {
        let errors = match self {
            Self::Syntax(detail) => vec![detail],
            Self::Execution(errors) => errors,
            other => vec![ErrorDetail::new(other.to_string())],
        };
        ErrorBody { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Pos;
    use serde_json::json;

    #[test]
    fn test_error_detail_drops_everything_but_message_and_locations() {
        let mut err = ServerError::new("Unknown field", Some(Pos { line: 1, column: 8 }));
        err.path = vec![async_graphql::PathSegment::Field("test".to_string())];

        let detail = ErrorDetail::from(err);

        assert_eq!(
            serde_json::to_value(detail).unwrap(),
            json!({ "message": "Unknown field", "locations": [{ "line": 1, "column": 8 }] })
        );
    }

    #[test]
    fn test_error_detail_omits_empty_locations() {
        let detail = ErrorDetail::from(ServerError::new("Throws!", None));

        assert_eq!(serde_json::to_value(detail).unwrap(), json!({ "message": "Throws!" }));
    }

    #[test]
    fn test_request_error_status() {
        assert_eq!(RequestError::MissingQuery.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RequestError::InvalidVariables.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RequestError::Execution(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RequestError::MethodNotAllowed("mutation").status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_request_error_body() {
        let body = RequestError::MethodNotAllowed("mutation").into_body();

        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "errors": [{ "message": "Can only perform a mutation operation from a POST request." }] })
        );
    }
}
