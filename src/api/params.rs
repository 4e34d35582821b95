use serde::Deserialize;
use serde_json::Value;

use crate::api::error::RequestError;

/// Media type whose body is the query text itself
pub const GRAPHQL_MEDIA_TYPE: &str = "application/graphql";

/// GraphQL parameters carried in the URL query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStringParams {
    pub query: Option<String>,
    pub variables: Option<String>,
    pub operation_name: Option<String>,
}

/// GraphQL parameters carried in a request body
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub query: Option<String>,
    pub variables: Option<Value>,
    pub operation_name: Option<String>,
}

/// The effective parameters of one request
#[derive(Debug, Default, PartialEq)]
pub struct GraphQLParams {
    pub query: Option<String>,
    pub variables: Option<Value>,
    pub operation_name: Option<String>,
}

/// Turn a buffered request body into a payload.
///
/// A body sent as `application/graphql` is the query itself. Anything else is
/// read as a JSON object, and an empty body yields an empty payload.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Payload, RequestError> {
    if content_type.map_or(false, is_graphql_media_type) {
        return Ok(Payload {
            query: Some(String::from_utf8_lossy(body).into_owned()),
            ..Payload::default()
        });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::default());
    }

    serde_json::from_slice(body).map_err(|_| RequestError::InvalidBody)
}

/// Merge query-string values over body values and decode the variables.
///
/// Empty values count as absent, so an empty query-string parameter does not
/// hide the body's value.
pub fn extract_params(
    query_string: QueryStringParams,
    payload: Payload,
) -> Result<GraphQLParams, RequestError> {
    let query = non_empty(query_string.query).or_else(|| non_empty(payload.query));

    let variables = match non_empty(query_string.variables)
        .map(Value::String)
        .or(payload.variables)
    {
        Some(Value::String(raw)) if raw.is_empty() => None,
        Some(Value::String(raw)) => {
            Some(serde_json::from_str(&raw).map_err(|_| RequestError::InvalidVariables)?)
        }
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    };

    let operation_name =
        non_empty(query_string.operation_name).or_else(|| non_empty(payload.operation_name));

    Ok(GraphQLParams {
        query,
        variables,
        operation_name,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn is_graphql_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map_or(false, |essence| essence.trim().eq_ignore_ascii_case(GRAPHQL_MEDIA_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_graphql_media_type() {
        let payload = parse_body(Some("application/graphql; charset=utf-8"), b"{ test }").unwrap();

        assert_eq!(payload.query.as_deref(), Some("{ test }"));
        assert_eq!(payload.variables, None);
    }

    #[test]
    fn test_parse_body_json() {
        let body = br#"{"query":"{test}","variables":{"who":"Dolly"},"operationName":"hello"}"#;

        let payload = parse_body(Some("application/json"), body).unwrap();

        assert_eq!(payload.query.as_deref(), Some("{test}"));
        assert_eq!(payload.variables, Some(json!({ "who": "Dolly" })));
        assert_eq!(payload.operation_name.as_deref(), Some("hello"));
    }

    #[test]
    fn test_parse_body_without_content_type_is_json() {
        let payload = parse_body(None, br#"{"query":"{test}"}"#).unwrap();
        assert_eq!(payload.query.as_deref(), Some("{test}"));
    }

    #[test]
    fn test_parse_body_empty() {
        assert_eq!(parse_body(Some("application/json"), b"").unwrap(), Payload::default());
        assert_eq!(parse_body(None, b"  \n").unwrap(), Payload::default());
    }

    #[test]
    fn test_parse_body_invalid_json() {
        assert!(matches!(
            parse_body(Some("application/json"), b"{query"),
            Err(RequestError::InvalidBody)
        ));
        assert!(matches!(
            parse_body(Some("text/plain"), b"[1, 2]"),
            Err(RequestError::InvalidBody)
        ));
    }

    #[test]
    fn test_extract_params_query_string_wins() {
        let query_string = QueryStringParams {
            query: Some("{test}".to_string()),
            variables: None,
            operation_name: Some("fromUrl".to_string()),
        };
        let payload = Payload {
            query: Some("{thrower}".to_string()),
            variables: Some(json!({ "who": "Body" })),
            operation_name: Some("fromBody".to_string()),
        };

        let params = extract_params(query_string, payload).unwrap();

        assert_eq!(params.query.as_deref(), Some("{test}"));
        assert_eq!(params.variables, Some(json!({ "who": "Body" })));
        assert_eq!(params.operation_name.as_deref(), Some("fromUrl"));
    }

    #[test]
    fn test_extract_params_empty_values_fall_back_to_body() {
        let query_string = QueryStringParams {
            query: Some(String::new()),
            ..QueryStringParams::default()
        };
        let payload = Payload {
            query: Some("{test}".to_string()),
            ..Payload::default()
        };

        let params = extract_params(query_string, payload).unwrap();

        assert_eq!(params.query.as_deref(), Some("{test}"));
    }

    #[test]
    fn test_extract_params_decodes_variables_string() {
        let query_string = QueryStringParams {
            variables: Some(r#"{"who":"Dolly"}"#.to_string()),
            ..QueryStringParams::default()
        };

        let params = extract_params(query_string, Payload::default()).unwrap();
        assert_eq!(params.variables, Some(json!({ "who": "Dolly" })));

        let payload = Payload {
            variables: Some(json!(r#"{"who":"Body"}"#)),
            ..Payload::default()
        };

        let params = extract_params(QueryStringParams::default(), payload).unwrap();
        assert_eq!(params.variables, Some(json!({ "who": "Body" })));
    }

    #[test]
    fn test_extract_params_invalid_variables() {
        let query_string = QueryStringParams {
            query: Some("{test}".to_string()),
            variables: Some("who:You".to_string()),
            operation_name: None,
        };

        assert!(matches!(
            extract_params(query_string, Payload::default()),
            Err(RequestError::InvalidVariables)
        ));
    }

    #[test]
    fn test_extract_params_missing_everything() {
        let params = extract_params(QueryStringParams::default(), Payload::default()).unwrap();
        assert_eq!(params, GraphQLParams::default());
    }
}
