//! Wire envelopes and operation metadata.
//!
//! The request envelope is `{"query": ..., "variables": {...}}` and the
//! response envelope is `{"data": ...|null, "errors": [...]}`. Both shapes are
//! part of the remote contract and are reproduced exactly.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A GraphQL request: document text plus typed input variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Query or mutation document.
    pub query: String,
    /// Variables object.
    pub variables: Value,
}

impl Request {
    /// Build a request, serializing `variables` into the envelope.
    pub fn new<V: Serialize>(query: impl Into<String>, variables: &V) -> crate::Result<Self> {
        Ok(Self {
            query: query.into(),
            variables: serde_json::to_value(variables)?,
        })
    }

    /// Look up a variable by JSON pointer (e.g. `/input/patch/enabled`).
    pub fn variable(&self, pointer: &str) -> Option<&Value> {
        self.variables.pointer(pointer)
    }
}

/// One entry of the response `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Human-readable message.
    pub message: String,
    /// Path to the failing field, mixing names and list indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub path: Vec<Value>,
    /// Everything else the server attached (`extensions`, `locations`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphQlError {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Attach a path.
    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Render the path as `outpost.config.roleARN`.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|segment| match segment {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.path_string())
        }
    }
}

/// A decoded response envelope.
///
/// Servers may answer HTTP 200 with a populated `errors` array and partial or
/// null `data`; the envelope keeps both so callers can decide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Data payload, `None` when absent or null.
    #[serde(default)]
    pub data: Option<Value>,
    /// Error diagnostics, empty when omitted.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub errors: Vec<GraphQlError>,
}

impl Response {
    /// A successful envelope with data and no errors.
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// An envelope carrying only errors.
    pub fn failed(errors: Vec<GraphQlError>) -> Self {
        Self { data: None, errors }
    }

    /// Add data to an envelope (for partial-success responses).
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether the envelope carries remote errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Navigate into `data` along a path of object keys.
    ///
    /// Returns `None` when any step is missing or null.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self.data.as_ref()?;
        for key in path {
            current = current.get(key)?;
        }
        if current.is_null() { None } else { Some(current) }
    }
}

/// CRUD operation kind, reported to the transport for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
}

impl OperationKind {
    /// Lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource category plus operation kind attached to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Resource category (e.g. "outpost", "control").
    pub category: &'static str,
    /// CRUD kind.
    pub kind: OperationKind,
}

impl Operation {
    /// Create operation metadata.
    pub fn new(category: &'static str, kind: OperationKind) -> Self {
        Self { category, kind }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.kind)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_envelope_shape() {
        let request = Request::new("query Q { a }", &json!({"id": "abc"})).unwrap();
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire, json!({"query": "query Q { a }", "variables": {"id": "abc"}}));
    }

    #[test]
    fn test_response_errors_omitted() {
        let response: Response = serde_json::from_str(r#"{"data": {"x": 1}}"#).unwrap();
        assert!(!response.has_errors());
        assert_eq!(response.get(&["x"]), Some(&json!(1)));

        let wire = serde_json::to_string(&response).unwrap();
        assert!(!wire.contains("errors"));
    }

    #[test]
    fn test_response_null_data_with_errors() {
        let body = r#"{
            "data": null,
            "errors": [{"message": "oops! an internal error has occurred", "path": ["outpost"],
                        "extensions": {"code": "INTERNAL"}}]
        }"#;
        let response: Response = serde_json::from_str(body).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path_string(), "outpost");
        assert!(response.errors[0].extra.contains_key("extensions"));
        assert!(response.get(&["outpost"]).is_none());
    }

    #[test]
    fn test_response_errors_null_tolerated() {
        let response: Response = serde_json::from_str(r#"{"data": {}, "errors": null}"#).unwrap();
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_get_treats_null_as_missing() {
        let response = Response::ok(json!({"outpost": null}));
        assert!(response.get(&["outpost"]).is_none());
    }

    #[test]
    fn test_error_display_with_path() {
        let err = GraphQlError::new("not found").with_path(["outpost", "id"]);
        assert_eq!(err.to_string(), "not found (at outpost.id)");
        let indexed = GraphQlError::new("bad").with_path(vec![json!("clusters"), json!(0)]);
        assert_eq!(indexed.path_string(), "clusters.0");
    }

    #[test]
    fn test_operation_display() {
        let op = Operation::new("outpost", OperationKind::Read);
        assert_eq!(op.to_string(), "outpost/read");
    }
}
