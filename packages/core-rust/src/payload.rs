//! GraphQL request payload extracted from a JSON request body.

use serde_json::{Map, Value};

/// Variables supplied alongside a query, keyed by variable name.
pub type Variables = Map<String, Value>;

/// Errors raised while reading the `query`/`variables` fields of a body.
///
/// A body that is valid JSON but carries wrongly-typed fields is rejected
/// here; a body that is not valid JSON never reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("\"query\" must be a string, got {found}")]
    QueryNotString { found: &'static str },
    #[error("\"variables\" must be an object, got {found}")]
    VariablesNotObject { found: &'static str },
    #[error("\"operationName\" must be a string, got {found}")]
    OperationNameNotString { found: &'static str },
}

/// The `query`, `variables` and `operationName` fields of a GraphQL request.
///
/// Missing fields take their defaults: an empty query and no variables.
/// Fields that are explicitly `null` count as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphQlPayload {
    /// Query document text. Empty when the body had no `query`.
    pub query: String,
    /// Variables, if the body carried a `variables` object.
    pub variables: Option<Variables>,
    /// Operation to run when the document defines several.
    pub operation_name: Option<String>,
}

impl GraphQlPayload {
    /// Reads the payload fields from an already-deserialized body.
    ///
    /// A body that is not a JSON object yields the default payload.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] when a present, non-null field has the
    /// wrong JSON type.
    pub fn from_json(body: &Value) -> Result<Self, PayloadError> {
        let Value::Object(fields) = body else {
            return Ok(Self::default());
        };

        let query = match fields.get("query") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(query)) => query.clone(),
            Some(other) => {
                return Err(PayloadError::QueryNotString {
                    found: json_type_name(other),
                })
            }
        };

        let variables = match fields.get("variables") {
            None | Some(Value::Null) => None,
            Some(Value::Object(variables)) => Some(variables.clone()),
            Some(other) => {
                return Err(PayloadError::VariablesNotObject {
                    found: json_type_name(other),
                })
            }
        };

        let operation_name = match fields.get("operationName") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                return Err(PayloadError::OperationNameNotString {
                    found: json_type_name(other),
                })
            }
        };

        Ok(Self {
            query,
            variables,
            operation_name,
        })
    }

    /// Variables to execute with: the supplied ones, or an empty map.
    #[must_use]
    pub fn variables_or_empty(&self) -> Variables {
        self.variables.clone().unwrap_or_default()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
