//! Execution results and the error envelope appended to them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ErrorCategory;

/// JSON object produced by a query executor.
///
/// Conventionally holds `data` and/or `errors`. The dispatcher passes it
/// through untouched, except for appending entries to `errors`. Key order
/// is preserved on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionResult(Map<String, Value>);

impl ExecutionResult {
    /// Empty result with no keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Result carrying only a `data` entry.
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        let mut map = Map::new();
        map.insert("data".to_string(), data);
        Self(map)
    }

    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data")
    }

    /// Entries of the `errors` sequence, or an empty slice when absent.
    #[must_use]
    pub fn errors(&self) -> &[Value] {
        match self.0.get("errors") {
            Some(Value::Array(errors)) => errors,
            _ => &[],
        }
    }

    /// Appends one entry to `errors`, creating the sequence if needed.
    ///
    /// An `errors` value that is not an array is replaced, since the
    /// envelope must always end up as a sequence.
    pub fn push_error(&mut self, entry: ErrorEntry) {
        let entry = entry.into_value();
        match self.0.get_mut("errors") {
            Some(Value::Array(errors)) => errors.push(entry),
            _ => {
                self.0
                    .insert("errors".to_string(), Value::Array(vec![entry]));
            }
        }
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ExecutionResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Outcome of executing one query.
///
/// A failure may still carry a partial result, which is kept in the
/// response together with the entry describing the failure.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Success(ExecutionResult),
    Failure {
        partial: Option<ExecutionResult>,
        error: anyhow::Error,
    },
}

impl ExecutionOutcome {
    /// Failure without any partial result.
    #[must_use]
    pub fn failed(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure {
            partial: None,
            error: error.into(),
        }
    }
}

/// One entry of the `errors` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensions>,
}

/// `extensions` object of an error entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    pub category: ErrorCategory,
    /// Full error chain. Only filled in when debug output is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_message: Option<String>,
}

impl ErrorEntry {
    #[must_use]
    pub fn new(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            message: message.into(),
            extensions: Some(ErrorExtensions {
                category,
                debug_message: None,
            }),
        }
    }

    #[must_use]
    pub fn with_debug_message(mut self, debug_message: impl Into<String>) -> Self {
        if let Some(extensions) = self.extensions.as_mut() {
            extensions.debug_message = Some(debug_message.into());
        }
        self
    }

    #[must_use]
    pub fn category(&self) -> Option<ErrorCategory> {
        self.extensions.as_ref().map(|e| e.category)
    }

    fn into_value(self) -> Value {
        // Serializing a struct of strings and unit enums cannot fail.
        serde_json::to_value(&self).unwrap_or_else(|_| {
            let mut map = Map::new();
            map.insert("message".to_string(), Value::String(self.message));
            Value::Object(map)
        })
    }
}
