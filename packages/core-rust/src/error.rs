use std::fmt;

use serde::{Deserialize, Serialize};

/// Category reported in `extensions.category` of an error entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// The request itself was malformed: headers, body or payload shape.
    #[serde(rename = "graphql-input")]
    Input,
    /// The query was rejected by GraphQL validation or query limits.
    #[serde(rename = "graphql")]
    Graphql,
    /// The caller is not allowed to perform the operation.
    #[serde(rename = "graphql-authorization")]
    Authorization,
    /// The requested entity does not exist.
    #[serde(rename = "graphql-no-such-entity")]
    NoSuchEntity,
    /// Anything that is not safe to describe to the client.
    #[serde(rename = "internal")]
    Internal,
}

impl ErrorCategory {
    /// Wire name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "graphql-input",
            Self::Graphql => "graphql",
            Self::Authorization => "graphql-authorization",
            Self::NoSuchEntity => "graphql-no-such-entity",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure whose message may be shown to the client as-is.
///
/// Schema generators and executors return this inside an `anyhow::Error`
/// when the message is meant for the caller. Any other error is reported to
/// the client as an internal error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GraphQlError {
    message: String,
    category: ErrorCategory,
}

impl GraphQlError {
    #[must_use]
    pub fn new(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            message: message.into(),
            category,
        }
    }

    /// Client-safe error in the `graphql-input` category.
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCategory::Input)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.category
    }
}
