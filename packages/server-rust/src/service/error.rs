use corsgate_core::{ErrorCategory, GraphQlError, PayloadError};

use super::headers::HeaderError;

/// Everything that can go wrong while dispatching one GraphQL request.
///
/// Every variant ends up as one entry in the response's `errors` sequence.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("Unable to read the request body: {0}")]
    UnreadableBody(String),
    #[error("Unable to parse the request body as JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("Max query depth should be {max} or less, got {actual}")]
    QueryTooDeep { max: usize, actual: usize },
    #[error("Max query complexity should be {max} or less, got {actual}")]
    QueryTooComplex { max: usize, actual: usize },
    #[error("schema generation failed: {0:#}")]
    SchemaGeneration(anyhow::Error),
    #[error("query execution failed: {0:#}")]
    Execution(anyhow::Error),
}

impl DispatchError {
    /// Client-safe error carried by a collaborator failure, if any.
    fn client_error(&self) -> Option<&GraphQlError> {
        match self {
            Self::SchemaGeneration(err) | Self::Execution(err) => err.downcast_ref(),
            _ => None,
        }
    }

    /// Category reported to the client.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Header(_)
            | Self::UnreadableBody(_)
            | Self::MalformedBody(_)
            | Self::Payload(_) => ErrorCategory::Input,
            Self::QueryTooDeep { .. } | Self::QueryTooComplex { .. } => ErrorCategory::Graphql,
            Self::SchemaGeneration(_) | Self::Execution(_) => self
                .client_error()
                .map_or(ErrorCategory::Internal, GraphQlError::category),
        }
    }

    /// Whether the message may be shown to the client.
    #[must_use]
    pub fn is_client_safe(&self) -> bool {
        self.category() != ErrorCategory::Internal
    }

    /// Message shown to the client when the error is client-safe.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self.client_error() {
            Some(err) => err.message().to_string(),
            None => self.to_string(),
        }
    }
}
