//! Turns dispatch failures into error envelope entries.

use corsgate_core::{ErrorCategory, ErrorEntry};
use tracing::error;

use super::error::DispatchError;

/// Message shown for failures that are not safe to describe to clients.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Builds the `errors` entry for a failed dispatch.
///
/// Client-safe failures keep their message. Internal failures are logged
/// and replaced by [`INTERNAL_ERROR_MESSAGE`], with the real cause attached
/// as `debugMessage` only when debug output is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorFormatter {
    debug: bool,
}

impl ErrorFormatter {
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    #[must_use]
    pub fn create(&self, failure: &DispatchError) -> ErrorEntry {
        if failure.is_client_safe() {
            return ErrorEntry::new(failure.client_message(), failure.category());
        }

        error!(error = %failure, "internal error while dispatching GraphQL request");
        let entry = ErrorEntry::new(INTERNAL_ERROR_MESSAGE, ErrorCategory::Internal);
        if self.debug {
            entry.with_debug_message(failure.to_string())
        } else {
            entry
        }
    }
}
