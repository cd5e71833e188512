//! `corsgate` Core — GraphQL payloads, execution results, error envelopes, and query fields.

pub mod context;
pub mod error;
pub mod fields;
pub mod payload;
pub mod result;

pub use context::ResolverContext;
pub use error::{ErrorCategory, GraphQlError};
pub use fields::{QueryFields, QueryMetrics};
pub use payload::{GraphQlPayload, PayloadError, Variables};
pub use result::{ErrorEntry, ErrorExtensions, ExecutionOutcome, ExecutionResult};
