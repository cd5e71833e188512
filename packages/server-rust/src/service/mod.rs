//! GraphQL request dispatch.
//!
//! This module implements the dispatch pipeline for one GraphQL HTTP request:
//!
//! 1. **Header processing** (`headers`, `bypass`): per-header validation, with
//!    `Content-Type` checks skipped for CORS preflight requests
//! 2. **Dispatch** (`dispatcher`): preflight short-circuit, payload extraction,
//!    field registration, schema generation, execution
//! 3. **Query limits** (`processor`): depth and complexity checks before execution
//! 4. **Error translation** (`error`, `formatter`): failures become error entries
//! 5. **Middleware** (`middleware`): Tower layers around the dispatcher

pub mod bypass;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod headers;
pub mod middleware;
pub mod processor;
pub mod request;

// Re-export key types for convenient access.
pub use bypass::{HeaderValueInterceptor, PreflightBypass};
pub use config::{DispatchConfig, QueryLimits};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use formatter::ErrorFormatter;
pub use headers::{ContentTypeProcessor, HeaderError, HeaderValueProcessor, HttpHeaderProcessor};
pub use processor::QueryProcessor;
pub use request::{IncomingRequest, OutgoingResponse, RESPONSE_HEADERS, SCHEMA_ERROR_STATUS};
