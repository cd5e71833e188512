//! Request header validation run before dispatching a query.
//!
//! Each header is checked by a [`HeaderValueProcessor`]. Processors can be
//! wrapped by [`HeaderValueInterceptor`]s, which decide whether the wrapped
//! check runs at all (see [`PreflightBypass`]).

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderName, Method};

use super::bypass::{HeaderValueInterceptor, PreflightBypass};
use super::request::IncomingRequest;

/// Rejection raised by a header processor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("Request content type must be {expected}")]
    UnsupportedContentType { expected: String, found: String },
}

/// Validates the value of one request header.
pub trait HeaderValueProcessor: Send + Sync {
    /// Header this processor checks.
    fn header_name(&self) -> &HeaderName;

    /// Check the header value. Missing headers are passed as `""`.
    ///
    /// # Errors
    ///
    /// Returns a [`HeaderError`] when the value is not acceptable.
    fn process_header_value(&self, header_value: &str) -> Result<(), HeaderError>;
}

/// Accepts only requests whose `Content-Type` names an accepted media type.
#[derive(Debug, Clone)]
pub struct ContentTypeProcessor {
    name: HeaderName,
    accepted: Vec<String>,
}

impl ContentTypeProcessor {
    #[must_use]
    pub fn new(accepted: Vec<String>) -> Self {
        Self {
            name: CONTENT_TYPE,
            accepted,
        }
    }
}

impl Default for ContentTypeProcessor {
    fn default() -> Self {
        Self::new(vec!["application/json".to_string()])
    }
}

impl HeaderValueProcessor for ContentTypeProcessor {
    fn header_name(&self) -> &HeaderName {
        &self.name
    }

    fn process_header_value(&self, header_value: &str) -> Result<(), HeaderError> {
        // Parameters such as `; charset=utf-8` are allowed, so match by containment.
        if !header_value.is_empty()
            && self
                .accepted
                .iter()
                .any(|accepted| header_value.contains(accepted.as_str()))
        {
            return Ok(());
        }
        Err(HeaderError::UnsupportedContentType {
            expected: self.accepted.join(" or "),
            found: header_value.to_string(),
        })
    }
}

struct Entry {
    processor: Box<dyn HeaderValueProcessor>,
    interceptors: Vec<Arc<dyn HeaderValueInterceptor>>,
}

/// Runs every registered header processor against a request.
///
/// Processors run in registration order and the first rejection wins.
#[derive(Default)]
pub struct HttpHeaderProcessor {
    entries: Vec<Entry>,
}

impl HttpHeaderProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard pipeline: `Content-Type` validation for the given media
    /// types, skipped for preflight requests.
    #[must_use]
    pub fn with_content_types(accepted: Vec<String>) -> Self {
        let mut processor = Self::new();
        processor.register(
            ContentTypeProcessor::new(accepted),
            vec![Arc::new(PreflightBypass)],
        );
        processor
    }

    /// Register a processor. Interceptors wrap it outermost-first.
    pub fn register<P>(&mut self, processor: P, interceptors: Vec<Arc<dyn HeaderValueInterceptor>>)
    where
        P: HeaderValueProcessor + 'static,
    {
        self.entries.push(Entry {
            processor: Box::new(processor),
            interceptors,
        });
    }

    /// Validate all registered headers of the request.
    ///
    /// # Errors
    ///
    /// Returns the first [`HeaderError`] raised by a processor.
    pub fn process_headers(&self, request: &IncomingRequest) -> Result<(), HeaderError> {
        for entry in &self.entries {
            let value = request.header_str(entry.processor.header_name());
            run_chain(entry, &entry.interceptors, &request.method, value)?;
        }
        Ok(())
    }
}

fn run_chain(
    entry: &Entry,
    interceptors: &[Arc<dyn HeaderValueInterceptor>],
    method: &Method,
    header_value: &str,
) -> Result<(), HeaderError> {
    match interceptors.split_first() {
        None => entry.processor.process_header_value(header_value),
        Some((outer, rest)) => outer.around_process_header_value(
            method,
            header_value,
            &|value: &str| run_chain(entry, rest, method, value),
        ),
    }
}
