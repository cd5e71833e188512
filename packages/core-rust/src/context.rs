use serde_json::{Map, Value};

/// Request-scoped context handed to field resolvers during execution.
/// Built once per dispatched request and never shared between requests.
#[derive(Debug, Clone, Default)]
pub struct ResolverContext {
    /// Identifier of the HTTP request, if the transport assigned one.
    pub request_id: Option<String>,
    /// HTTP method the query arrived with.
    pub method: String,
    /// Host-provided values for resolvers (store codes, feature flags, ...).
    pub extensions: Map<String, Value>,
}

impl ResolverContext {
    #[must_use]
    pub fn new(method: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            request_id,
            method: method.into(),
            extensions: Map::new(),
        }
    }

    /// Adds a host-provided value visible to resolvers.
    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}
