/// Configuration of the GraphQL request dispatcher.
///
/// Controls error detail, accepted content types, and query size limits.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Include the full error chain in `extensions.debugMessage` of
    /// internal errors. Off in production.
    pub debug_errors: bool,
    /// Media types accepted in the `Content-Type` of non-preflight requests.
    pub accepted_content_types: Vec<String>,
    /// Size limits enforced before execution.
    pub query_limits: QueryLimits,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            debug_errors: false,
            accepted_content_types: vec!["application/json".to_string()],
            query_limits: QueryLimits::default(),
        }
    }
}

/// Upper bounds on query size, checked against parsed query metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    /// Maximum nesting of field selections.
    pub max_depth: usize,
    /// Maximum number of selected fields, fragments expanded.
    pub max_complexity: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_complexity: 300,
        }
    }
}
