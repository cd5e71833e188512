//! Network configuration types for the `corsgate` server.

use std::time::Duration;

/// Top-level network configuration for the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Path the GraphQL endpoint is mounted at.
    pub graphql_path: String,
    /// Largest request body buffered for the GraphQL endpoint, in bytes.
    /// Larger bodies are answered with a GraphQL error.
    pub max_body_size: usize,
    /// Maximum time to wait for in-flight requests after shutdown is signalled.
    pub drain_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            graphql_path: "/graphql".to_string(),
            max_body_size: 2 * 1024 * 1024,
            drain_timeout: Duration::from_secs(30),
        }
    }
}
