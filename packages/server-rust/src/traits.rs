use std::sync::Arc;

use async_trait::async_trait;
use corsgate_core::{ExecutionOutcome, QueryFields, ResolverContext, Variables};

/// Builds the schema a query will be executed against.
///
/// Takes the registered [`QueryFields`] so the generator can skip types the
/// query never references. Holding a `QueryFields` proves registration
/// already happened.
#[async_trait]
pub trait SchemaGenerator: Send + Sync {
    /// Generate a schema for the registered query.
    async fn generate(&self, fields: &QueryFields) -> anyhow::Result<Arc<dyn ExecutableSchema>>;
}

/// A generated schema, able to execute queries.
/// Implementations wrap the actual GraphQL engine.
#[async_trait]
pub trait ExecutableSchema: Send + Sync {
    /// Execute one query. Errors the engine reports as part of a normal
    /// response (validation, resolver errors) belong in a `Success` result's
    /// `errors`; `Failure` is reserved for executions that could not complete.
    async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionOutcome;
}

/// Everything a schema needs to execute one query.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRequest<'a> {
    pub query: &'a str,
    pub operation_name: Option<&'a str>,
    pub variables: &'a Variables,
    pub context: &'a ResolverContext,
}
