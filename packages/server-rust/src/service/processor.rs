//! Query execution against a generated schema, guarded by query limits.

use corsgate_core::{ExecutionOutcome, QueryFields, ResolverContext, Variables};
use tracing::debug;

use super::config::QueryLimits;
use super::error::DispatchError;
use crate::traits::{ExecutableSchema, ExecutionRequest};

/// Executes registered queries, rejecting those over the size limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryProcessor {
    limits: QueryLimits,
}

impl QueryProcessor {
    #[must_use]
    pub fn new(limits: QueryLimits) -> Self {
        Self { limits }
    }

    /// Check the registered query against the configured limits.
    ///
    /// Queries that did not parse have no metrics and pass; the schema
    /// reports their syntax errors.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::QueryTooDeep`] or
    /// [`DispatchError::QueryTooComplex`] when a limit is exceeded.
    pub fn check_limits(&self, fields: &QueryFields) -> Result<(), DispatchError> {
        let Some(metrics) = fields.metrics() else {
            return Ok(());
        };
        if metrics.depth > self.limits.max_depth {
            return Err(DispatchError::QueryTooDeep {
                max: self.limits.max_depth,
                actual: metrics.depth,
            });
        }
        if metrics.complexity > self.limits.max_complexity {
            return Err(DispatchError::QueryTooComplex {
                max: self.limits.max_complexity,
                actual: metrics.complexity,
            });
        }
        Ok(())
    }

    /// Run the registered query against `schema`.
    ///
    /// A limit violation is reported as a failure without a partial result
    /// and without calling the schema.
    pub async fn process(
        &self,
        schema: &dyn ExecutableSchema,
        fields: &QueryFields,
        operation_name: Option<&str>,
        context: &ResolverContext,
        variables: &Variables,
    ) -> ExecutionOutcome {
        if let Err(err) = self.check_limits(fields) {
            return ExecutionOutcome::failed(err);
        }

        debug!(
            fields = fields.field_names().len(),
            operation_name, "executing query"
        );
        schema
            .execute(ExecutionRequest {
                query: fields.query(),
                operation_name,
                variables,
                context,
            })
            .await
    }
}
