//! `async-graphql` adapter for the collaborator traits.
//!
//! Lets a statically built `async_graphql::Schema` sit behind
//! [`SchemaGenerator`] and [`ExecutableSchema`] without the dispatcher
//! becoming generic over its Query, Mutation and Subscription types.

use std::sync::Arc;

use async_graphql::{ObjectType, SubscriptionType};
use async_trait::async_trait;
use corsgate_core::{ExecutionOutcome, ExecutionResult, QueryFields};
use serde_json::Value;

use crate::traits::{ExecutableSchema, ExecutionRequest, SchemaGenerator};

#[async_trait]
impl<Q, M, S> ExecutableSchema for async_graphql::Schema<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionOutcome {
        let variables =
            async_graphql::Variables::from_json(Value::Object(request.variables.clone()));
        let mut graphql_request = async_graphql::Request::new(request.query)
            .variables(variables)
            .data(request.context.clone());
        if let Some(name) = request.operation_name {
            graphql_request = graphql_request.operation_name(name);
        }

        let response = async_graphql::Schema::execute(self, graphql_request).await;

        match serde_json::to_value(&response) {
            Ok(Value::Object(map)) => ExecutionOutcome::Success(ExecutionResult::from(map)),
            Ok(other) => ExecutionOutcome::failed(anyhow::anyhow!(
                "execution response serialized to a non-object: {other}"
            )),
            Err(err) => ExecutionOutcome::failed(err),
        }
    }
}

/// Hands out the same prebuilt schema for every query.
#[derive(Clone)]
pub struct StaticSchemaGenerator {
    schema: Arc<dyn ExecutableSchema>,
}

impl StaticSchemaGenerator {
    #[must_use]
    pub fn new(schema: impl ExecutableSchema + 'static) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }
}

#[async_trait]
impl SchemaGenerator for StaticSchemaGenerator {
    async fn generate(&self, _fields: &QueryFields) -> anyhow::Result<Arc<dyn ExecutableSchema>> {
        Ok(Arc::clone(&self.schema))
    }
}
