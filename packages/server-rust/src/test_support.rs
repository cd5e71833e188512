//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use corsgate_core::{ExecutionOutcome, ExecutionResult, QueryFields};
use serde_json::json;

use crate::network::{AppState, ShutdownController};
use crate::service::{DispatchConfig, Dispatcher};
use crate::traits::{ExecutableSchema, ExecutionRequest, SchemaGenerator};

/// Answers every query with `{"ping": "pong"}`.
pub(crate) struct PingSchema;

#[async_trait]
impl SchemaGenerator for PingSchema {
    async fn generate(&self, _fields: &QueryFields) -> anyhow::Result<Arc<dyn ExecutableSchema>> {
        Ok(Arc::new(PingSchema))
    }
}

#[async_trait]
impl ExecutableSchema for PingSchema {
    async fn execute(&self, _request: ExecutionRequest<'_>) -> ExecutionOutcome {
        ExecutionOutcome::Success(ExecutionResult::with_data(json!({"ping": "pong"})))
    }
}

pub(crate) fn ping_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(PingSchema), &DispatchConfig::default())
}

pub(crate) fn test_state() -> AppState {
    AppState {
        dispatcher: ping_dispatcher(),
        shutdown: Arc::new(ShutdownController::new()),
        start_time: Instant::now(),
    }
}
