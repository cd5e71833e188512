//! HTTP handler definitions for the `corsgate` server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod graphql;
pub mod health;

pub use graphql::graphql_handler;
pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use super::ShutdownController;
use crate::service::Dispatcher;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds cheaply clonable handles only.
#[derive(Clone)]
pub struct AppState {
    /// GraphQL request dispatcher.
    pub dispatcher: Dispatcher,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
