//! `corsgate` server: CORS-aware GraphQL request dispatch on axum and tower.

pub mod engine;
pub mod network;
pub mod service;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::StaticSchemaGenerator;
pub use traits::{ExecutableSchema, ExecutionRequest, SchemaGenerator};
