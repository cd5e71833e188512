//! Tower middleware layers for the dispatch pipeline.
//!
//! - [`metrics`]: Request timing and status via `tracing` spans
//! - [`pipeline`]: Composes all layers around the dispatcher

pub mod metrics;
pub mod pipeline;

pub use metrics::DispatchMetricsLayer;
pub use pipeline::build_dispatch_pipeline;
