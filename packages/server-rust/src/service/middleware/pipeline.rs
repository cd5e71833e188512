//! Pipeline composition: wraps the dispatcher in its middleware layers.

use tower::ServiceBuilder;

use super::metrics::{DispatchMetricsLayer, DispatchMetricsService};
use crate::service::dispatcher::Dispatcher;

/// Build the dispatch pipeline by wrapping the `Dispatcher` with middleware layers.
///
/// The dispatcher enforces no timeout or concurrency limit of its own, so the
/// only layer is `DispatchMetricsLayer`, which records timing and status.
///
/// The returned service implements `tower::Service<IncomingRequest>` with
/// `Error = Infallible`.
#[must_use]
pub fn build_dispatch_pipeline(dispatcher: Dispatcher) -> DispatchMetricsService<Dispatcher> {
    ServiceBuilder::new()
        .layer(DispatchMetricsLayer)
        .service(dispatcher)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
