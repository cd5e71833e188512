//! Metrics middleware for dispatched requests.
//!
//! Records request duration and outcome using `tracing` spans, not a full
//! metrics crate.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::request::{IncomingRequest, OutgoingResponse};

// ---------------------------------------------------------------------------
// DispatchMetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments dispatched requests with timing via `tracing` spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchMetricsLayer;

impl<S> Layer<S> for DispatchMetricsLayer {
    type Service = DispatchMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DispatchMetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// DispatchMetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records request duration and response status in tracing spans.
#[derive(Debug, Clone)]
pub struct DispatchMetricsService<S> {
    inner: S,
}

impl<S> Service<IncomingRequest> for DispatchMetricsService<S>
where
    S: Service<IncomingRequest, Response = OutgoingResponse, Error = Infallible> + Send,
    S::Future: Send + 'static,
{
    type Response = OutgoingResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<OutgoingResponse, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: IncomingRequest) -> Self::Future {
        let method = request.method.clone();
        let preflight = request.is_preflight();

        let span = info_span!(
            "graphql_request",
            method = %method,
            preflight = preflight,
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        let fut = self.inner.call(request);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;

                let status = match &result {
                    Ok(response) => response.status().as_u16(),
                    Err(never) => match *never {},
                };
                tracing::Span::current().record("status", status);
                tracing::Span::current().record("duration_ms", duration_ms);

                tracing::info!(
                    method = %method,
                    status = status,
                    duration_ms = duration_ms,
                    "graphql request complete"
                );

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
