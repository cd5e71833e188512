//! GraphQL endpoint handler.
//!
//! Accepts any HTTP method on the GraphQL path and hands the raw request to
//! the dispatch pipeline. The pipeline answers every request itself, so the
//! handler never produces an error response of its own.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tracing::warn;

use super::AppState;
use crate::service::middleware::build_dispatch_pipeline;
use crate::service::IncomingRequest;

/// Dispatches one GraphQL HTTP request.
///
/// The request counts as in flight until the response is built, so graceful
/// shutdown waits for it. A body axum cannot buffer (over the size limit, or
/// a broken stream) is handed to the dispatcher as unreadable instead of
/// being rejected here.
pub async fn graphql_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let _guard = state.shutdown.in_flight_guard();

    let request = match body {
        Ok(body) => IncomingRequest::new(method, headers, body),
        Err(rejection) => {
            let reason = rejection.body_text();
            warn!(%method, %reason, "request body could not be read");
            IncomingRequest::with_unreadable_body(method, headers, reason)
        }
    };
    let pipeline = build_dispatch_pipeline(state.dispatcher.clone());

    match pipeline.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
