//! GraphQL request dispatch: preflight answers, query execution, and
//! translation of every failure into a JSON error response.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use corsgate_core::{
    ExecutionOutcome, ExecutionResult, GraphQlPayload, QueryFields, ResolverContext,
};
use http::{HeaderName, StatusCode};
use tower::Service;
use tracing::{debug, error};

use super::config::DispatchConfig;
use super::error::DispatchError;
use super::formatter::ErrorFormatter;
use super::headers::HttpHeaderProcessor;
use super::processor::QueryProcessor;
use super::request::{IncomingRequest, OutgoingResponse, REQUEST_ID_HEADER, SCHEMA_ERROR_STATUS};
use crate::traits::SchemaGenerator;

/// Body sent if the error envelope itself cannot be serialized.
const FALLBACK_ERROR_BODY: &str =
    r#"{"errors":[{"message":"Internal server error","extensions":{"category":"internal"}}]}"#;

/// How a dispatch ended before the response is assembled.
enum Dispatched {
    Preflight,
    Executed(ExecutionResult),
}

/// A failure together with whatever result existed when it happened.
struct Failed {
    partial: Option<ExecutionResult>,
    error: DispatchError,
}

impl From<DispatchError> for Failed {
    fn from(error: DispatchError) -> Self {
        Self {
            partial: None,
            error,
        }
    }
}

/// Dispatches GraphQL HTTP requests.
///
/// Every request produces exactly one response: preflight requests get an
/// empty 200, queries get their execution result, and any failure is
/// appended to the result's `errors` with [`SCHEMA_ERROR_STATUS`]. Cloning
/// is cheap; all collaborators are shared.
#[derive(Clone)]
pub struct Dispatcher {
    header_processor: Arc<HttpHeaderProcessor>,
    schema_generator: Arc<dyn SchemaGenerator>,
    query_processor: QueryProcessor,
    formatter: ErrorFormatter,
}

impl Dispatcher {
    /// Dispatcher with the standard header pipeline built from `config`.
    #[must_use]
    pub fn new(schema_generator: Arc<dyn SchemaGenerator>, config: &DispatchConfig) -> Self {
        Self::with_header_processor(
            schema_generator,
            HttpHeaderProcessor::with_content_types(config.accepted_content_types.clone()),
            config,
        )
    }

    /// Dispatcher with a custom header pipeline.
    #[must_use]
    pub fn with_header_processor(
        schema_generator: Arc<dyn SchemaGenerator>,
        header_processor: HttpHeaderProcessor,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            header_processor: Arc::new(header_processor),
            schema_generator,
            query_processor: QueryProcessor::new(config.query_limits),
            formatter: ErrorFormatter::new(config.debug_errors),
        }
    }

    /// Handle one request. Never fails; failures become error responses.
    pub async fn dispatch(&self, request: IncomingRequest) -> OutgoingResponse {
        match self.run(&request).await {
            Ok(Dispatched::Preflight) => OutgoingResponse::preflight(),
            Ok(Dispatched::Executed(result)) => respond(StatusCode::OK, &result),
            Err(Failed { partial, error }) => {
                debug!(error = %error, method = %request.method, "GraphQL request failed");
                let mut result = partial.unwrap_or_default();
                result.push_error(self.formatter.create(&error));
                respond(SCHEMA_ERROR_STATUS, &result)
            }
        }
    }

    async fn run(&self, request: &IncomingRequest) -> Result<Dispatched, Failed> {
        self.header_processor
            .process_headers(request)
            .map_err(DispatchError::from)?;

        if request.is_preflight() {
            return Ok(Dispatched::Preflight);
        }

        if let Some(reason) = &request.body_error {
            return Err(DispatchError::UnreadableBody(reason.clone()).into());
        }

        let body: &[u8] = if request.body.is_empty() {
            b"{}"
        } else {
            &request.body
        };
        let body: serde_json::Value = serde_json::from_slice(body).map_err(DispatchError::from)?;
        let payload = GraphQlPayload::from_json(&body).map_err(DispatchError::from)?;

        // Field registration must precede schema generation; the generator
        // consults the registered fields.
        let fields = QueryFields::register(&payload.query, payload.variables.as_ref());
        let schema = self
            .schema_generator
            .generate(&fields)
            .await
            .map_err(DispatchError::SchemaGeneration)?;

        let context = resolver_context(request);
        let variables = payload.variables_or_empty();
        let outcome = self
            .query_processor
            .process(
                schema.as_ref(),
                &fields,
                payload.operation_name.as_deref(),
                &context,
                &variables,
            )
            .await;

        match outcome {
            ExecutionOutcome::Success(result) => Ok(Dispatched::Executed(result)),
            ExecutionOutcome::Failure { partial, error } => Err(Failed {
                partial,
                error: error
                    .downcast::<DispatchError>()
                    .unwrap_or_else(DispatchError::Execution),
            }),
        }
    }
}

fn resolver_context(request: &IncomingRequest) -> ResolverContext {
    let request_id = request
        .headers
        .get(HeaderName::from_static(REQUEST_ID_HEADER))
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    ResolverContext::new(request.method.as_str(), request_id)
}

fn respond(status: StatusCode, result: &ExecutionResult) -> OutgoingResponse {
    let body = serde_json::to_string(result).unwrap_or_else(|err| {
        error!(error = %err, "failed to serialize GraphQL response");
        FALLBACK_ERROR_BODY.to_string()
    });
    OutgoingResponse::json(status, body)
}

impl Service<IncomingRequest> for Dispatcher {
    type Response = OutgoingResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<OutgoingResponse, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: IncomingRequest) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.dispatch(request).await) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use corsgate_core::{ErrorCategory, GraphQlError};
    use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
    use http::{HeaderMap, HeaderValue, Method};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::service::request::RESPONSE_HEADERS;
    use crate::traits::{ExecutableSchema, ExecutionRequest};

    /// What the stub schema does when executed.
    #[derive(Clone)]
    enum Behavior {
        Respond(Value),
        Fail(&'static str),
        FailWithPartial(Value, &'static str),
        FailClientSafe(&'static str),
    }

    /// Records every collaborator call so tests can check ordering and arguments.
    #[derive(Default)]
    struct Calls {
        log: Mutex<Vec<String>>,
    }

    impl Calls {
        fn push(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    struct StubGenerator {
        calls: Arc<Calls>,
        behavior: Behavior,
        fail_generation: bool,
    }

    struct StubSchema {
        calls: Arc<Calls>,
        behavior: Behavior,
    }

    #[async_trait]
    impl SchemaGenerator for StubGenerator {
        async fn generate(
            &self,
            fields: &QueryFields,
        ) -> anyhow::Result<Arc<dyn ExecutableSchema>> {
            self.calls.push(format!("generate:{}", fields.query()));
            if self.fail_generation {
                anyhow::bail!("schema registry unavailable");
            }
            Ok(Arc::new(StubSchema {
                calls: Arc::clone(&self.calls),
                behavior: self.behavior.clone(),
            }))
        }
    }

    #[async_trait]
    impl ExecutableSchema for StubSchema {
        async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionOutcome {
            self.calls.push(format!(
                "execute:{}:{}:{}",
                request.query,
                Value::Object(request.variables.clone()),
                request.context.request_id.as_deref().unwrap_or("-"),
            ));
            match &self.behavior {
                Behavior::Respond(value) => {
                    ExecutionOutcome::Success(serde_json::from_value(value.clone()).unwrap())
                }
                Behavior::Fail(message) => ExecutionOutcome::failed(anyhow::anyhow!(*message)),
                Behavior::FailWithPartial(partial, message) => ExecutionOutcome::Failure {
                    partial: Some(serde_json::from_value(partial.clone()).unwrap()),
                    error: anyhow::anyhow!(*message),
                },
                Behavior::FailClientSafe(message) => ExecutionOutcome::failed(GraphQlError::new(
                    *message,
                    ErrorCategory::NoSuchEntity,
                )),
            }
        }
    }

    fn dispatcher(behavior: Behavior) -> (Dispatcher, Arc<Calls>) {
        dispatcher_with(behavior, false, &DispatchConfig::default())
    }

    fn dispatcher_with(
        behavior: Behavior,
        fail_generation: bool,
        config: &DispatchConfig,
    ) -> (Dispatcher, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let generator = StubGenerator {
            calls: Arc::clone(&calls),
            behavior,
            fail_generation,
        };
        (Dispatcher::new(Arc::new(generator), config), calls)
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn post(body: &'static str) -> IncomingRequest {
        IncomingRequest::new(Method::POST, json_headers(), body)
    }

    fn body_json(response: &OutgoingResponse) -> Value {
        serde_json::from_str(response.body()).unwrap()
    }

    fn assert_cors_headers(response: &OutgoingResponse) {
        for (name, value) in RESPONSE_HEADERS {
            assert_eq!(response.headers().get(name).unwrap(), value, "{name}");
        }
    }

    fn pong() -> Behavior {
        Behavior::Respond(json!({"data": {"ping": "pong"}}))
    }

    #[tokio::test]
    async fn preflight_returns_empty_200_without_touching_collaborators() {
        let (dispatcher, calls) = dispatcher(pong());
        let request = IncomingRequest::new(Method::OPTIONS, HeaderMap::new(), "");

        let response = dispatcher.dispatch(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "");
        assert_eq!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_cors_headers(&response);
        assert!(calls.entries().is_empty());
    }

    #[tokio::test]
    async fn preflight_ignores_body_and_content_type() {
        let (dispatcher, calls) = dispatcher(pong());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let request = IncomingRequest::new(Method::OPTIONS, headers, "not json at all");

        let response = dispatcher.dispatch(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "");
        assert_cors_headers(&response);
        assert!(calls.entries().is_empty());
    }

    #[tokio::test]
    async fn successful_query_passes_result_through() {
        let (dispatcher, _calls) = dispatcher(pong());

        let response = dispatcher.dispatch(post(r#"{"query":"{ ping }"}"#)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), r#"{"data":{"ping":"pong"}}"#);
        assert_cors_headers(&response);
    }

    #[tokio::test]
    async fn fields_are_registered_before_schema_generation_and_execution() {
        let (dispatcher, calls) = dispatcher(pong());
        let mut headers = json_headers();
        headers.insert("x-request-id", HeaderValue::from_static("req-7"));
        let request = IncomingRequest::new(
            Method::POST,
            headers,
            r#"{"query":"query($n: Int) { ping }","variables":{"n":3}}"#,
        );

        dispatcher.dispatch(request).await;

        assert_eq!(
            calls.entries(),
            [
                "generate:query($n: Int) { ping }",
                r#"execute:query($n: Int) { ping }:{"n":3}:req-7"#,
            ]
        );
    }

    #[tokio::test]
    async fn missing_query_is_executed_as_empty_string() {
        let (dispatcher, calls) = dispatcher(Behavior::Respond(json!({"errors": [{"message": "Syntax Error"}]})));

        let response = dispatcher.dispatch(post("{}")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.entries(), ["generate:", "execute::{}:-"]);
        assert_eq!(body_json(&response)["errors"][0]["message"], "Syntax Error");
    }

    #[tokio::test]
    async fn empty_body_behaves_like_empty_object() {
        let (empty_dispatcher, empty_calls) = dispatcher(pong());
        let (object_dispatcher, object_calls) = dispatcher(pong());

        let empty = empty_dispatcher.dispatch(post("")).await;
        let object = object_dispatcher.dispatch(post("{}")).await;

        assert_eq!(empty.status(), object.status());
        assert_eq!(empty.body(), object.body());
        assert_eq!(empty_calls.entries(), object_calls.entries());
    }

    #[tokio::test]
    async fn malformed_body_becomes_schema_error() {
        let (dispatcher, calls) = dispatcher(pong());

        let response = dispatcher.dispatch(post("not json")).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_cors_headers(&response);
        let body = body_json(&response);
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0]["message"]
            .as_str()
            .unwrap()
            .starts_with("Unable to parse the request body as JSON"));
        assert_eq!(errors[0]["extensions"]["category"], "graphql-input");
        assert!(body.get("data").is_none());
        assert!(calls.entries().is_empty());
    }

    #[tokio::test]
    async fn unreadable_body_becomes_schema_error() {
        let (dispatcher, calls) = dispatcher(pong());
        let request = IncomingRequest::with_unreadable_body(
            Method::POST,
            json_headers(),
            "length limit exceeded",
        );

        let response = dispatcher.dispatch(request).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_cors_headers(&response);
        let body = body_json(&response);
        assert_eq!(
            body["errors"][0]["message"],
            "Unable to read the request body: length limit exceeded"
        );
        assert_eq!(body["errors"][0]["extensions"]["category"], "graphql-input");
        assert!(calls.entries().is_empty());
    }

    #[tokio::test]
    async fn preflight_with_unreadable_body_still_returns_200() {
        let (dispatcher, _calls) = dispatcher(pong());
        let request = IncomingRequest::with_unreadable_body(
            Method::OPTIONS,
            HeaderMap::new(),
            "length limit exceeded",
        );

        let response = dispatcher.dispatch(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "");
        assert_cors_headers(&response);
    }

    #[tokio::test]
    async fn wrongly_typed_query_becomes_schema_error() {
        let (dispatcher, calls) = dispatcher(pong());

        let response = dispatcher.dispatch(post(r#"{"query": 1}"#)).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_eq!(
            body_json(&response)["errors"][0]["message"],
            "\"query\" must be a string, got number"
        );
        assert!(calls.entries().is_empty());
    }

    #[tokio::test]
    async fn rejected_content_type_becomes_schema_error() {
        let (dispatcher, calls) = dispatcher(pong());
        let request = IncomingRequest::new(Method::POST, HeaderMap::new(), r#"{"query":"{ ping }"}"#);

        let response = dispatcher.dispatch(request).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_cors_headers(&response);
        assert_eq!(
            body_json(&response),
            json!({"errors": [{
                "message": "Request content type must be application/json",
                "extensions": {"category": "graphql-input"}
            }]})
        );
        assert!(calls.entries().is_empty());
    }

    #[tokio::test]
    async fn schema_generation_failure_is_masked() {
        let (dispatcher, calls) = dispatcher_with(pong(), true, &DispatchConfig::default());

        let response = dispatcher.dispatch(post(r#"{"query":"{ ping }"}"#)).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_eq!(
            body_json(&response),
            json!({"errors": [{
                "message": "Internal server error",
                "extensions": {"category": "internal"}
            }]})
        );
        assert_eq!(calls.entries(), ["generate:{ ping }"]);
    }

    #[tokio::test]
    async fn debug_mode_exposes_cause() {
        let config = DispatchConfig {
            debug_errors: true,
            ..DispatchConfig::default()
        };
        let (dispatcher, _calls) = dispatcher_with(pong(), true, &config);

        let response = dispatcher.dispatch(post(r#"{"query":"{ ping }"}"#)).await;

        assert_eq!(
            body_json(&response)["errors"][0]["extensions"]["debugMessage"],
            "schema generation failed: schema registry unavailable"
        );
    }

    #[tokio::test]
    async fn execution_failure_without_partial_result() {
        let (dispatcher, _calls) = dispatcher(Behavior::Fail("resolver crashed"));

        let response = dispatcher.dispatch(post(r#"{"query":"{ ping }"}"#)).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        let body = body_json(&response);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn execution_failure_preserves_partial_result() {
        let partial = json!({
            "data": {"ping": "pong", "slow": null},
            "errors": [{"message": "slow failed"}]
        });
        let (dispatcher, _calls) =
            dispatcher(Behavior::FailWithPartial(partial, "executor aborted"));

        let response = dispatcher.dispatch(post(r#"{"query":"{ ping slow }"}"#)).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_cors_headers(&response);
        let body = body_json(&response);
        assert_eq!(body["data"], json!({"ping": "pong", "slow": null}));
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["message"], "slow failed");
        assert_eq!(errors[1]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn client_safe_execution_failure_keeps_message() {
        let (dispatcher, _calls) = dispatcher(Behavior::FailClientSafe("No such cart"));

        let response = dispatcher.dispatch(post(r#"{"query":"{ cart }"}"#)).await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_eq!(
            body_json(&response)["errors"][0],
            json!({"message": "No such cart", "extensions": {"category": "graphql-no-such-entity"}})
        );
    }

    #[tokio::test]
    async fn query_over_limits_is_rejected_before_execution() {
        let config = DispatchConfig {
            query_limits: crate::service::QueryLimits {
                max_depth: 1,
                max_complexity: 300,
            },
            ..DispatchConfig::default()
        };
        let (dispatcher, calls) = dispatcher_with(pong(), false, &config);

        let response = dispatcher
            .dispatch(post(r#"{"query":"{ cart { items } }"}"#))
            .await;

        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
        assert_eq!(
            body_json(&response)["errors"][0],
            json!({
                "message": "Max query depth should be 1 or less, got 2",
                "extensions": {"category": "graphql"}
            })
        );
        assert_eq!(calls.entries(), ["generate:{ cart { items } }"]);
    }

    #[tokio::test]
    async fn get_and_head_are_dispatched_like_post() {
        for method in [Method::GET, Method::HEAD] {
            let (dispatcher, _calls) = dispatcher(pong());
            let request = IncomingRequest::new(method, json_headers(), r#"{"query":"{ ping }"}"#);
            let response = dispatcher.dispatch(request).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.body(), r#"{"data":{"ping":"pong"}}"#);
        }
    }

    #[tokio::test]
    async fn service_impl_never_errors() {
        let (dispatcher, _calls) = dispatcher(pong());
        let response = dispatcher.oneshot(post("[")).await.unwrap();
        assert_eq!(response.status(), SCHEMA_ERROR_STATUS);
    }

    #[tokio::test]
    async fn responses_are_independent_across_concurrent_requests() {
        let (dispatcher, _calls) = dispatcher(pong());
        let (ok, failed, preflight) = tokio::join!(
            dispatcher.dispatch(post(r#"{"query":"{ ping }"}"#)),
            dispatcher.dispatch(post("nope")),
            dispatcher.dispatch(IncomingRequest::new(Method::OPTIONS, HeaderMap::new(), "")),
        );
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(failed.status(), SCHEMA_ERROR_STATUS);
        assert_eq!(preflight.status(), StatusCode::OK);
        assert_eq!(preflight.body(), "");
    }
}
