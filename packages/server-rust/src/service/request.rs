//! Request and response values exchanged with the dispatcher.

use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

/// Status used for every GraphQL-processing failure.
pub const SCHEMA_ERROR_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// Headers attached to every response, in the order they are written.
pub const RESPONSE_HEADERS: [(&str, &str); 4] = [
    ("content-type", "application/json"),
    ("access-control-allow-origin", "*"),
    ("access-control-allow-headers", "content-type"),
    ("access-control-allow-methods", "GET, HEAD, POST, OPTIONS"),
];

/// Header carrying the request id assigned by the HTTP middleware.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// One inbound HTTP request, as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Why the transport could not read the body, if it could not.
    pub body_error: Option<String>,
}

impl IncomingRequest {
    #[must_use]
    pub fn new(method: Method, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            headers,
            body: body.into(),
            body_error: None,
        }
    }

    /// A request whose body the transport failed to read, for example
    /// because it exceeded the size limit.
    #[must_use]
    pub fn with_unreadable_body(
        method: Method,
        headers: HeaderMap,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            method,
            headers,
            body: Bytes::new(),
            body_error: Some(reason.into()),
        }
    }

    /// A CORS preflight request.
    #[must_use]
    pub fn is_preflight(&self) -> bool {
        self.method == Method::OPTIONS
    }

    /// Value of a header as text. Missing or non-UTF-8 values read as `""`.
    #[must_use]
    pub fn header_str(&self, name: &HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }
}

/// The response produced for one dispatched request.
///
/// Always carries [`RESPONSE_HEADERS`]; it is built in one step by
/// [`OutgoingResponse::json`] and never edited afterwards.
#[derive(Debug, Clone)]
pub struct OutgoingResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl OutgoingResponse {
    /// Builds a response with the given status and JSON body text.
    #[must_use]
    pub fn json(status: StatusCode, body: String) -> Self {
        let headers = RESPONSE_HEADERS
            .into_iter()
            .map(|(name, value)| {
                (
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                )
            })
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Answer to a CORS preflight request: 200 with an empty body.
    #[must_use]
    pub fn preflight() -> Self {
        Self::json(StatusCode::OK, String::new())
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl IntoResponse for OutgoingResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};

    use super::*;

    fn assert_response_headers(response: &OutgoingResponse) {
        for (name, value) in RESPONSE_HEADERS {
            assert_eq!(response.headers().get(name).unwrap(), value, "{name}");
        }
    }

    #[test]
    fn preflight_response_shape() {
        let response = OutgoingResponse::preflight();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "");
        assert_response_headers(&response);
    }

    #[test]
    fn json_response_carries_all_headers() {
        let response = OutgoingResponse::json(SCHEMA_ERROR_STATUS, "{}".to_string());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().len(), 4);
        assert_response_headers(&response);
    }

    #[test]
    fn allow_methods_value_is_plain_ascii() {
        let response = OutgoingResponse::preflight();
        let value = response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(value, "GET, HEAD, POST, OPTIONS");
    }

    #[test]
    fn header_str_defaults_to_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_bytes(b"application/\xffjson").unwrap(),
        );
        let request = IncomingRequest::new(Method::POST, headers, "");
        assert_eq!(request.header_str(&CONTENT_TYPE), "");
        assert_eq!(request.header_str(&ACCESS_CONTROL_ALLOW_ORIGIN), "");
    }

    #[test]
    fn into_response_keeps_status_and_headers() {
        let response = OutgoingResponse::json(StatusCode::OK, "{}".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
