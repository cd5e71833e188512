//! Preflight exemption for header validation.
//!
//! Browsers send CORS preflight requests without a JSON `Content-Type`, and
//! the dispatcher answers them without looking at the content type. Letting
//! content-type validation reject them would make the preflight answer
//! unreachable, so validation is skipped for `OPTIONS`.

use http::Method;
use tracing::debug;

use super::headers::HeaderError;

/// Wraps a header validation step.
///
/// `proceed` runs the wrapped step; an interceptor may call it with the
/// value it received, or not call it at all.
pub trait HeaderValueInterceptor: Send + Sync {
    /// Decide whether and how the wrapped validation runs.
    ///
    /// # Errors
    ///
    /// Returns the wrapped step's error, or one of the interceptor's own.
    fn around_process_header_value(
        &self,
        method: &Method,
        header_value: &str,
        proceed: &dyn Fn(&str) -> Result<(), HeaderError>,
    ) -> Result<(), HeaderError>;
}

/// Skips the wrapped validation for `OPTIONS` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreflightBypass;

impl HeaderValueInterceptor for PreflightBypass {
    fn around_process_header_value(
        &self,
        method: &Method,
        header_value: &str,
        proceed: &dyn Fn(&str) -> Result<(), HeaderError>,
    ) -> Result<(), HeaderError> {
        if *method == Method::OPTIONS {
            debug!(header_value, "preflight request, header validation skipped");
            return Ok(());
        }
        proceed(header_value)
    }
}
