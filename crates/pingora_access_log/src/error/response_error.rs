use crate::core::Response;
use http::StatusCode;

/// Errors that know how to render themselves as an HTTP response.
///
/// Handlers return these wrapped in [`WebError`](super::WebError); the
/// access log reads the rendered status and body size when a delegate fails.
pub trait ResponseError: std::error::Error + Send + Sync {
    /// Status code for this error. Defaults to 500.
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Render the error as `{"error": "<message>"}`.
    fn error_response(&self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        Response::json(self.status_code(), &body)
    }
}
