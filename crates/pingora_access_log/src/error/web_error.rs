use super::ResponseError;
use crate::core::Response;

/// Boxed error returned by handlers and middleware.
#[derive(Debug)]
pub struct WebError {
    inner: Box<dyn ResponseError>,
}

impl WebError {
    #[track_caller]
    pub fn new<T: ResponseError + 'static>(err: T) -> Self {
        Self {
            inner: Box::new(err),
        }
    }

    pub fn as_response_error(&self) -> &dyn ResponseError {
        &*self.inner
    }

    pub fn status_code(&self) -> http::StatusCode {
        self.inner.status_code()
    }

    /// Render the error and emit a tracing event for it.
    pub fn into_response(self) -> Response {
        tracing::error!(
            status_code = %self.inner.status_code(),
            error = %self.inner,
            "handler returned an error",
        );
        self.inner.error_response()
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl From<std::io::Error> for WebError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

impl From<serde_json::Error> for WebError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(err)
    }
}

impl From<super::SimpleError> for WebError {
    #[track_caller]
    fn from(err: super::SimpleError) -> Self {
        Self::new(err)
    }
}

impl ResponseError for WebError {
    fn status_code(&self) -> http::StatusCode {
        self.inner.status_code()
    }

    fn error_response(&self) -> Response {
        self.inner.error_response()
    }
}
