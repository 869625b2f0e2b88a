mod chain;
mod response_error;
mod web_error;

pub use chain::{ContextError, ErrorChain, ErrorType};
pub use response_error::ResponseError;
pub use web_error::WebError;

use http::StatusCode;

pub fn bad_request<T: std::fmt::Display>(msg: T) -> WebError {
    WebError::new(SimpleError::new(StatusCode::BAD_REQUEST, msg))
}

pub fn unauthorized<T: std::fmt::Display>(msg: T) -> WebError {
    WebError::new(SimpleError::new(StatusCode::UNAUTHORIZED, msg))
}

pub fn forbidden<T: std::fmt::Display>(msg: T) -> WebError {
    WebError::new(SimpleError::new(StatusCode::FORBIDDEN, msg))
}

pub fn not_found<T: std::fmt::Display>(msg: T) -> WebError {
    WebError::new(SimpleError::new(StatusCode::NOT_FOUND, msg))
}

pub fn internal_error<T: std::fmt::Display>(msg: T) -> WebError {
    WebError::new(SimpleError::new(StatusCode::INTERNAL_SERVER_ERROR, msg))
}

pub fn service_unavailable<T: std::fmt::Display>(msg: T) -> WebError {
    WebError::new(SimpleError::new(StatusCode::SERVICE_UNAVAILABLE, msg))
}

/// Status code plus message, for errors that need no type of their own.
#[derive(Debug, Clone)]
pub struct SimpleError {
    status: StatusCode,
    message: String,
}

impl SimpleError {
    pub fn new<T: std::fmt::Display>(status: StatusCode, message: T) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SimpleError {}

impl ResponseError for SimpleError {
    fn status_code(&self) -> StatusCode {
        self.status
    }
}

impl ResponseError for std::io::Error {}

impl ResponseError for serde_json::Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
