//! Access-log middleware for Pingora-based HTTP servers.
//!
//! [`AccessLog`] times the rest of the middleware chain and writes one line
//! per request (timestamp, status, latency, client IP, method, path) to a
//! [`LogSink`], colored per status class and method when the sink is a
//! terminal. The routing and middleware layer it plugs into ([`App`],
//! [`Router`], [`Middleware`]) lives alongside it.
//!
//! ```no_run
//! use pingora_access_log::{AccessLog, App, Response, Router, StatusCode};
//!
//! let mut router = Router::new();
//! router.get_fn("/", |_req| Ok(Response::text(StatusCode::OK, "ok")));
//!
//! let mut app = App::new(router);
//! app.use_middleware(AccessLog::with_output(std::io::stdout(), ["/healthz"]));
//! ```

pub mod core;
pub mod error;
pub mod logging;
pub mod middleware;
mod server;

pub use crate::core::*;
pub use error::{ErrorType, ResponseError, WebError};
pub use http::StatusCode;
pub use logging::*;
pub use middleware::{Middleware, compose};

use async_trait::async_trait;
use http::HeaderValue;
use std::sync::Arc;

/// Router plus middleware stack.
pub struct App {
    router: Router,
    middlewares: Vec<Arc<dyn Middleware>>,
}

/// Endpoint for requests no route matched: 204 for OPTIONS, 405 when another
/// method matches the path, 404 otherwise.
struct Unrouted {
    allowed: Vec<String>,
}

impl Unrouted {
    fn allow_header(methods: &[String]) -> HeaderValue {
        HeaderValue::from_str(&methods.join(", ")).unwrap_or(HeaderValue::from_static(""))
    }
}

#[async_trait]
impl Handler for Unrouted {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        if *req.method() == Method::OPTIONS {
            let mut allowed = self.allowed.clone();
            allowed.push(Method::OPTIONS.to_string());
            allowed.sort();
            allowed.dedup();
            let mut res = Response::empty(StatusCode::NO_CONTENT);
            res.headers.insert(http::header::ALLOW, Self::allow_header(&allowed));
            return Ok(res);
        }

        if !self.allowed.is_empty() {
            let mut res = Response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            res.headers.insert(http::header::ALLOW, Self::allow_header(&self.allowed));
            return Ok(res);
        }

        Ok(Response::text(StatusCode::NOT_FOUND, "Not Found"))
    }
}

impl App {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware. The first one added is the outermost layer.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Run `req` through the middleware stack and the matching route.
    ///
    /// Unmatched requests still pass through the middleware so they are
    /// logged; handler errors are rendered into responses here.
    pub async fn handle(&self, req: Request) -> Response {
        let (endpoint, params) = match self.router.find(req.method(), req.path()) {
            Some(found) => found,
            None => {
                let unrouted: Arc<dyn Handler> = Arc::new(Unrouted {
                    allowed: self.router.allowed_methods(req.path()),
                });
                (unrouted, Default::default())
            }
        };

        let entry = compose(&self.middlewares, endpoint);
        let mut response = match entry.handle(req.with_params(params)).await {
            Ok(res) => res,
            Err(err) => err.into_response(),
        };
        set_length_headers(&mut response);
        response
    }

    /// Wrap the app in a Pingora listening service.
    pub fn to_service(self, name: &str) -> pingora::services::listening::Service<App> {
        pingora::services::listening::Service::new(name.to_string(), self)
    }
}

/// Fill in `content-length` for byte bodies or `transfer-encoding: chunked`
/// for streams, unless the handler set either header itself.
fn set_length_headers(response: &mut Response) {
    if response.headers.contains_key(http::header::CONTENT_LENGTH)
        || response.headers.contains_key(http::header::TRANSFER_ENCODING)
    {
        return;
    }

    match &response.body {
        Body::Bytes(bytes) => {
            response
                .headers
                .insert(http::header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        }
        Body::Stream(_) => {
            response.headers.insert(
                http::header::TRANSFER_ENCODING,
                HeaderValue::from_static("chunked"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Buffer = Arc<Mutex<Vec<u8>>>;

    fn contents(buf: &Buffer) -> String {
        String::from_utf8(buf.lock().unwrap().clone()).unwrap()
    }

    fn router() -> Router {
        let mut router = Router::new();
        router.get_fn("/example", |_req| Ok(Response::text(StatusCode::OK, "ok")));
        router.post_fn("/example", |_req| Ok(Response::empty(StatusCode::CREATED)));
        router.get_fn("/hi/{name}", |req| {
            Ok(Response::text(
                StatusCode::OK,
                format!("Hello {}", req.param_or("name", "world")),
            ))
        });
        router.get_fn("/fail", |_req| Err(error::not_found("no such user")));
        router
    }

    fn logged_app(buf: &Buffer, skip: &[&str]) -> App {
        let mut app = App::new(router());
        app.use_middleware(AccessLog::with_output(
            buf.clone(),
            skip.iter().map(|s| s.to_string()),
        ));
        app
    }

    #[tokio::test]
    async fn routes_and_sets_content_length() {
        let app = App::new(router());
        let res = app.handle(Request::new(Method::GET, "/hi/alice")).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(
            res.headers
                .get(http::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok()),
            Some("11")
        );
    }

    #[tokio::test]
    async fn unmatched_requests_are_logged() {
        let buf: Buffer = Default::default();
        let app = logged_app(&buf, &[]);

        let res = app.handle(Request::new(Method::GET, "/notfound")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        let out = contents(&buf);
        assert!(out.contains("404") && out.contains("GET") && out.contains("/notfound"));

        buf.lock().unwrap().clear();
        let res = app.handle(Request::new(Method::DELETE, "/example")).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            res.headers.get(http::header::ALLOW).and_then(|v| v.to_str().ok()),
            Some("GET, POST")
        );
        assert!(contents(&buf).contains("405"));

        let res = app.handle(Request::new(Method::OPTIONS, "/example")).await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);
        assert_eq!(
            res.headers.get(http::header::ALLOW).and_then(|v| v.to_str().ok()),
            Some("GET, OPTIONS, POST")
        );
    }

    #[tokio::test]
    async fn handler_errors_become_json_responses_and_log_lines() {
        let buf: Buffer = Default::default();
        let app = logged_app(&buf, &[]);

        let res = app.handle(Request::new(Method::GET, "/fail")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body_size(), br#"{"error":"no such user"}"#.len());
        assert!(contents(&buf).contains("Error #01: no such user"));
    }

    #[tokio::test]
    async fn skip_paths_apply_through_the_app() {
        let buf: Buffer = Default::default();
        let app = logged_app(&buf, &["/example"]);

        app.handle(Request::new(Method::GET, "/example?a=1")).await;
        assert!(contents(&buf).is_empty());

        app.handle(Request::new(Method::GET, "/hi/bob")).await;
        assert!(contents(&buf).contains("/hi/bob"));
    }
}
