use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use pingora::server::Server;
use pingora_access_log::error::{ErrorType, bad_request};
use pingora_access_log::{
    AccessLog, App, DefaultFormatter, Handler, LoggerConfig, Request, Response, Router,
    StatusCode, TracingSink, WebError,
};
use tracing_subscriber::EnvFilter;

struct SlowHandler;

#[async_trait]
impl Handler for SlowHandler {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        let millis = req
            .param("millis")
            .and_then(|m| m.parse().ok())
            .unwrap_or(250);
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(Response::text(StatusCode::OK, format!("slept {millis}ms")))
    }
}

/// Records a private error that shows up under the access line while the
/// client still gets a 200.
struct FlakyHandler;

#[async_trait]
impl Handler for FlakyHandler {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        req.set_key("cache", "bypassed");
        req.add_error("cache backend unreachable, served from origin", ErrorType::Private);
        Ok(Response::text(StatusCode::OK, "fresh"))
    }
}

struct CountdownHandler;

#[async_trait]
impl Handler for CountdownHandler {
    async fn handle(&self, _req: Request) -> Result<Response, WebError> {
        let chunks = stream::iter((1..=5).rev())
            .then(|i| async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Bytes::from(format!("{i}\n"))
            })
            .boxed();
        Ok(Response::stream(StatusCode::OK, chunks).header("content-type", "text/plain"))
    }
}

fn routes() -> Router {
    let mut router = Router::new();
    router.get_fn("/", |_req| Ok(Response::text(StatusCode::OK, "ok")));
    router.get_fn("/healthz", |_req| Ok(Response::empty(StatusCode::NO_CONTENT)));
    router.get_fn("/hello/{name}", |req| {
        let name = req.param_or("name", "Anonymous");
        Ok(Response::text(StatusCode::OK, format!("Hello {name}!")))
    });
    router.post_fn("/api/echo", |req| {
        let value: serde_json::Value = serde_json::from_slice(req.body())?;
        Ok(Response::json(StatusCode::OK, value))
    });
    router.get_fn("/api/reject", |_req| Err(bad_request("query parameter `id` is required")));
    router.get("/slow/{millis}", Arc::new(SlowHandler));
    router.get("/flaky", Arc::new(FlakyHandler));
    router.get("/countdown", Arc::new(CountdownHandler));
    router
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // ACCESS_LOG=tracing routes access lines through the subscriber instead of stdout.
    let mut config = LoggerConfig::new()
        .formatter(DefaultFormatter::with_tag("[demo]"))
        .skip_path("/healthz");
    if std::env::var("ACCESS_LOG").is_ok_and(|v| v == "tracing") {
        config = config.output(TracingSink::new());
    }

    let mut app = App::new(routes());
    app.use_middleware(AccessLog::with_config(config));

    tracing::info!("listening on http://localhost:8080");
    if let Err(e) = run_server(app, "0.0.0.0:8080") {
        tracing::error!(error = %e, "server exited");
    }
}

fn run_server(app: App, addr: &str) -> std::io::Result<()> {
    let mut server = Server::new(None).map_err(|e| std::io::Error::other(e.to_string()))?;
    server.bootstrap();

    let mut service = app.to_service("access log demo");
    service.add_tcp(addr);
    server.add_service(service);
    server.run_forever()
}
