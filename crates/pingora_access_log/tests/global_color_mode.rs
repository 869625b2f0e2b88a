//! The process-wide color switch is shared state, so it is exercised from a
//! single test in its own binary.

use std::sync::{Arc, Mutex};

use pingora_access_log::{
    AccessLog, App, ColorMode, LoggerConfig, Method, Request, Response, Router, StatusCode,
    disable_color, force_color, global_color_mode, reset_color_mode,
};

fn app(buf: &Arc<Mutex<Vec<u8>>>, pinned: Option<ColorMode>) -> App {
    let mut router = Router::new();
    router.get_fn("/", |_req| Ok(Response::text(StatusCode::OK, "ok")));

    let mut config = LoggerConfig::new().output(buf.clone());
    if let Some(mode) = pinned {
        config = config.color_mode(mode);
    }
    let mut app = App::new(router);
    app.use_middleware(AccessLog::with_config(config));
    app
}

async fn render(app: &App, buf: &Arc<Mutex<Vec<u8>>>) -> String {
    buf.lock().unwrap().clear();
    app.handle(Request::new(Method::GET, "/")).await;
    String::from_utf8(buf.lock().unwrap().clone()).unwrap()
}

#[tokio::test]
async fn global_toggles_apply_to_unpinned_loggers_only() {
    assert_eq!(global_color_mode(), ColorMode::Auto);

    let buf = Arc::new(Mutex::new(Vec::new()));
    let follows_global = app(&buf, None);
    let pinned_buf = Arc::new(Mutex::new(Vec::new()));
    let pinned = app(&pinned_buf, Some(ColorMode::Disabled));

    assert!(!render(&follows_global, &buf).await.contains('\x1b'));

    force_color();
    assert_eq!(global_color_mode(), ColorMode::Forced);
    assert!(render(&follows_global, &buf).await.contains("\x1b[97;44m"));
    assert!(!render(&pinned, &pinned_buf).await.contains('\x1b'));

    disable_color();
    assert_eq!(global_color_mode(), ColorMode::Disabled);
    assert!(!render(&follows_global, &buf).await.contains('\x1b'));

    reset_color_mode();
    assert_eq!(global_color_mode(), ColorMode::Auto);
}
