use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{Handler, Request, Response};
use crate::error::WebError;

/// A layer that runs code around the rest of the handling chain.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Handle `req`, usually by awaiting `next` somewhere in the body.
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError>;
}

struct Layer {
    middleware: Arc<dyn Middleware>,
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Layer {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        self.middleware.handle(req, Arc::clone(&self.next)).await
    }
}

/// Wrap `endpoint` in `middlewares`. The first registered middleware ends up
/// outermost: it sees the request first and the response last.
pub fn compose(middlewares: &[Arc<dyn Middleware>], endpoint: Arc<dyn Handler>) -> Arc<dyn Handler> {
    middlewares.iter().rev().fold(endpoint, |next, middleware| {
        let layer: Arc<dyn Handler> = Arc::new(Layer {
            middleware: Arc::clone(middleware),
            next,
        });
        layer
    })
}
